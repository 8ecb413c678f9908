//! YAML configuration for the factoring pipeline.
//!
//! ```yaml
//! search:
//!   qubits_count: 8
//!   show: true
//!   retry:
//!     timeout_secs: 30
//!     max_attempts: 100
//! panel:
//!   number: 21
//!   timeout_secs: 10
//! backends:
//!   - name: statevector
//!     seed: 42
//!   - name: sparse
//!     max_qubits: 40
//! ```
//!
//! Every section is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use qfactor_hal::BackendConfig;

use crate::error::{ShorError, ShorResult};
use crate::search::SearchOptions;

/// Inputs the interactive panel starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelDefaults {
    /// Number to factor.
    pub number: u64,
    /// Seconds per backend; 0 disables the deadline.
    pub timeout_secs: u64,
    /// Base handed to both backends.
    pub base: u64,
    /// Counting register width.
    pub qubits_count: u32,
}

impl Default for PanelDefaults {
    fn default() -> Self {
        Self {
            number: 14,
            timeout_secs: 10,
            base: 2,
            qubits_count: 8,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShorConfig {
    /// Options for `qfactor factor`.
    pub search: SearchOptions,
    /// Defaults for `qfactor panel`.
    pub panel: PanelDefaults,
    /// Per-backend settings, matched by name.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub backends: Vec<BackendConfig>,
}

impl ShorConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> ShorResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| ShorError::Config(e.to_string()))
    }

    /// Load a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> ShorResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| ShorError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> ShorResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| ShorError::Config(e.to_string()))
    }

    /// Settings for the backend called `name`, or a bare entry.
    pub fn backend(&self, name: &str) -> BackendConfig {
        self.backends
            .iter()
            .find(|b| b.name == name)
            .cloned()
            .unwrap_or_else(|| BackendConfig::new(name))
    }
}
