//! Configuration loading and backend construction.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use qfactor_adapter_sim::SimulatorBackend;
use qfactor_adapter_sparse::SparseBackend;
use qfactor_hal::BackendFactory;
use qfactor_shor::ShorConfig;

/// `~/.config/qfactor/config.yaml` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("qfactor").join("config.yaml"))
}

/// Load the configuration file.
///
/// An explicit path must exist. Without one, the default location is used
/// when present and built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<ShorConfig> {
    if let Some(path) = path {
        return ShorConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            debug!(path = %path.display(), "loading default config");
            ShorConfig::from_file(&path)
                .with_context(|| format!("Failed to load config: {}", path.display()))
        }
        _ => Ok(ShorConfig::default()),
    }
}

/// Build both simulators from their `backends` entries.
pub fn build_backends(config: &ShorConfig) -> Result<(SimulatorBackend, SparseBackend)> {
    let dense = SimulatorBackend::from_config(config.backend("statevector"))
        .context("Invalid statevector backend settings")?;
    let sparse = SparseBackend::from_config(config.backend("sparse"))
        .context("Invalid sparse backend settings")?;
    Ok((dense, sparse))
}
