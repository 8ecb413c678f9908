//! The interactive factoring panel.
//!
//! A [`PanelState`] holds the two user inputs. [`on_trigger`] runs the
//! all-factors search on the statevector backend and the first-factor search
//! on the sparse backend, one after the other, and returns what each found;
//! [`render_markdown`] turns that into the panel's text output.

use std::fmt::Write as _;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use qfactor_hal::Backend;
use qfactor_shor::{
    PanelDefaults, QpeEstimator, SearchOptions, ShorResult, find_factor, find_factor_return1st,
};

/// Inputs of one panel run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelState {
    /// Number to factor.
    pub number: u64,
    /// Timeout per backend in seconds; 0 means none.
    pub timeout_secs: u64,
    /// Base used by both searches.
    pub base: u64,
    /// Counting register width.
    pub qubits_count: u32,
}

impl PanelState {
    /// A panel for `number` with base 2 and 8 counting qubits.
    pub fn new(number: u64, timeout_secs: u64) -> Self {
        Self {
            number,
            timeout_secs,
            base: 2,
            qubits_count: 8,
        }
    }

    /// Start from configured defaults.
    pub fn from_defaults(defaults: &PanelDefaults) -> Self {
        Self {
            number: defaults.number,
            timeout_secs: defaults.timeout_secs,
            base: defaults.base,
            qubits_count: defaults.qubits_count,
        }
    }

    fn options(&self) -> SearchOptions {
        #[allow(clippy::cast_precision_loss)]
        let secs = self.timeout_secs as f64;
        SearchOptions::new(self.qubits_count).with_timeout_secs(secs)
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self::from_defaults(&PanelDefaults::default())
    }
}

/// Which search produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// `find_factor`: every factor of the successful attempt.
    AllFactors,
    /// `find_factor_return1st`: a single factor.
    FirstFactor,
}

/// What one backend found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendReport {
    /// Display name of the backend.
    pub backend: String,
    /// Which search ran.
    pub kind: ReportKind,
    /// Factors found; empty on timeout.
    pub factors: Vec<u64>,
}

impl BackendReport {
    /// Whether the search gave up.
    pub fn timed_out(&self) -> bool {
        self.factors.is_empty()
    }

    /// One line of panel output.
    pub fn render(&self) -> String {
        match (self.kind, self.factors.first()) {
            (_, None) => format!("{} - TIMEOUT: no factor found", self.backend),
            (ReportKind::AllFactors, Some(_)) => {
                format!("{} - Found factors: {:?}", self.backend, self.factors)
            }
            (ReportKind::FirstFactor, Some(factor)) => {
                format!("{} - Found factor: {factor}", self.backend)
            }
        }
    }
}

/// Run both searches for the panel inputs.
pub async fn on_trigger<D, S>(state: &PanelState, dense: D, sparse: S) -> ShorResult<Vec<BackendReport>>
where
    D: Backend,
    S: Backend,
{
    let opts = state.options();
    info!(number = state.number, timeout_secs = state.timeout_secs, "panel triggered");

    let dense = QpeEstimator::new(dense);
    let factors = find_factor(&dense, state.number, state.base, &opts).await?;
    let first = BackendReport {
        backend: "Statevector".into(),
        kind: ReportKind::AllFactors,
        factors,
    };

    let sparse = QpeEstimator::new(sparse);
    let factor = find_factor_return1st(&sparse, state.number, state.base, &opts).await?;
    let second = BackendReport {
        backend: "Sparse".into(),
        kind: ReportKind::FirstFactor,
        factors: factor.into_iter().collect(),
    };

    Ok(vec![first, second])
}

/// Panel output as Markdown: the header, then one paragraph per backend.
pub fn render_markdown(state: &PanelState, reports: &[BackendReport]) -> String {
    let mut out = format!(
        "Factoring for: {} (timeout: {})\n",
        state.number, state.timeout_secs
    );
    for report in reports {
        // Writing to a String cannot fail.
        let _ = write!(out, "\n{}\n", report.render());
    }
    out
}

/// Ask for a number on `output` and read it from `input`.
///
/// An empty line keeps `default`.
pub fn prompt_u64(
    input: &mut impl BufRead,
    output: &mut impl Write,
    label: &str,
    default: u64,
) -> Result<u64> {
    write!(output, "{label} [{default}]: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read input")?;
    let line = line.trim();
    if line.is_empty() {
        return Ok(default);
    }
    line.parse()
        .with_context(|| format!("Not a non-negative integer: '{line}'"))
}
