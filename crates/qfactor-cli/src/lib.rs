//! Library half of the `qfactor` binary.
//!
//! The argument parser, the panel state with its trigger handler and the
//! rendering live here so they can be tested without spawning the binary.

pub mod cli;
pub mod panel;
pub mod settings;

pub use panel::{BackendReport, PanelState, ReportKind, on_trigger, render_markdown};
pub use settings::{build_backends, load_config};
