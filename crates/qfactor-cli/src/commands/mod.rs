//! CLI command implementations.

pub mod backends;
pub mod circuit;
pub mod factor;
pub mod panel;
pub mod version;
