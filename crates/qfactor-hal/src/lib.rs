//! qfactor Backend Abstraction Layer
//!
//! This crate provides the interface every simulation library implements so
//! the factoring pipeline can run a circuit without knowing which simulator
//! is underneath.
//!
//! # Overview
//!
//! - A common [`Backend`] trait for job submission and management
//! - [`Capabilities`] to describe what a backend can run
//! - Unified result handling via [`ExecutionResult`] and [`Counts`]
//!
//! # Backends
//!
//! | Backend | Crate | Representation |
//! |---------|-------|----------------|
//! | `statevector` | `qfactor-adapter-sim` | Dense 2^n amplitude vector |
//! | `sparse` | `qfactor-adapter-sparse` | Hash map of non-zero amplitudes |
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use qfactor_hal::Backend;
//! use qfactor_adapter_sim::SimulatorBackend;
//! use qfactor_ir::Circuit;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let circuit = Circuit::bell()?;
//!     let backend = SimulatorBackend::new();
//!
//!     let job_id = backend.submit(&circuit, 1000).await?;
//!     let result = backend.wait(&job_id).await?;
//!
//!     if let Some((bitstring, count)) = result.counts.most_frequent() {
//!         println!("Most frequent: {} ({} times)", bitstring, count);
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod measurement;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use measurement::{MeasurementLayout, has_reset, mid_circuit_violations};
pub use result::{Counts, ExecutionResult};
