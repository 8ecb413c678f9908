//! qfactor Dense Statevector Simulator
//!
//! The first of the two simulation engines behind the factoring panel. It
//! stores all `2^n` amplitudes, lowers every circuit through
//! [`qfactor_ir::flatten`] and applies the resulting controlled primitives
//! with bitmask kernels. Named custom gates with any number of controls are
//! accepted, so the controlled modular-exponentiation blocks of the phase
//! estimation circuit run without decomposition.
//!
//! Sampling happens after evolution: measurements must be terminal, and the
//! per-shot bitstrings are returned in [`ExecutionResult::memory`].
//!
//! # Performance
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 12 (QPE, 8 counting) | ~64 KB |
//! | 20 | ~16 MB |
//! | 25 | ~512 MB |
//!
//! # Example
//!
//! ```ignore
//! use qfactor_adapter_sim::SimulatorBackend;
//! use qfactor_hal::Backend;
//! use qfactor_ir::Circuit;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SimulatorBackend::with_seed(42);
//!
//!     let circuit = Circuit::bell()?;
//!     let job_id = backend.submit(&circuit, 1000).await?;
//!     let result = backend.wait(&job_id).await?;
//!
//!     println!("Results: {:?}", result.counts.sorted());
//!     Ok(())
//! }
//! ```
//!
//! [`ExecutionResult::memory`]: qfactor_hal::ExecutionResult::memory

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
