//! qfactor Sparse Simulator
//!
//! The second, independent simulation engine. Amplitudes live in a
//! hash map keyed by basis index and entries whose magnitude drops below a
//! fixed threshold are pruned after each operation. The engine shares the
//! circuit lowering ([`qfactor_ir::flatten`]) and the readout conventions
//! ([`qfactor_hal::MeasurementLayout`]) with the dense backend but none of
//! its kernels, so the factoring panel can cross-check the two.
//!
//! # Example
//!
//! ```ignore
//! use qfactor_adapter_sparse::SparseBackend;
//! use qfactor_hal::Backend;
//! use qfactor_ir::Circuit;
//!
//! let backend = SparseBackend::with_seed(7);
//! let result = backend.run(&Circuit::bell()?, 100).await?;
//! assert_eq!(result.counts.get("01"), 0);
//! ```

mod backend;
mod state;

pub use backend::SparseBackend;
