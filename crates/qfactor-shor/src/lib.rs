//! qfactor Shor Core
//!
//! Shor's algorithm for the fixed modulus 15: a quantum phase estimation
//! circuit built from controlled modular multiplications and an inverse QFT,
//! and the classical loop that turns measured phases into factors.
//!
//! # Pipeline
//!
//! ```text
//!   c_amod15 ──┐
//!              ├──→ qpe_circuit ──→ Backend::run (1 shot) ──→ phase
//!   qft_dagger ┘                                                │
//!                                                               ↓
//!   factors ←── gcd(a^(r/2) ± 1, N) ←── r ←── limit_denominator(phase, N)
//! ```
//!
//! The multiplication circuit only exists for `N = 15`; the classical half
//! ([`arith`], [`fraction`], [`search`]) works for any `N` up to `u32::MAX`
//! and is driven through the [`PhaseSource`] trait, so the loop can also run
//! against scripted phases.
//!
//! # Example
//!
//! ```rust
//! use qfactor_adapter_sim::SimulatorBackend;
//! use qfactor_shor::{QpeEstimator, SearchOptions, find_factor};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let estimator = QpeEstimator::new(SimulatorBackend::with_seed(7));
//! let factors = find_factor(&estimator, 15, 7, &SearchOptions::default()).await?;
//! assert!(factors.iter().all(|f| *f == 3 || *f == 5));
//! # Ok::<(), qfactor_shor::ShorError>(())
//! # }).unwrap();
//! ```

pub mod arith;
pub mod config;
pub mod error;
pub mod fraction;
pub mod modexp;
pub mod qft;
pub mod qpe;
pub mod search;

pub use config::{PanelDefaults, ShorConfig};
pub use error::{ShorError, ShorResult};
pub use fraction::Ratio;
pub use modexp::{MODULUS, ModExpBase, SUPPORTED_BASES, WORK_QUBITS, c_amod15};
pub use qft::qft_dagger;
pub use qpe::{MAX_COUNTING_QUBITS, PhaseSource, QpeEstimator, qpe_circuit, reading_to_phase};
pub use search::{
    RetryPolicy, SearchOptions, SearchOutcome, SearchReport, find_factor, find_factor_return1st,
    search, search_first, search_with_transcript,
};
