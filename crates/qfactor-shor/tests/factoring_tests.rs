//! End-to-end factoring of 15 on both simulators.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use qfactor_adapter_sim::SimulatorBackend;
use qfactor_adapter_sparse::SparseBackend;
use qfactor_shor::{
    PhaseSource, QpeEstimator, RetryPolicy, SearchOptions, SearchOutcome, ShorError, ShorResult,
    find_factor, find_factor_return1st, search,
};

/// Counts calls before delegating to a real estimator.
struct Counting<S> {
    inner: S,
    calls: AtomicU64,
}

impl<S> Counting<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicU64::new(0),
        }
    }

    fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: PhaseSource> PhaseSource for Counting<S> {
    fn label(&self) -> &str {
        self.inner.label()
    }

    async fn estimate_phase(&self, a: u64, n_count: u32, show: bool) -> ShorResult<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.estimate_phase(a, n_count, show).await
    }
}

#[tokio::test]
async fn statevector_factors_fifteen() {
    let estimator = QpeEstimator::new(SimulatorBackend::with_seed(1));
    let factors = find_factor(&estimator, 15, 7, &SearchOptions::default())
        .await
        .unwrap();
    assert!(!factors.is_empty());
    assert!(factors.iter().all(|f| *f == 3 || *f == 5), "{factors:?}");
}

#[tokio::test]
async fn sparse_returns_first_factor_of_fifteen() {
    let estimator = QpeEstimator::new(SparseBackend::with_seed(2));
    let factor = find_factor_return1st(&estimator, 15, 7, &SearchOptions::default())
        .await
        .unwrap();
    assert!(matches!(factor, Some(3 | 5)), "{factor:?}");
}

#[tokio::test]
async fn every_base_factors_fifteen() {
    for a in [2, 4, 7, 8, 11, 13] {
        let estimator = QpeEstimator::new(SimulatorBackend::with_seed(a));
        let report = search(&estimator, 15, a, &SearchOptions::new(4)).await.unwrap();
        assert_eq!(report.outcome, SearchOutcome::Found, "a={a}");
        assert!(report.factors.iter().all(|f| *f == 3 || *f == 5));
    }
}

#[tokio::test]
async fn nine_terminates_through_the_quantum_loop() {
    // The circuit still multiplies mod 15; its order-4 phases happen to
    // give r = 2 or 4, and 2^1 + 1 = 3 divides 9.
    let estimator = Counting::new(QpeEstimator::new(SimulatorBackend::with_seed(9)));
    let factor = find_factor_return1st(&estimator, 9, 2, &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(factor, Some(3));
    assert!(estimator.calls() >= 1);
}

#[tokio::test]
async fn prime_is_answered_without_simulation() {
    let estimator = Counting::new(QpeEstimator::new(SparseBackend::new()));
    let factor = find_factor_return1st(&estimator, 7, 2, &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(factor, Some(7));
    assert_eq!(estimator.calls(), 0);
}

#[tokio::test]
async fn invalid_base_fails_before_the_deadline() {
    let estimator = QpeEstimator::new(SimulatorBackend::new());
    let opts = SearchOptions::default().with_timeout_secs(0.001);
    let err = find_factor(&estimator, 15, 1, &opts).await.unwrap_err();
    assert!(matches!(err, ShorError::InvalidBase { base: 1 }));
}

#[tokio::test]
async fn fourteen_with_base_two_never_succeeds() {
    // Only r = 2 and r = 4 come out, and neither gives a factor of 14.
    let estimator = QpeEstimator::new(SimulatorBackend::with_seed(14));
    let opts = SearchOptions::default().with_retry(RetryPolicy::unbounded().with_max_attempts(6));
    let report = search(&estimator, 14, 2, &opts).await.unwrap();
    assert_eq!(report.outcome, SearchOutcome::AttemptsExhausted);
    assert!(report.factors.is_empty());
    assert_eq!(report.attempts, 6);
}

#[tokio::test]
async fn backends_read_the_same_phases() {
    let dense = QpeEstimator::new(SimulatorBackend::with_seed(5));
    let sparse = QpeEstimator::new(SparseBackend::with_seed(5));
    for _ in 0..8 {
        for source in [&dense as &dyn PhaseSource, &sparse] {
            let phase = source.estimate_phase(11, 6, false).await.unwrap();
            // 11 has order 2 mod 15
            assert!(phase == 0.0 || phase == 0.5, "{}: {phase}", source.label());
        }
    }
}
