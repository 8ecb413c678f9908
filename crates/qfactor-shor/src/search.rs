//! The factor search loop.
//!
//! Each attempt asks the [`PhaseSource`] for one phase `s/r`, recovers `r`
//! as the denominator of the best approximation with denominator at most
//! `N`, and tests `gcd(a^(r/2) ± 1, N)`. The loop runs until an attempt
//! yields a non-trivial factor or the [`RetryPolicy`] gives up.
//!
//! The deadline is checked once at the end of every attempt, after the
//! guesses have been tested; an attempt that finds a factor but finishes
//! past the deadline still reports a timeout. A running phase estimate is
//! never interrupted.

use std::io::{self, Write};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::arith::{factor_guesses, is_prime};
use crate::error::{ShorError, ShorResult};
use crate::fraction::Ratio;
use crate::qpe::PhaseSource;

/// When the search loop gives up.
///
/// A zero or absent timeout means no deadline; an absent `max_attempts`
/// means no attempt limit. Running out of attempts is reported like a
/// timeout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Wall-clock budget for the whole search, in seconds in YAML.
    #[serde(with = "opt_secs", rename = "timeout_secs")]
    pub timeout: Option<Duration>,
    /// Maximum number of phase estimates.
    pub max_attempts: Option<u64>,
}

impl RetryPolicy {
    /// Retry until a factor is found.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Set the deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the deadline from fractional seconds; non-positive means none.
    #[must_use]
    pub fn with_timeout_secs(self, secs: f64) -> Self {
        match Duration::try_from_secs_f64(secs) {
            Ok(timeout) if !timeout.is_zero() => self.with_timeout(timeout),
            _ => Self {
                timeout: None,
                ..self
            },
        }
    }

    /// Set the attempt limit.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Whether `elapsed` is past a non-zero deadline.
    pub fn deadline_passed(&self, elapsed: Duration) -> bool {
        self.timeout.is_some_and(|t| !t.is_zero() && elapsed > t)
    }

    /// Whether `attempts` have used up the attempt limit.
    pub fn attempts_exhausted(&self, attempts: u64) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Search parameters shared by both entry points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Width of the counting register.
    pub qubits_count: u32,
    /// Print every attempt to stdout.
    pub show: bool,
    /// When to give up.
    pub retry: RetryPolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            qubits_count: 8,
            show: false,
            retry: RetryPolicy::default(),
        }
    }
}

impl SearchOptions {
    /// Options with the given counting register width.
    pub fn new(qubits_count: u32) -> Self {
        Self {
            qubits_count,
            ..Self::default()
        }
    }

    /// Enable or disable console output.
    #[must_use]
    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Shorthand for a timeout in seconds (0 disables it).
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: f64) -> Self {
        self.retry = self.retry.with_timeout_secs(secs);
        self
    }
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// An attempt produced at least one factor.
    Found,
    /// Decided classically without running the phase source.
    ShortCircuit,
    /// The deadline passed.
    TimedOut,
    /// The attempt limit was reached.
    AttemptsExhausted,
}

/// Diagnostics for one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Valid factors of the successful attempt, in guess order.
    pub factors: Vec<u64>,
    /// Number of phase estimates made.
    pub attempts: u64,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// Why the loop stopped.
    pub outcome: SearchOutcome,
}

impl SearchReport {
    /// Whether any factor was found.
    pub fn is_found(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Found | SearchOutcome::ShortCircuit)
    }
}

fn check_modulus(n: u64) -> ShorResult<()> {
    if n < 2 || n > u64::from(u32::MAX) {
        return Err(ShorError::InvalidModulus(n));
    }
    Ok(())
}

/// Run the search loop and report how it ended.
///
/// With `opts.show`, the per-attempt transcript goes to stdout.
pub async fn search<S>(source: &S, n: u64, a: u64, opts: &SearchOptions) -> ShorResult<SearchReport>
where
    S: PhaseSource + ?Sized,
{
    search_with_transcript(source, n, a, opts, &mut io::stdout()).await
}

/// [`search`], writing the `opts.show` transcript to `out`.
#[instrument(skip(source, opts, out), fields(phase_source = source.label()))]
pub async fn search_with_transcript<S, W>(
    source: &S,
    n: u64,
    a: u64,
    opts: &SearchOptions,
    out: &mut W,
) -> ShorResult<SearchReport>
where
    S: PhaseSource + ?Sized,
    W: Write + Send + ?Sized,
{
    check_modulus(n)?;

    let start = Instant::now();
    let mut attempts = 0u64;

    loop {
        attempts += 1;
        if opts.show {
            writeln!(out, "\nAttempt {attempts}:")?;
        }

        let phase = source.estimate_phase(a, opts.qubits_count, opts.show).await?;
        let r = Ratio::from_phase(phase).limit_denominator(n).denom;
        if opts.show {
            writeln!(out, "Result: r = {r}")?;
        }
        debug!(attempt = attempts, phase, r, "phase estimated");

        let mut found = Vec::new();
        if phase != 0.0 {
            if r % 2 == 1 {
                debug!(r, "odd order estimate, using floor(r/2)");
            }
            let guesses = factor_guesses(a, r / 2, n);
            if opts.show {
                writeln!(out, "Guessed Factors: {} and {}", guesses[0], guesses[1])?;
            }
            for guess in guesses {
                if guess != 1 && guess != n && n % guess == 0 {
                    if opts.show {
                        writeln!(out, "*** Non-trivial factor found: {guess} ***")?;
                    }
                    found.push(guess);
                }
            }
        }

        let elapsed = start.elapsed();
        if opts.retry.deadline_passed(elapsed) {
            warn!(attempts, ?elapsed, "search timed out");
            return Ok(SearchReport {
                factors: Vec::new(),
                attempts,
                elapsed,
                outcome: SearchOutcome::TimedOut,
            });
        }

        if !found.is_empty() {
            info!(attempts, factors = ?found, "non-trivial factor found");
            return Ok(SearchReport {
                factors: found,
                attempts,
                elapsed,
                outcome: SearchOutcome::Found,
            });
        }

        if opts.retry.attempts_exhausted(attempts) {
            warn!(attempts, "attempt limit reached without a factor");
            return Ok(SearchReport {
                factors: Vec::new(),
                attempts,
                elapsed,
                outcome: SearchOutcome::AttemptsExhausted,
            });
        }
    }
}

/// All factors found by the first successful attempt, or an empty list
/// when the retry policy gives up.
pub async fn find_factor<S>(source: &S, n: u64, a: u64, opts: &SearchOptions) -> ShorResult<Vec<u64>>
where
    S: PhaseSource + ?Sized,
{
    Ok(search(source, n, a, opts).await?.factors)
}

/// Like [`search`], but answers primes and even numbers without running
/// the phase source.
pub async fn search_first<S>(
    source: &S,
    n: u64,
    a: u64,
    opts: &SearchOptions,
) -> ShorResult<SearchReport>
where
    S: PhaseSource + ?Sized,
{
    check_modulus(n)?;

    let short = if is_prime(n) {
        Some(n)
    } else if n % 2 == 0 {
        Some(2)
    } else {
        None
    };
    if let Some(factor) = short {
        debug!(n, factor, "answered classically");
        return Ok(SearchReport {
            factors: vec![factor],
            attempts: 0,
            elapsed: Duration::ZERO,
            outcome: SearchOutcome::ShortCircuit,
        });
    }

    let mut report = search(source, n, a, opts).await?;
    report.factors.truncate(1);
    Ok(report)
}

/// The first factor found: `n` itself for a prime, 2 for an even number,
/// `None` when the retry policy gives up.
pub async fn find_factor_return1st<S>(
    source: &S,
    n: u64,
    a: u64,
    opts: &SearchOptions,
) -> ShorResult<Option<u64>>
where
    S: PhaseSource + ?Sized,
{
    Ok(search_first(source, n, a, opts).await?.factors.first().copied())
}

mod opt_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs_f64()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        match Option::<f64>::deserialize(d)? {
            None => Ok(None),
            Some(secs) => Duration::try_from_secs_f64(secs)
                .map(|t| (!t.is_zero()).then_some(t))
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Replays a fixed list of phases, repeating the last one.
    struct Scripted {
        phases: Vec<f64>,
        calls: AtomicU64,
        delay: Option<Duration>,
    }

    impl Scripted {
        fn new(phases: &[f64]) -> Self {
            Self {
                phases: phases.to_vec(),
                calls: AtomicU64::new(0),
                delay: None,
            }
        }

        fn slow(phases: &[f64], delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new(phases)
            }
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PhaseSource for Scripted {
        fn label(&self) -> &str {
            "scripted"
        }

        async fn estimate_phase(&self, _a: u64, _n: u32, _show: bool) -> ShorResult<f64> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.phases[i.min(self.phases.len() - 1)])
        }
    }

    /// Records the bases it is asked for.
    struct Recording(Mutex<Vec<u64>>);

    #[async_trait]
    impl PhaseSource for Recording {
        fn label(&self) -> &str {
            "recording"
        }

        async fn estimate_phase(&self, a: u64, _n: u32, _show: bool) -> ShorResult<f64> {
            self.0.lock().unwrap().push(a);
            Ok(0.25)
        }
    }

    #[tokio::test]
    async fn test_zero_phase_is_skipped() {
        let source = Scripted::new(&[0.0, 0.0, 0.25]);
        let report = search(&source, 15, 7, &SearchOptions::default()).await.unwrap();
        assert_eq!(report.attempts, 3);
        // r = 4: gcd(48, 15) = 3 and gcd(50, 15) = 5
        assert_eq!(report.factors, vec![3, 5]);
        assert_eq!(report.outcome, SearchOutcome::Found);
    }

    #[tokio::test]
    async fn test_transcript_of_each_attempt() {
        let source = Scripted::new(&[0.0, 0.25]);
        let opts = SearchOptions::default().with_show(true);
        let mut out: Vec<u8> = Vec::new();
        let report = search_with_transcript(&source, 15, 7, &opts, &mut out).await.unwrap();

        assert_eq!(report.factors, vec![3, 5]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nAttempt 1:\n\
             Result: r = 1\n\
             \nAttempt 2:\n\
             Result: r = 4\n\
             Guessed Factors: 3 and 5\n\
             *** Non-trivial factor found: 3 ***\n\
             *** Non-trivial factor found: 5 ***\n"
        );
    }

    #[tokio::test]
    async fn test_quiet_search_writes_nothing() {
        let source = Scripted::new(&[0.25]);
        let mut out: Vec<u8> = Vec::new();
        search_with_transcript(&source, 15, 7, &SearchOptions::default(), &mut out)
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_uninformative_order_retries() {
        // 0.5 gives r = 2 and 7^1: gcd(6, 15) = 3, gcd(8, 15) = 1.
        let source = Scripted::new(&[0.5]);
        let factors = find_factor(&source, 15, 7, &SearchOptions::default()).await.unwrap();
        assert_eq!(factors, vec![3]);

        // For a = 4, r = 2 gives 4^1: gcd(3, 15) = 3, gcd(5, 15) = 5.
        let source = Scripted::new(&[0.5]);
        let factors = find_factor(&source, 15, 4, &SearchOptions::default()).await.unwrap();
        assert_eq!(factors, vec![3, 5]);
    }

    #[tokio::test]
    async fn test_odd_order_uses_floor_division() {
        // 1/3 gives r = 3, r/2 = 1: 2^1 -> gcd(1, 15) = 1, gcd(3, 15) = 3
        let source = Scripted::new(&[1.0 / 3.0]);
        let factors = find_factor(&source, 15, 2, &SearchOptions::default()).await.unwrap();
        assert_eq!(factors, vec![3]);
    }

    #[tokio::test]
    async fn test_return_first_short_circuits() {
        let source = Scripted::new(&[0.25]);
        let opts = SearchOptions::default();

        assert_eq!(find_factor_return1st(&source, 7, 2, &opts).await.unwrap(), Some(7));
        assert_eq!(find_factor_return1st(&source, 2, 2, &opts).await.unwrap(), Some(2));
        assert_eq!(find_factor_return1st(&source, 14, 2, &opts).await.unwrap(), Some(2));
        assert_eq!(source.calls(), 0);

        assert_eq!(find_factor_return1st(&source, 15, 7, &opts).await.unwrap(), Some(3));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_short_circuit_ignores_base() {
        let source = Recording(Mutex::new(Vec::new()));
        let report = search_first(&source, 13, 1, &SearchOptions::default()).await.unwrap();
        assert_eq!(report.outcome, SearchOutcome::ShortCircuit);
        assert!(source.0.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_empty() {
        let source = Scripted::slow(&[0.0], Duration::from_millis(300));
        let opts = SearchOptions::default().with_timeout_secs(1.0);

        let report = search(&source, 15, 7, &opts).await.unwrap();
        assert_eq!(report.outcome, SearchOutcome::TimedOut);
        assert!(report.factors.is_empty());
        // 300ms per attempt: the fourth attempt ends at 1.2s.
        assert_eq!(report.attempts, 4);

        let source = Scripted::slow(&[0.0], Duration::from_millis(300));
        assert_eq!(find_factor_return1st(&source, 15, 7, &opts).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_factor_still_times_out() {
        let source = Scripted::slow(&[0.25], Duration::from_secs(2));
        let opts = SearchOptions::default().with_timeout_secs(1.0);
        let report = search(&source, 15, 7, &opts).await.unwrap();
        assert_eq!(report.outcome, SearchOutcome::TimedOut);
        assert_eq!(report.attempts, 1);
    }

    #[tokio::test]
    async fn test_attempt_limit() {
        let source = Scripted::new(&[0.0]);
        let opts = SearchOptions::default().with_retry(RetryPolicy::unbounded().with_max_attempts(5));
        let report = search(&source, 15, 7, &opts).await.unwrap();
        assert_eq!(report.outcome, SearchOutcome::AttemptsExhausted);
        assert_eq!(report.attempts, 5);
        assert!(!report.is_found());
    }

    #[tokio::test]
    async fn test_invalid_modulus() {
        let source = Scripted::new(&[0.25]);
        for n in [0, 1, u64::from(u32::MAX) + 1] {
            assert!(matches!(
                find_factor(&source, n, 7, &SearchOptions::default()).await,
                Err(ShorError::InvalidModulus(_))
            ));
        }
    }

    #[test]
    fn test_retry_policy_deadline() {
        let policy = RetryPolicy::unbounded();
        assert!(!policy.deadline_passed(Duration::from_secs(1_000_000)));

        let policy = RetryPolicy::unbounded().with_timeout(Duration::ZERO);
        assert!(!policy.deadline_passed(Duration::from_secs(5)));

        let policy = RetryPolicy::unbounded().with_timeout_secs(0.5);
        assert!(!policy.deadline_passed(Duration::from_millis(500)));
        assert!(policy.deadline_passed(Duration::from_millis(501)));

        assert_eq!(RetryPolicy::unbounded().with_timeout_secs(-1.0).timeout, None);
    }

    #[test]
    fn test_options_from_yaml() {
        let opts: SearchOptions =
            serde_yaml_ng::from_str("qubits_count: 6\nretry:\n  timeout_secs: 2.5\n  max_attempts: 9\n")
                .unwrap();
        assert_eq!(opts.qubits_count, 6);
        assert!(!opts.show);
        assert_eq!(opts.retry.timeout, Some(Duration::from_millis(2500)));
        assert_eq!(opts.retry.max_attempts, Some(9));

        let zero: RetryPolicy = serde_yaml_ng::from_str("timeout_secs: 0").unwrap();
        assert_eq!(zero.timeout, None);
    }
}
