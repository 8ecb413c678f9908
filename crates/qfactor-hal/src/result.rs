//! Execution results.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Histogram of measured bitstrings.
///
/// Bitstrings are written most-significant classical bit first, so the
/// string for clbits `c_{n-1} … c_0` parses as the integer register value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a histogram from `(bitstring, count)` pairs.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, u64)>) -> Self {
        let mut counts = Self::new();
        for (bitstring, count) in pairs {
            counts.insert(bitstring, count);
        }
        counts
    }

    /// Add `count` occurrences of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Number of occurrences of `bitstring` (zero if never seen).
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Iterate over `(bitstring, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// Number of distinct bitstrings.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check whether no outcome was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// The most frequent outcome; ties go to the lexicographically smallest.
    pub fn most_frequent(&self) -> Option<(&String, u64)> {
        self.sorted().into_iter().next()
    }

    /// Outcomes sorted by descending count, then by bitstring.
    pub fn sorted(&self) -> Vec<(&String, u64)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(k, v)| (k, *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

/// Result of executing a circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement histogram.
    pub counts: Counts,
    /// Number of shots executed.
    pub shots: u32,
    /// Per-shot bitstrings in execution order, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<Vec<String>>,
    /// Wall-clock execution time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Backend-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ExecutionResult {
    /// Create a result from a histogram.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            memory: None,
            execution_time_ms: None,
            metadata: None,
        }
    }

    /// Attach per-shot memory.
    #[must_use]
    pub fn with_memory(mut self, memory: Vec<String>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Attach the execution time.
    #[must_use]
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Attach backend metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
