//! Execution results and measurement counts.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Measurement counts keyed by bitstring.
///
/// Bitstrings are in big-endian order: the leftmost character is the
/// highest-numbered classical bit. A 4-qubit all-zeros outcome is `"0000"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create an empty counts table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of a bitstring.
    pub fn record(&mut self, bitstring: impl Into<String>) {
        *self.counts.entry(bitstring.into()).or_insert(0) += 1;
    }

    /// Add `n` observations of a bitstring.
    pub fn add(&mut self, bitstring: impl Into<String>, n: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += n;
    }

    /// Get the count for a bitstring (0 if never observed).
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of shots recorded.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct outcomes observed.
    pub fn num_outcomes(&self) -> usize {
        self.counts.len()
    }

    /// Empirical probability of a bitstring.
    ///
    /// Returns 0.0 when no shots have been recorded.
    pub fn probability(&self, bitstring: &str) -> f64 {
        let total = self.total_shots();
        if total == 0 {
            0.0
        } else {
            self.get(bitstring) as f64 / total as f64
        }
    }

    /// Empirical probability of the all-zeros outcome on `num_bits` bits.
    ///
    /// This is the echo return probability F(d) of the OTOC protocol.
    pub fn all_zeros_probability(&self, num_bits: usize) -> f64 {
        self.probability(&"0".repeat(num_bits))
    }

    /// The most frequently observed outcome, if any.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.counts
            .iter()
            .max_by_key(|(bits, count)| (*count, std::cmp::Reverse(bits.as_str())))
            .map(|(bits, count)| (bits.as_str(), *count))
    }

    /// Outcomes sorted by descending count, ties broken by bitstring.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self
            .counts
            .iter()
            .map(|(bits, count)| (bits.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        entries
    }

    /// Iterate over (bitstring, count) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(bits, count)| (bits.as_str(), *count))
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// Result of executing a circuit on a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement counts.
    pub counts: Counts,
    /// Number of shots requested.
    pub shots: u32,
    /// Backend the circuit ran on.
    pub backend: String,
    /// Wall-clock execution time in milliseconds, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    /// Create a new result.
    pub fn new(counts: Counts, shots: u32, backend: impl Into<String>) -> Self {
        Self {
            counts,
            shots,
            backend: backend.into(),
            execution_time_ms: None,
        }
    }

    /// Attach the execution time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Echo return probability: fraction of shots landing on all-zeros.
    pub fn return_probability(&self, num_bits: usize) -> f64 {
        self.counts.all_zeros_probability(num_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_record_and_get() {
        let mut counts = Counts::new();
        counts.record("00");
        counts.record("00");
        counts.record("11");

        assert_eq!(counts.get("00"), 2);
        assert_eq!(counts.get("11"), 1);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total_shots(), 3);
        assert_eq!(counts.num_outcomes(), 2);
    }

    #[test]
    fn test_counts_probability() {
        let counts: Counts = [("0000".to_string(), 900u64), ("0001".to_string(), 100)]
            .into_iter()
            .collect();

        assert!((counts.probability("0000") - 0.9).abs() < 1e-12);
        assert!((counts.all_zeros_probability(4) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_empty_counts_probability_is_zero() {
        let counts = Counts::new();
        assert_eq!(counts.probability("00"), 0.0);
        assert_eq!(counts.total_shots(), 0);
    }

    #[test]
    fn test_most_frequent() {
        let counts: Counts = [
            ("00".to_string(), 10u64),
            ("01".to_string(), 30),
            ("10".to_string(), 5),
        ]
        .into_iter()
        .collect();

        assert_eq!(counts.most_frequent(), Some(("01", 30)));
    }

    #[test]
    fn test_sorted_order() {
        let counts: Counts = [
            ("11".to_string(), 5u64),
            ("00".to_string(), 5),
            ("01".to_string(), 20),
        ]
        .into_iter()
        .collect();

        let sorted = counts.sorted();
        assert_eq!(sorted[0], ("01", 20));
        assert_eq!(sorted[1], ("00", 5));
        assert_eq!(sorted[2], ("11", 5));
    }

    #[test]
    fn test_execution_result_return_probability() {
        let counts: Counts = [("000".to_string(), 750u64), ("101".to_string(), 250)]
            .into_iter()
            .collect();
        let result = ExecutionResult::new(counts, 1000, "simulator").with_execution_time(12);

        assert!((result.return_probability(3) - 0.75).abs() < 1e-12);
        assert_eq!(result.execution_time_ms, Some(12));
    }
}
