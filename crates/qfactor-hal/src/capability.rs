//! Backend capability introspection.
//!
//! [`Capabilities`] describes what a backend can run: qubit count, supported
//! gates, shot limits and a free-form feature vocabulary
//! (`"statevector"`, `"sparse"`, `"custom_gates"`, `"controlled_gates"`).

use serde::{Deserialize, Serialize};

/// Capabilities of a simulation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set.
    pub gate_set: GateSet,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Additional capability flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Create capabilities for a simulator.
    pub fn simulator(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::universal(),
            max_shots: 100_000,
            is_simulator: true,
            features: vec!["custom_gates".into(), "controlled_gates".into()],
        }
    }

    /// Add a feature flag.
    #[must_use]
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Check whether a feature flag is present.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Gate set supported by a backend (OpenQASM 3 naming).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Three-qubit gates supported.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub three_qubit: Vec<String>,
}

impl GateSet {
    /// Every standard gate of the IR.
    pub fn universal() -> Self {
        let names = |list: &[&str]| -> Vec<String> {
            list.iter().map(|s| (*s).to_string()).collect()
        };
        Self {
            single_qubit: names(&[
                "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "rx", "ry", "rz", "p",
            ]),
            two_qubit: names(&["cx", "cz", "cp", "swap"]),
            three_qubit: names(&["ccx", "cswap"]),
        }
    }

    /// Check if a gate is supported (single-qubit, two-qubit, or three-qubit).
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate)
            || self.two_qubit.iter().any(|g| g == gate)
            || self.three_qubit.iter().any(|g| g == gate)
    }

    /// Total number of supported standard gates.
    pub fn len(&self) -> usize {
        self.single_qubit.len() + self.two_qubit.len() + self.three_qubit.len()
    }

    /// Check whether the gate set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_capabilities() {
        let caps = Capabilities::simulator("statevector", 20).with_feature("statevector");
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
        assert!(caps.has_feature("statevector"));
        assert!(caps.has_feature("custom_gates"));
        assert!(!caps.has_feature("sparse"));
    }

    #[test]
    fn test_universal_gate_set() {
        let gs = GateSet::universal();
        assert!(gs.contains("h"));
        assert!(gs.contains("cp"));
        assert!(gs.contains("cswap"));
        assert!(!gs.contains("iswap"));
        assert_eq!(gs.len(), 19);
    }

    #[test]
    fn test_capabilities_serialise() {
        let caps = Capabilities::simulator("sparse", 24);
        let json = serde_json::to_string(&caps).unwrap();
        let decoded: Capabilities = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.name, "sparse");
        assert_eq!(decoded.gate_set.len(), 19);
    }
}
