//! Quantum phase estimation of multiplication by `a` modulo 15.
//!
//! ```text
//!   q0      ─H─────●──────────────────────┌──────┐─M─
//!   q1      ─H─────┼──────●───────────────│      │─M─
//!    ⋮              │      │        ⋯      │ QFT† │
//!   q(n-1)  ─H─────┼──────┼───────●───────│      │─M─
//!                  │      │       │       └──────┘
//!   work    ─X(b3)─a^1────a^2─ ⋯ ─a^2^(n-1)───────────
//! ```
//!
//! Counting qubit `q` is measured into clbit `q`; the reading is reported
//! most-significant clbit first and parses directly as the integer `k` of
//! the phase `k / 2^n`.

use async_trait::async_trait;
use tracing::{debug, instrument};

use qfactor_hal::Backend;
use qfactor_ir::{Circuit, ClbitId, QubitId};

use crate::error::{ShorError, ShorResult};
use crate::modexp::{WORK_QUBITS, c_amod15};
use crate::qft::qft_dagger;

/// Widest counting register accepted.
///
/// The last controlled block repeats its multiplication `2^(n-1)` times.
pub const MAX_COUNTING_QUBITS: u32 = 16;

/// Anything that can run phase estimation and return one measured phase.
#[async_trait]
pub trait PhaseSource: Send + Sync {
    /// Short label used in logs and reports.
    fn label(&self) -> &str;

    /// One phase estimate in `[0, 1)` for base `a` with `n_count` counting
    /// qubits. Prints the raw reading and phase when `show` is set.
    async fn estimate_phase(&self, a: u64, n_count: u32, show: bool) -> ShorResult<f64>;
}

/// Build the phase estimation circuit for base `a`.
///
/// Qubits `0..n_count` form the counting register, qubits
/// `n_count..n_count + 4` the work register, which starts in `|0001⟩`
/// (value 1). The circuit has `n_count` classical bits.
pub fn qpe_circuit(a: u64, n_count: u32) -> ShorResult<Circuit> {
    if n_count == 0 || n_count > MAX_COUNTING_QUBITS {
        return Err(ShorError::InvalidQubitCount(n_count));
    }

    let mut qc = Circuit::with_size(format!("qpe_{a}mod15"), n_count + WORK_QUBITS, n_count);
    for q in 0..n_count {
        qc.h(QubitId(q))?;
    }
    qc.x(QubitId(n_count + WORK_QUBITS - 1))?;

    for q in 0..n_count {
        let gate = c_amod15(a, 1u64 << q)?;
        let operands = std::iter::once(QubitId(q)).chain((0..WORK_QUBITS).map(|i| QubitId(n_count + i)));
        qc.gate(gate, operands)?;
    }

    qc.append(&qft_dagger(n_count)?, (0..n_count).map(QubitId))?;

    for q in 0..n_count {
        qc.measure(QubitId(q), ClbitId(q))?;
    }
    Ok(qc)
}

/// Interpret a reading of `n_count` bits as the phase `int(bits, 2) / 2^n_count`.
pub fn reading_to_phase(bits: &str, n_count: u32) -> ShorResult<f64> {
    if n_count == 0 || n_count >= u64::BITS {
        return Err(ShorError::InvalidQubitCount(n_count));
    }
    if bits.len() != n_count as usize || !bits.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(ShorError::InvalidReading(format!(
            "expected {n_count} binary digits, got '{bits}'"
        )));
    }
    let value =
        u64::from_str_radix(bits, 2).map_err(|_| ShorError::InvalidReading(bits.to_string()))?;
    #[allow(clippy::cast_precision_loss)]
    let phase = value as f64 / (1u64 << n_count) as f64;
    Ok(phase)
}

/// Phase estimation on a HAL backend, one shot per estimate.
pub struct QpeEstimator<B> {
    backend: B,
}

impl<B: Backend> QpeEstimator<B> {
    /// Wrap a backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run the circuit once and return the raw bitstring.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn read_register(&self, a: u64, n_count: u32) -> ShorResult<String> {
        let circuit = qpe_circuit(a, n_count)?;
        let result = self.backend.run(&circuit, 1).await?;
        let reading = result
            .memory
            .and_then(|memory| memory.into_iter().next())
            .ok_or(ShorError::MissingMemory)?;
        debug!(reading = %reading, "register read");
        Ok(reading)
    }
}

#[async_trait]
impl<B: Backend> PhaseSource for QpeEstimator<B> {
    fn label(&self) -> &str {
        self.backend.name()
    }

    async fn estimate_phase(&self, a: u64, n_count: u32, show: bool) -> ShorResult<f64> {
        let reading = self.read_register(a, n_count).await?;
        if show {
            println!("Register Reading: {reading}");
        }
        let phase = reading_to_phase(&reading, n_count)?;
        if show {
            println!("Corresponding Phase: {phase:.6}");
        }
        Ok(phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfactor_adapter_sim::SimulatorBackend;
    use qfactor_ir::InstructionKind;

    #[test]
    fn test_circuit_layout() {
        let qc = qpe_circuit(7, 8).unwrap();
        assert_eq!(qc.num_qubits(), 12);
        assert_eq!(qc.num_clbits(), 8);

        let ops = qc.count_ops();
        assert_eq!(ops.get("h"), Some(&8));
        assert_eq!(ops.get("x"), Some(&1));
        assert_eq!(ops.get("measure"), Some(&8));
        assert_eq!(ops.get("QFT†"), Some(&1));
        assert_eq!(ops.get("7^128 mod 15"), Some(&1));
        assert_eq!(ops.get("7^1 mod 15"), Some(&1));
    }

    #[test]
    fn test_controls_come_from_counting_register() {
        let qc = qpe_circuit(2, 3).unwrap();
        let blocks: Vec<_> = qc
            .instructions()
            .filter(|i| i.name().ends_with("mod 15"))
            .map(|i| i.qubits.clone())
            .collect();
        assert_eq!(blocks.len(), 3);
        for (q, operands) in blocks.iter().enumerate() {
            assert_eq!(operands[0], QubitId(q as u32));
            assert_eq!(&operands[1..], &[QubitId(3), QubitId(4), QubitId(5), QubitId(6)]);
        }
    }

    #[test]
    fn test_measures_counting_qubit_into_same_clbit() {
        let qc = qpe_circuit(4, 4).unwrap();
        for inst in qc.instructions().filter(|i| matches!(i.kind, InstructionKind::Measure)) {
            assert_eq!(inst.qubits[0].0, inst.clbits[0].0);
        }
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(qpe_circuit(7, 0), Err(ShorError::InvalidQubitCount(0))));
        assert!(matches!(qpe_circuit(7, 17), Err(ShorError::InvalidQubitCount(17))));
        assert!(matches!(qpe_circuit(3, 8), Err(ShorError::InvalidBase { base: 3 })));
    }

    #[test]
    fn test_reading_to_phase() {
        assert_eq!(reading_to_phase("01000000", 8).unwrap(), 0.25);
        assert_eq!(reading_to_phase("11000000", 8).unwrap(), 0.75);
        assert_eq!(reading_to_phase("00000000", 8).unwrap(), 0.0);
        assert!(reading_to_phase("0100", 8).is_err());
        assert!(reading_to_phase("0120", 4).is_err());
    }

    #[tokio::test]
    async fn test_phases_are_multiples_of_a_quarter() {
        // 7 has order 4 mod 15, so only k/4 can be read with 8 qubits.
        let estimator = QpeEstimator::new(SimulatorBackend::with_seed(15));
        for _ in 0..16 {
            let phase = estimator.estimate_phase(7, 8, false).await.unwrap();
            assert!([0.0, 0.25, 0.5, 0.75].contains(&phase), "phase {phase}");
        }
    }

    #[tokio::test]
    async fn test_order_two_base() {
        // 4^2 = 16 = 1 mod 15: phases 0 and 1/2 only.
        let estimator = QpeEstimator::new(SimulatorBackend::with_seed(4));
        for _ in 0..8 {
            let phase = estimator.estimate_phase(4, 4, false).await.unwrap();
            assert!(phase == 0.0 || phase == 0.5, "phase {phase}");
        }
        assert_eq!(estimator.label(), "statevector");
    }
}
