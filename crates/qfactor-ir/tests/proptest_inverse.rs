//! Property-based tests for circuit inversion.
//!
//! Inverting twice must give back the original instruction sequence, and
//! inversion never changes width, size or depth.

use qfactor_ir::{Circuit, QubitId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    T(u32),
    Rz(f64, u32),
    Cp(f64, u32, u32),
    Swap(u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        // Ops with duplicate operands are rejected by the DAG; skip them.
        let _ = match self {
            GateOp::H(q) => circuit.h(QubitId(q)),
            GateOp::T(q) => circuit.t(QubitId(q)),
            GateOp::Rz(theta, q) => circuit.rz(theta, QubitId(q)),
            GateOp::Cp(theta, c, t) => circuit.cp(theta, QubitId(c), QubitId(t)),
            GateOp::Swap(a, b) => circuit.swap(QubitId(a), QubitId(b)),
        };
    }
}

fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    prop_oneof![
        (0..num_qubits).prop_map(GateOp::H),
        (0..num_qubits).prop_map(GateOp::T),
        (-3.0_f64..3.0, 0..num_qubits).prop_map(|(t, q)| GateOp::Rz(t, q)),
        (-3.0_f64..3.0, 0..num_qubits, 0..num_qubits).prop_map(|(t, c, q)| GateOp::Cp(t, c, q)),
        (0..num_qubits, 0..num_qubits).prop_map(|(a, b)| GateOp::Swap(a, b)),
    ]
}

fn arb_unitary_circuit() -> impl Strategy<Value = Circuit> {
    (2_u32..=5).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 1..=20).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("random", num_qubits, 0);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

proptest! {
    #[test]
    fn double_inverse_is_identity(circuit in arb_unitary_circuit()) {
        let twice = circuit.inverse().unwrap().inverse().unwrap();
        let original: Vec<_> = circuit.instructions().cloned().collect();
        let restored: Vec<_> = twice.instructions().cloned().collect();
        prop_assert_eq!(original, restored);
    }

    #[test]
    fn inverse_preserves_shape(circuit in arb_unitary_circuit()) {
        let inv = circuit.inverse().unwrap();
        prop_assert_eq!(inv.num_qubits(), circuit.num_qubits());
        prop_assert_eq!(inv.size(), circuit.size());
        prop_assert_eq!(inv.depth(), circuit.depth());
    }
}
