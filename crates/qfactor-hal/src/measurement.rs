//! Measurement layout shared by the simulation backends.
//!
//! Simulators evolve the state once and sample it afterwards, so every
//! measurement must be terminal: once a qubit has been measured no later
//! operation may touch it. [`MeasurementLayout`] records which qubit feeds
//! which classical bit and turns a sampled basis-state index into the
//! bitstring reported in [`Counts`](crate::Counts).

use qfactor_ir::{ControlledOp, PrimitiveOp};

/// Qubit-to-clbit wiring of a flattened circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementLayout {
    /// `(qubit, clbit)` pairs in program order.
    pairs: Vec<(usize, usize)>,
    /// Number of characters in each bitstring.
    width: usize,
}

impl MeasurementLayout {
    /// Build the layout for `ops`.
    ///
    /// A circuit without measurements is read out on every qubit, qubit `q`
    /// landing in bit `q`.
    pub fn from_ops(ops: &[ControlledOp], num_qubits: usize, num_clbits: usize) -> Self {
        let pairs: Vec<_> = ops
            .iter()
            .filter_map(|op| match op.op {
                PrimitiveOp::Measure { qubit, clbit } => Some((qubit, clbit)),
                _ => None,
            })
            .collect();

        if pairs.is_empty() {
            Self {
                pairs: (0..num_qubits).map(|q| (q, q)).collect(),
                width: num_qubits,
            }
        } else {
            Self {
                pairs,
                width: num_clbits,
            }
        }
    }

    /// Number of classical bits in each reported bitstring.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Format the classical register for basis state `outcome`.
    ///
    /// The string is most-significant bit first: its first character is
    /// clbit `width - 1`, its last character is clbit 0. Clbits that were
    /// never written read as `0`.
    pub fn bitstring(&self, outcome: usize) -> String {
        let mut bits = vec![false; self.width];
        for &(qubit, clbit) in &self.pairs {
            if let Some(slot) = bits.get_mut(clbit) {
                *slot = (outcome >> qubit) & 1 == 1;
            }
        }
        bits.iter().rev().map(|&b| if b { '1' } else { '0' }).collect()
    }
}

fn qubit_mask(qubit: usize) -> usize {
    if qubit < usize::BITS as usize {
        1 << qubit
    } else {
        0
    }
}

fn touched(op: &PrimitiveOp) -> Vec<usize> {
    match op {
        PrimitiveOp::Single { target, .. } => vec![*target],
        PrimitiveOp::Swap { a, b } => vec![*a, *b],
        PrimitiveOp::Dense { targets, .. } => targets.clone(),
        PrimitiveOp::Reset { qubit } => vec![*qubit],
        PrimitiveOp::Measure { .. } => vec![],
    }
}

/// Problems that prevent sampling `ops` from a single final state.
///
/// Reports every operation that touches (as target or control) a qubit
/// after that qubit has been measured.
pub fn mid_circuit_violations(ops: &[ControlledOp]) -> Vec<String> {
    let mut measured: usize = 0;
    let mut reasons = Vec::new();

    for (position, op) in ops.iter().enumerate() {
        if let PrimitiveOp::Measure { qubit, .. } = op.op {
            measured |= qubit_mask(qubit);
            continue;
        }
        let mut mask = op.controls;
        for q in touched(&op.op) {
            mask |= qubit_mask(q);
        }
        if mask & measured != 0 {
            reasons.push(format!(
                "operation {position} acts on a qubit after it was measured (mid-circuit measurement is not supported)"
            ));
        }
    }

    reasons
}

/// Check whether any operation is a reset.
pub fn has_reset(ops: &[ControlledOp]) -> bool {
    ops.iter()
        .any(|op| matches!(op.op, PrimitiveOp::Reset { .. }))
}
