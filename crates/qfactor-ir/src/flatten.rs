//! Lowering of circuits into controlled primitive operations.
//!
//! Simulators do not interpret named gates directly. [`flatten`] walks the
//! circuit, expands every custom gate through its definition (or falls back
//! to its matrix) and folds control operands into a bit mask, producing a
//! flat stream of [`ControlledOp`]s over physical qubit indices.
//!
//! Multi-qubit standard gates reduce to a controlled single-qubit kernel or
//! a controlled swap:
//!
//! | Gate | Controls | Primitive |
//! |------|----------|-----------|
//! | `cx` | q0 | X on q1 |
//! | `cz` | q0 | Z on q1 |
//! | `cp(θ)` | q0 | P(θ) on q1 |
//! | `ccx` | q0, q1 | X on q2 |
//! | `swap` | none | swap q0, q1 |
//! | `cswap` | q0 | swap q1, q2 |

use num_complex::Complex64;

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::{GateKind, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::QubitId;
use crate::unitary::Unitary2x2;

/// A primitive operation on physical qubit indices.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveOp {
    /// A 2x2 unitary on one qubit.
    Single {
        /// Target qubit index.
        target: usize,
        /// The unitary.
        matrix: Unitary2x2,
    },
    /// Exchange two qubits.
    Swap {
        /// First qubit index.
        a: usize,
        /// Second qubit index.
        b: usize,
    },
    /// A dense `2^k × 2^k` unitary on `targets`.
    ///
    /// Row and column indices are little-endian over `targets`: bit `j` of
    /// the local index is the value of `targets[j]`.
    Dense {
        /// Target qubit indices.
        targets: Vec<usize>,
        /// Row-major matrix.
        matrix: Vec<Complex64>,
    },
    /// Reset a qubit to |0⟩.
    Reset {
        /// Qubit index.
        qubit: usize,
    },
    /// Measure a qubit into a classical bit.
    Measure {
        /// Qubit index.
        qubit: usize,
        /// Classical bit index.
        clbit: usize,
    },
}

/// A primitive applied only where every qubit in `controls` is |1⟩.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlledOp {
    /// Bit mask of control qubits (bit `q` set for qubit `q`).
    pub controls: usize,
    /// The operation.
    pub op: PrimitiveOp,
}

impl ControlledOp {
    fn new(controls: usize, op: PrimitiveOp) -> Self {
        Self { controls, op }
    }
}

/// Lower `circuit` into a flat sequence of controlled primitives.
///
/// Barriers are dropped. Measurements and resets are only allowed at the
/// top level; inside a gate body they yield [`IrError::NonUnitary`].
pub fn flatten(circuit: &Circuit) -> IrResult<Vec<ControlledOp>> {
    let mut out = Vec::with_capacity(circuit.size());
    for inst in circuit.instructions() {
        lower(inst, 0, true, &mut out)?;
    }
    Ok(out)
}

fn bit(qubit: QubitId) -> IrResult<usize> {
    if qubit.index() >= usize::BITS as usize {
        return Err(IrError::InvalidDag(format!(
            "qubit {qubit} does not fit into a control mask"
        )));
    }
    Ok(1usize << qubit.index())
}

fn lower(
    inst: &Instruction,
    controls: usize,
    top_level: bool,
    out: &mut Vec<ControlledOp>,
) -> IrResult<()> {
    match &inst.kind {
        InstructionKind::Barrier => Ok(()),
        InstructionKind::Measure | InstructionKind::Reset if !top_level => {
            Err(IrError::NonUnitary(inst.name().to_string()))
        }
        InstructionKind::Measure => {
            for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                out.push(ControlledOp::new(
                    0,
                    PrimitiveOp::Measure {
                        qubit: q.index(),
                        clbit: c.index(),
                    },
                ));
            }
            Ok(())
        }
        InstructionKind::Reset => {
            for q in &inst.qubits {
                out.push(ControlledOp::new(0, PrimitiveOp::Reset { qubit: q.index() }));
            }
            Ok(())
        }
        InstructionKind::Gate(gate) => match &gate.kind {
            GateKind::Standard(std_gate) => lower_standard(std_gate, &inst.qubits, controls, out),
            GateKind::Custom(custom) => {
                let split = custom.num_ctrl_qubits as usize;
                if inst.qubits.len() != custom.num_qubits as usize || split > inst.qubits.len() {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: custom.name.clone(),
                        expected: custom.num_qubits,
                        got: u32::try_from(inst.qubits.len()).unwrap_or(u32::MAX),
                    });
                }
                let (ctrl_qubits, targets) = inst.qubits.split_at(split);

                let mut mask = controls;
                for &q in ctrl_qubits {
                    mask |= bit(q)?;
                }

                if let Some(body) = &custom.definition {
                    for sub in body {
                        lower(&sub.remap(targets)?, mask, false, out)?;
                    }
                    Ok(())
                } else if let Some(matrix) = &custom.matrix {
                    out.push(ControlledOp::new(
                        mask,
                        PrimitiveOp::Dense {
                            targets: targets.iter().map(|q| q.index()).collect(),
                            matrix: matrix.clone(),
                        },
                    ));
                    Ok(())
                } else {
                    Err(IrError::OpaqueGate(custom.name.clone()))
                }
            }
        },
    }
}

fn lower_standard(
    gate: &StandardGate,
    qubits: &[QubitId],
    controls: usize,
    out: &mut Vec<ControlledOp>,
) -> IrResult<()> {
    if qubits.len() != gate.num_qubits() as usize {
        return Err(IrError::QubitCountMismatch {
            gate_name: gate.name().to_string(),
            expected: gate.num_qubits(),
            got: u32::try_from(qubits.len()).unwrap_or(u32::MAX),
        });
    }

    if let Some(matrix) = Unitary2x2::from_gate(gate) {
        bit(qubits[0])?;
        out.push(ControlledOp::new(
            controls,
            PrimitiveOp::Single {
                target: qubits[0].index(),
                matrix,
            },
        ));
        return Ok(());
    }

    for &q in qubits {
        bit(q)?;
    }

    let single = |ctrl: &[QubitId], target: QubitId, matrix: Unitary2x2| -> IrResult<ControlledOp> {
        let mut mask = controls;
        for &c in ctrl {
            mask |= bit(c)?;
        }
        Ok(ControlledOp::new(
            mask,
            PrimitiveOp::Single {
                target: target.index(),
                matrix,
            },
        ))
    };

    let op = match *gate {
        StandardGate::CX => single(&qubits[..1], qubits[1], Unitary2x2::x())?,
        StandardGate::CZ => single(&qubits[..1], qubits[1], Unitary2x2::z())?,
        StandardGate::CP(theta) => single(&qubits[..1], qubits[1], Unitary2x2::phase(theta))?,
        StandardGate::CCX => single(&qubits[..2], qubits[2], Unitary2x2::x())?,
        StandardGate::Swap => ControlledOp::new(
            controls,
            PrimitiveOp::Swap {
                a: qubits[0].index(),
                b: qubits[1].index(),
            },
        ),
        StandardGate::CSwap => ControlledOp::new(
            controls | bit(qubits[0])?,
            PrimitiveOp::Swap {
                a: qubits[1].index(),
                b: qubits[2].index(),
            },
        ),
        // Single-qubit gates returned through `Unitary2x2::from_gate` above.
        _ => {
            return Err(IrError::InvalidDag(format!(
                "gate '{}' has no primitive lowering",
                gate.name()
            )));
        }
    };
    out.push(op);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::CustomGate;

    #[test]
    fn test_standard_gates_fold_controls() {
        let mut circuit = Circuit::with_size("c", 3, 0);
        circuit
            .cx(QubitId(0), QubitId(2))
            .unwrap()
            .cswap(QubitId(1), QubitId(0), QubitId(2))
            .unwrap()
            .barrier([QubitId(0), QubitId(1)])
            .unwrap();

        let ops = flatten(&circuit).unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].controls, 0b001);
        assert!(matches!(ops[0].op, PrimitiveOp::Single { target: 2, .. }));
        assert_eq!(ops[1].controls, 0b010);
        assert_eq!(ops[1].op, PrimitiveOp::Swap { a: 0, b: 2 });
    }

    #[test]
    fn test_controlled_custom_gate_expands_body() {
        let mut block = Circuit::with_size("swapper", 2, 0);
        block.swap(QubitId(0), QubitId(1)).unwrap().x(QubitId(1)).unwrap();
        let gate = block.to_gate().unwrap().control(1);

        let mut circuit = Circuit::with_size("main", 4, 0);
        circuit
            .gate(gate, [QubitId(3), QubitId(1), QubitId(2)])
            .unwrap();

        let ops = flatten(&circuit).unwrap();
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| op.controls == 0b1000));
        assert_eq!(ops[0].op, PrimitiveOp::Swap { a: 1, b: 2 });
        assert!(matches!(ops[1].op, PrimitiveOp::Single { target: 2, .. }));
    }

    #[test]
    fn test_nested_controls_accumulate() {
        let mut inner = Circuit::with_size("inner", 1, 0);
        inner.x(QubitId(0)).unwrap();
        let inner_gate = inner.to_gate().unwrap().control(1);

        let mut outer = Circuit::with_size("outer", 2, 0);
        outer.gate(inner_gate, [QubitId(0), QubitId(1)]).unwrap();
        let outer_gate = outer.to_gate().unwrap().control(1);

        let mut circuit = Circuit::with_size("main", 3, 0);
        circuit
            .gate(outer_gate, [QubitId(2), QubitId(0), QubitId(1)])
            .unwrap();

        let ops = flatten(&circuit).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].controls, 0b101);
        assert!(matches!(ops[0].op, PrimitiveOp::Single { target: 1, .. }));
    }

    #[test]
    fn test_matrix_gate_becomes_dense() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let gate = CustomGate::new("flip", 1)
            .with_matrix(vec![zero, one, one, zero])
            .unwrap();

        let mut circuit = Circuit::with_size("main", 2, 0);
        circuit.gate(gate, [QubitId(1)]).unwrap();

        let ops = flatten(&circuit).unwrap();
        assert!(matches!(&ops[0].op, PrimitiveOp::Dense { targets, .. } if targets == &vec![1]));
    }

    #[test]
    fn test_opaque_gate_rejected() {
        let mut circuit = Circuit::with_size("main", 1, 0);
        circuit.gate(CustomGate::new("mystery", 1), [QubitId(0)]).unwrap();
        assert!(matches!(flatten(&circuit), Err(IrError::OpaqueGate(_))));
    }

    #[test]
    fn test_measure_inside_body_rejected() {
        let gate = CustomGate::new("sneaky", 1).with_definition(vec![Instruction::reset(QubitId(0))]);
        let mut circuit = Circuit::with_size("main", 1, 0);
        circuit.gate(gate, [QubitId(0)]).unwrap();
        assert!(matches!(flatten(&circuit), Err(IrError::NonUnitary(_))));
    }

    #[test]
    fn test_measurements_keep_clbit_mapping() {
        let circuit = Circuit::bell().unwrap();
        let ops = flatten(&circuit).unwrap();
        assert_eq!(
            ops.last().map(|op| &op.op),
            Some(&PrimitiveOp::Measure { qubit: 1, clbit: 1 })
        );
    }
}
