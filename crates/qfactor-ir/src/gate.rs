//! Quantum gate types.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::Instruction;

/// Standard gates with known semantics.
///
/// Angles are concrete radians; the factoring circuits never carry symbolic
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate.
    P(f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// Controlled phase gate.
    CP(f64),
    /// SWAP gate.
    Swap,

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::CP(_) => "cp",
            StandardGate::Swap => "swap",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_) => 1,

            StandardGate::CX | StandardGate::CZ | StandardGate::CP(_) | StandardGate::Swap => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// Get the rotation angle, if this gate has one.
    pub fn angle(&self) -> Option<f64> {
        match self {
            StandardGate::Rx(t)
            | StandardGate::Ry(t)
            | StandardGate::Rz(t)
            | StandardGate::P(t)
            | StandardGate::CP(t) => Some(*t),
            _ => None,
        }
    }

    /// The adjoint of this gate.
    pub fn inverse(&self) -> StandardGate {
        match *self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::Rx(t) => StandardGate::Rx(-t),
            StandardGate::Ry(t) => StandardGate::Ry(-t),
            StandardGate::Rz(t) => StandardGate::Rz(-t),
            StandardGate::P(t) => StandardGate::P(-t),
            StandardGate::CP(t) => StandardGate::CP(-t),
            // Self-inverse
            other => other,
        }
    }
}

/// A quantum gate, either standard or custom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A custom named gate.
    Custom(CustomGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Custom(g) => &g.name,
        }
    }

    /// Get the number of qubits, including control qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Custom(g) => g.num_qubits,
        }
    }

    /// The adjoint of this gate.
    pub fn inverse(&self) -> IrResult<GateKind> {
        Ok(match self {
            GateKind::Standard(g) => GateKind::Standard(g.inverse()),
            GateKind::Custom(g) => GateKind::Custom(g.inverse()?),
        })
    }
}

/// A named gate defined by a sub-circuit or a unitary matrix.
///
/// Operand layout: the first `num_ctrl_qubits` operands are controls, the
/// remaining ones are the targets the definition (or matrix) acts on. The
/// definition addresses its targets as `QubitId(0)..QubitId(k-1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
    /// The number of qubits it operates on, controls included.
    pub num_qubits: u32,
    /// Number of leading operands that act as controls.
    #[serde(default)]
    pub num_ctrl_qubits: u32,
    /// Body of the gate over its target qubits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<Vec<Instruction>>,
    /// Optional unitary matrix over the target qubits (row-major, 2^k × 2^k).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Complex64>>,
}

impl CustomGate {
    /// Create a new opaque custom gate.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_ctrl_qubits: 0,
            definition: None,
            matrix: None,
        }
    }

    /// Attach a body to the gate.
    #[must_use]
    pub fn with_definition(mut self, definition: Vec<Instruction>) -> Self {
        self.definition = Some(definition);
        self
    }

    /// Attach a unitary matrix over the target qubits.
    pub fn with_matrix(mut self, matrix: Vec<Complex64>) -> IrResult<Self> {
        let dim = 1usize << self.num_target_qubits();
        if matrix.len() != dim * dim {
            return Err(IrError::InvalidMatrix {
                gate_name: self.name,
                expected: dim * dim,
                got: matrix.len(),
            });
        }
        self.matrix = Some(matrix);
        Ok(self)
    }

    /// Add `num_ctrl` control qubits in front of the existing operands.
    #[must_use]
    pub fn control(mut self, num_ctrl: u32) -> Self {
        self.num_qubits += num_ctrl;
        self.num_ctrl_qubits += num_ctrl;
        self
    }

    /// Number of target qubits (the qubits the body acts on).
    #[inline]
    pub fn num_target_qubits(&self) -> u32 {
        self.num_qubits - self.num_ctrl_qubits
    }

    /// Check whether this gate is controlled.
    #[inline]
    pub fn is_controlled(&self) -> bool {
        self.num_ctrl_qubits > 0
    }

    /// The adjoint gate: the body reversed with every instruction inverted,
    /// or the conjugate transpose of the matrix.
    pub fn inverse(&self) -> IrResult<CustomGate> {
        let definition = match &self.definition {
            Some(body) => Some(
                body.iter()
                    .rev()
                    .map(Instruction::inverse)
                    .collect::<IrResult<Vec<_>>>()?,
            ),
            None => None,
        };

        let matrix = self.matrix.as_ref().map(|m| {
            let dim = 1usize << self.num_target_qubits();
            let mut adjoint = vec![Complex64::new(0.0, 0.0); m.len()];
            for row in 0..dim {
                for col in 0..dim {
                    adjoint[col * dim + row] = m[row * dim + col].conj();
                }
            }
            adjoint
        });

        Ok(CustomGate {
            name: format!("{}_dg", self.name),
            num_qubits: self.num_qubits,
            num_ctrl_qubits: self.num_ctrl_qubits,
            definition,
            matrix,
        })
    }
}

/// A gate with associated metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: GateKind::Standard(gate),
        }
    }

    /// Create a new gate from a custom gate.
    pub fn custom(gate: CustomGate) -> Self {
        Self {
            kind: GateKind::Custom(gate),
        }
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }

    /// The adjoint of this gate.
    pub fn inverse(&self) -> IrResult<Gate> {
        Ok(Gate {
            kind: self.kind.inverse()?,
        })
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::custom(gate)
    }
}
