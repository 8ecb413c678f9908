//! High-level circuit builder API.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{CustomGate, Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// A quantum circuit.
///
/// This provides a high-level API for building quantum circuits,
/// with convenient methods for common gates and operations.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit.
    qubits: Vec<QubitId>,
    /// Classical bits in the circuit.
    clbits: Vec<ClbitId>,
    /// The underlying DAG representation.
    dag: CircuitDag,
    /// Counter for generating qubit IDs.
    next_qubit_id: u32,
    /// Counter for generating classical bit IDs.
    next_clbit_id: u32,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            dag: CircuitDag::new(),
            next_qubit_id: 0,
            next_clbit_id: 0,
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        self.qubits.push(id);
        self.dag.add_qubit(id);
        id
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.next_clbit_id);
        self.next_clbit_id += 1;
        self.clbits.push(id);
        self.dag.add_clbit(id);
        id
    }

    fn standard(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::H, [qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::X, [qubit])
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::T, [qubit])
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::Rz(theta), [qubit])
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::CX, [control, target])
    }

    /// Apply controlled phase gate.
    pub fn cp(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::CP(theta), [control, target])
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::Swap, [q1, q2])
    }

    // =========================================================================
    // Three-qubit gates
    // =========================================================================

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::CCX, [c1, c2, target])
    }

    /// Apply Fredkin (CSWAP) gate.
    pub fn cswap(&mut self, control: QubitId, t1: QubitId, t2: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::CSwap, [control, t1, t2])
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply a gate (standard or custom) to the given operands.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    /// Append `other` as a single named gate acting on `qubits`.
    ///
    /// `other`'s qubit `k` is mapped to the `k`-th entry of `qubits`.
    pub fn append(
        &mut self,
        other: &Circuit,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        let gate = other.to_gate()?;
        self.gate(gate, qubits)
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Measure all qubits to corresponding classical bits.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.clbits.len() < self.qubits.len() {
            self.add_clbit();
        }

        let qubits = self.qubits.clone();
        let clbits: Vec<_> = self.clbits.iter().copied().take(qubits.len()).collect();

        self.dag.apply(Instruction::measure_all(qubits, clbits)?)?;
        Ok(self)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::reset(qubit))?;
        Ok(self)
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    // =========================================================================
    // Transformations
    // =========================================================================

    /// Package this circuit as a named gate over its qubits.
    ///
    /// The gate carries the circuit's instructions as its definition. Fails
    /// with [`IrError::NonUnitary`] if the circuit contains a measurement or
    /// reset.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_gate(&self) -> IrResult<CustomGate> {
        let mut body = Vec::with_capacity(self.dag.num_ops());
        for (_, inst) in self.dag.topological_ops() {
            match inst.kind {
                InstructionKind::Measure | InstructionKind::Reset => {
                    return Err(IrError::NonUnitary(inst.name().to_string()));
                }
                _ => body.push(inst.clone()),
            }
        }
        Ok(CustomGate::new(self.name.clone(), self.qubits.len() as u32).with_definition(body))
    }

    /// The adjoint circuit: instructions in reverse order, each inverted.
    pub fn inverse(&self) -> IrResult<Circuit> {
        let mut inverted = Circuit {
            name: format!("{}_dg", self.name),
            qubits: self.qubits.clone(),
            clbits: self.clbits.clone(),
            dag: CircuitDag::new(),
            next_qubit_id: self.next_qubit_id,
            next_clbit_id: self.next_clbit_id,
        };
        for qubit in &self.qubits {
            inverted.dag.add_qubit(*qubit);
        }
        for clbit in &self.clbits {
            inverted.dag.add_clbit(*clbit);
        }

        let ops: Vec<_> = self.dag.topological_ops().map(|(_, i)| i).collect();
        for inst in ops.into_iter().rev() {
            inverted.dag.apply(inst.inverse()?)?;
        }
        Ok(inverted)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Number of top-level instructions.
    pub fn size(&self) -> usize {
        self.dag.num_ops()
    }

    /// Top-level instructions in application order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.dag.topological_ops().map(|(_, inst)| inst)
    }

    /// Instruction counts keyed by name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for inst in self.instructions() {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Check whether any instruction is a measurement.
    pub fn has_measurements(&self) -> bool {
        self.instructions().any(Instruction::is_measure)
    }

    /// Get a reference to the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Get the classical bits in the circuit.
    pub fn clbits(&self) -> &[ClbitId] {
        &self.clbits
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))?
            .cx(QubitId(0), QubitId(1))?
            .measure(QubitId(0), ClbitId(0))?
            .measure(QubitId(1), ClbitId(1))?;
        Ok(circuit)
    }

    /// Create the forward quantum Fourier transform on `n` qubits.
    ///
    /// Qubit 0 is the least significant bit of the transformed register.
    /// The circuit maps |x⟩ to 2^(-n/2) Σ_k e^(2πi·xk/2^n) |k⟩ and is
    /// the exact inverse of the `QFT†` block used for phase estimation.
    pub fn qft(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size("QFT", n, 0);

        for j in (0..n).rev() {
            circuit.h(QubitId(j))?;
            for m in (0..j).rev() {
                let angle = PI / f64::from(1u32 << (j - m));
                circuit.cp(angle, QubitId(m), QubitId(j))?;
            }
        }

        for q in 0..n / 2 {
            circuit.swap(QubitId(q), QubitId(n - 1 - q))?;
        }

        Ok(circuit)
    }
}
