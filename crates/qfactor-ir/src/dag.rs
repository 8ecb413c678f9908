//! DAG-based circuit representation.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// An edge in the circuit DAG: the wire shared by two consecutive operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

/// DAG-based circuit representation.
///
/// Every node is an operation. An edge `a -> b` on wire `w` means `b` is the
/// next operation touching `w` after `a`. Nodes are only ever appended, so
/// node-index order is a topological order of the graph.
///
/// The `wire_front` index maps each wire to the last operation on it, which
/// makes `apply()` O(operands).
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    /// The underlying graph.
    graph: DiGraph<Instruction, DagEdge, u32>,
    /// Qubits in declaration order.
    qubits: Vec<QubitId>,
    /// Classical bits in declaration order.
    clbits: Vec<ClbitId>,
    /// Membership sets for operand validation.
    known_qubits: FxHashSet<QubitId>,
    known_clbits: FxHashSet<ClbitId>,
    /// Wire front: maps each wire to its most recent operation.
    wire_front: FxHashMap<WireId, NodeIndex>,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a qubit to the circuit.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.known_qubits.insert(qubit) {
            self.qubits.push(qubit);
        }
    }

    /// Add a classical bit to the circuit.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.known_clbits.insert(clbit) {
            self.clbits.push(clbit);
        }
    }

    /// Apply an instruction to the circuit.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            _ => None,
        };

        // Validate gate arity matches qubit count
        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            let got = instruction.qubits.len();
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: got as u32,
                });
            }
        }

        for &qubit in &instruction.qubits {
            if !self.known_qubits.contains(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        for &clbit in &instruction.clbits {
            if !self.known_clbits.contains(&clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let wires: Vec<WireId> = instruction
            .qubits
            .iter()
            .copied()
            .map(WireId::from)
            .chain(instruction.clbits.iter().copied().map(WireId::from))
            .collect();

        let op_node = self.graph.add_node(instruction);
        for wire in wires {
            if let Some(prev) = self.wire_front.insert(wire, op_node) {
                self.graph.add_edge(prev, op_node, DagEdge { wire });
            }
        }

        Ok(op_node)
    }

    /// Iterate over operations in topological order.
    ///
    /// The order is deterministic: operations come out in the order they
    /// were applied.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.graph
            .node_indices()
            .map(move |idx| (idx, &self.graph[idx]))
    }

    /// Operations that directly precede `node` on any of its wires.
    pub fn predecessors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(node, Direction::Incoming)
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the number of operations.
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.graph.node_count()
    }

    /// Calculate the circuit depth (longest chain of dependent operations).
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.graph.node_count()];
        let mut max_depth = 0usize;

        // Node-index order is topological, so every predecessor is final.
        for node in self.graph.node_indices() {
            let node_depth = self
                .predecessors(node)
                .map(|p| depths[p.index()])
                .max()
                .unwrap_or(0)
                + 1;
            depths[node.index()] = node_depth;
            max_depth = max_depth.max(node_depth);
        }

        max_depth
    }

    /// Iterate over qubits in declaration order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.qubits.iter().copied()
    }

    /// Iterate over classical bits in declaration order.
    pub fn clbits(&self) -> impl Iterator<Item = ClbitId> + '_ {
        self.clbits.iter().copied()
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &DiGraph<Instruction, DagEdge, u32> {
        &self.graph
    }
}
