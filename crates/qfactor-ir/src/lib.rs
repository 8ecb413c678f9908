//! qfactor Circuit Intermediate Representation
//!
//! This crate provides the data structures used to describe the quantum
//! circuits of the factoring pipeline. Circuits are built through the
//! high-level [`Circuit`] API and stored internally as a wire DAG
//! ([`CircuitDag`]).
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`]
//! - **Gates**: [`StandardGate`] for built-in gates and [`CustomGate`] for
//!   named sub-circuits, optionally with control qubits
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **DAG**: [`CircuitDag`] for the wire-dependency graph
//! - **Circuit**: [`Circuit`] builder with `append`, `to_gate` and `inverse`
//! - **Lowering**: [`flatten`] turns a circuit into [`ControlledOp`]s that
//!   simulators execute directly
//!
//! # Example: A Named, Controlled Sub-Circuit
//!
//! ```rust
//! use qfactor_ir::{Circuit, QubitId};
//!
//! // A 2-qubit block that swaps its operands.
//! let mut block = Circuit::with_size("swapper", 2, 0);
//! block.swap(QubitId(0), QubitId(1)).unwrap();
//!
//! // Turn it into a gate with one control qubit and apply it.
//! let controlled = block.to_gate().unwrap().control(1);
//! let mut circuit = Circuit::with_size("main", 3, 0);
//! circuit
//!     .gate(controlled, [QubitId(0), QubitId(1), QubitId(2)])
//!     .unwrap();
//!
//! assert_eq!(circuit.dag().num_ops(), 1);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase fractions of Z |
//! | `Rx`, `Ry`, `Rz` | 1 | Rotation gates |
//! | `P` | 1 | Phase gate |
//! | `CX`, `CZ` | 2 | Controlled-X and Controlled-Z |
//! | `CP` | 2 | Controlled phase |
//! | `Swap` | 2 | SWAP gate |
//! | `CCX` | 3 | Toffoli gate |
//! | `CSwap` | 3 | Fredkin gate |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod flatten;
pub mod gate;
pub mod instruction;
pub mod qubit;
pub mod unitary;

pub use circuit::Circuit;
pub use dag::{CircuitDag, DagEdge, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use flatten::{ControlledOp, PrimitiveOp, flatten};
pub use gate::{CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
pub use unitary::Unitary2x2;
