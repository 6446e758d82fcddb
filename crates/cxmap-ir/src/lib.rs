//! cxmap Circuit Intermediate Representation
//!
//! This crate provides the circuit data structures consumed and produced by
//! the cxmap compiler: reversible / Clifford+T circuits made of
//! multiple-controlled NOT gates, Hadamards, Pauli gates and rotations.
//!
//! # Core Components
//!
//! - **Lines**: [`QubitId`] addresses a line, [`Qubit`] carries its optional
//!   input and output names
//! - **Gates**: [`Gate`] records with a [`GateKind`], target lines and
//!   [`Control`] entries (line + polarity)
//! - **Circuit**: [`Circuit`] ordered gate list with a builder API
//!
//! # Example
//!
//! ```rust
//! use cxmap_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("example", 3);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.cx_negative(QubitId(2), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 3);
//! assert_eq!(circuit.cnot_count(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Lines | Description |
//! |------|-------|-------------|
//! | `x`, `cx`, `ccx`, ... | 1+ | Multiple-controlled NOT (`Toffoli`) |
//! | `h` | 1 | Hadamard gate |
//! | `y`, `z`, `s`, `sdg`, `t`, `tdg` | 1 | Pauli gates and their roots |
//! | `rx`, `ry`, `rz` | 1 | Rotation gates |
//! | custom | any | User-defined gate, opaque to the compiler |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{Axis, Control, CustomGate, Gate, GateKind, PauliTag};
pub use qubit::{Qubit, QubitId};
