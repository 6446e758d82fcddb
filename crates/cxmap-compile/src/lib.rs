//! CNOT mapping for devices with directed qubit connectivity.
//!
//! A device allows CNOT only along the directed edges of its
//! [`ConnectivityGraph`]. For every ordered pair of physical qubits this
//! crate synthesizes a [`TransformationPath`]: a short sequence of
//! Hadamard/CNOT templates that moves the control and target onto a native
//! edge, applies the CNOT there and undoes the moves. The paths and their
//! costs form a [`CostPathTable`]; graph and table together are a
//! [`Target`].
//!
//! Mapping a circuit is three steps:
//! 1. **Assignment**: choose the logical-to-physical qubit mapping that
//!    minimizes the summed table cost of the circuit's CNOTs
//! 2. **Relabeling**: rewrite the circuit onto the physical register
//! 3. **Expansion**: replace each CNOT by the lowering of its table path
//!
//! # Architecture
//!
//! ```text
//! ConnectivityGraph ──► synthesize (per pair) ──► CostPathTable
//!         │                                            │
//!         └──────────────────► Target ◄────────────────┘
//!                                │
//! Input Circuit                  ▼
//!       │              PropertySet (target, strategy, assignment)
//!       ▼                        │
//! ┌─────────────┐                │
//! │ PassManager │ ◄──────────────┘
//! └─────────────┘
//!       ├── AssignmentSearch
//!       ├── ApplyAssignment
//!       └── CnotExpansion
//!       │
//!       ▼
//! Output Circuit (every CNOT on a native edge)
//! ```
//!
//! # Example
//!
//! ```rust
//! use cxmap_compile::{ConnectivityGraph, PassManagerBuilder, SearchStrategy, Target};
//! use cxmap_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2);
//! circuit.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
//!
//! let target = Target::new(ConnectivityGraph::ibm_qx4()).unwrap();
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_target(target)
//!     .with_strategy(SearchStrategy::Exhaustive)
//!     .build();
//!
//! pm.run(&mut circuit, &mut props).unwrap();
//! assert_eq!(circuit.num_qubits(), 5);
//! assert_eq!(circuit.num_gates(), 2);
//! ```
//!
//! # Persistence
//!
//! A target can be written to and read back from a plain-text format with
//! [`Target::save`] and [`Target::load`], so the table need not be
//! resynthesized for every run.
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to add passes to a [`PassManager`]:
//!
//! ```rust
//! use cxmap_compile::{CompileResult, Pass, PassKind, PropertySet};
//! use cxmap_ir::Circuit;
//!
//! struct CountCnots;
//!
//! impl Pass for CountCnots {
//!     fn name(&self) -> &str { "count_cnots" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, circuit: &mut Circuit, props: &mut PropertySet) -> CompileResult<()> {
//!         props.insert(circuit.cnot_count());
//!         Ok(())
//!     }
//! }
//! ```

pub mod assignment;
pub mod error;
pub mod expansion;
pub mod graph;
pub mod manager;
pub mod mapping;
pub mod pass;
pub mod path;
pub mod persistence;
pub mod property;
pub mod synthesis;
pub mod table;
pub mod target;

// Built-in passes
pub mod passes;

pub use assignment::{
    Assignment, AssignmentResult, DEFAULT_MAX_CANDIDATES, OccurrenceMatrix, SearchStrategy,
    search_assignment,
};
pub use error::{CompileError, CompileResult};
pub use expansion::{expand, lower_path};
pub use graph::ConnectivityGraph;
pub use manager::{PassManager, PassManagerBuilder};
pub use mapping::{MappedCircuit, map_circuit};
pub use pass::{Pass, PassKind};
pub use path::{StepKind, TransformationPath, TransformationStep};
pub use property::PropertySet;
pub use synthesis::{Exploration, synthesize};
pub use table::CostPathTable;
pub use target::Target;
