//! One-call mapping of a circuit onto a target.

use tracing::instrument;

use cxmap_ir::Circuit;

use crate::assignment::{Assignment, OccurrenceMatrix, SearchStrategy, search_assignment};
use crate::error::{CompileError, CompileResult};
use crate::expansion::expand;
use crate::target::Target;

/// A circuit mapped onto a target.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedCircuit {
    /// The relabeled and expanded circuit, one line per physical qubit.
    pub circuit: Circuit,
    /// Logical to physical assignment used.
    pub assignment: Assignment,
    /// Total table cost of the assignment.
    pub cost: u64,
}

/// Search an assignment, relabel the circuit and expand its CNOTs.
///
/// Equivalent to running the pass pipeline built by
/// [`PassManagerBuilder`](crate::PassManagerBuilder) with `target` and
/// `strategy`.
#[instrument(skip_all, fields(circuit = circuit.name(), strategy = ?strategy))]
pub fn map_circuit(
    circuit: &Circuit,
    target: &Target,
    strategy: SearchStrategy,
) -> CompileResult<MappedCircuit> {
    let occurrences = OccurrenceMatrix::from_circuit(circuit);
    let result = search_assignment(&occurrences, target, strategy)?;
    let assignment = result
        .best()
        .cloned()
        .ok_or(CompileError::MissingAssignment)?;

    let physical = assignment.apply(circuit, target.num_qubits())?;
    let expanded = expand(&physical, target)?;

    Ok(MappedCircuit {
        circuit: expanded,
        assignment,
        cost: result.cost,
    })
}
