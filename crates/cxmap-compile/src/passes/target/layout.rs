//! Layout passes for mapping logical qubits to physical qubits.

use cxmap_ir::Circuit;
use tracing::debug;

use crate::assignment::{OccurrenceMatrix, SearchStrategy, search_assignment};
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Summary of the last assignment search, stored as a custom property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentReport {
    /// Total table cost of the chosen assignment.
    pub cost: u64,
    /// Number of assignments that reached `cost`.
    pub num_optimal: usize,
    /// Strategy that actually ran.
    pub strategy: SearchStrategy,
}

/// Cost-driven layout pass.
///
/// Counts the circuit's CNOTs per (control, target) pair and searches the
/// assignment of logical to physical qubits with the lowest total table
/// cost, using the strategy from the property set.
pub struct AssignmentSearch;

impl Pass for AssignmentSearch {
    fn name(&self) -> &'static str {
        "AssignmentSearch"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let target = properties
            .target
            .as_ref()
            .ok_or(CompileError::MissingTarget)?;

        let occurrences = OccurrenceMatrix::from_circuit(circuit);
        let result = search_assignment(&occurrences, target, properties.strategy)?;
        let best = result
            .best()
            .cloned()
            .ok_or(CompileError::MissingAssignment)?;

        debug!("Chose assignment {:?} at cost {}", best.as_slice(), result.cost);
        properties.insert(AssignmentReport {
            cost: result.cost,
            num_optimal: result.mappings.len(),
            strategy: result.strategy,
        });
        properties.assignment = Some(best);
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.assignment.is_none() && properties.target.is_some()
    }
}

/// Marker stored once the circuit has been relabeled onto physical lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalLayout;

/// Relabel the circuit onto the physical register.
///
/// Logical line i becomes physical line `assignment[i]`; the register is
/// padded to the target's size.
pub struct ApplyAssignment;

impl Pass for ApplyAssignment {
    fn name(&self) -> &'static str {
        "ApplyAssignment"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let target = properties
            .target
            .as_ref()
            .ok_or(CompileError::MissingTarget)?;
        let assignment = properties
            .assignment
            .as_ref()
            .ok_or(CompileError::MissingAssignment)?;

        *circuit = assignment.apply(circuit, target.num_qubits())?;
        properties.insert(PhysicalLayout);
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.get::<PhysicalLayout>().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::Assignment;
    use crate::graph::ConnectivityGraph;
    use crate::target::Target;
    use cxmap_ir::QubitId;

    fn scenario_props() -> PropertySet {
        let graph = ConnectivityGraph::from_edges(5, [(0, 1), (0, 2), (3, 2), (3, 4)]).unwrap();
        PropertySet::new().with_target(Target::new(graph).unwrap())
    }

    #[test]
    fn test_assignment_search_places_native_pair() {
        let mut circuit = Circuit::with_size("test", 3);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let mut props = scenario_props();

        assert!(AssignmentSearch.should_run(&circuit, &props));
        AssignmentSearch.run(&mut circuit, &mut props).unwrap();

        let assignment = props.assignment.as_ref().unwrap();
        let target = props.target.as_ref().unwrap();
        let (c, t) = (assignment.as_slice()[0], assignment.as_slice()[1]);
        assert_eq!(target.cost(c, t), 0);

        let report = props.get::<AssignmentReport>().unwrap();
        assert_eq!(report.cost, 0);
        assert!(report.num_optimal >= 1);
        assert_eq!(report.strategy, SearchStrategy::Exhaustive);
        assert!(!AssignmentSearch.should_run(&circuit, &props));
    }

    #[test]
    fn test_assignment_search_requires_target() {
        let mut circuit = Circuit::with_size("test", 2);
        let mut props = PropertySet::new();
        assert!(!AssignmentSearch.should_run(&circuit, &props));
        assert!(matches!(
            AssignmentSearch.run(&mut circuit, &mut props),
            Err(CompileError::MissingTarget)
        ));
    }

    #[test]
    fn test_apply_assignment() {
        let mut circuit = Circuit::new("test");
        circuit.add_line("a", "a");
        circuit.add_line("b", "b");
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let mut props =
            scenario_props().with_assignment(Assignment::new(vec![3, 4], 5).unwrap());
        ApplyAssignment.run(&mut circuit, &mut props).unwrap();

        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.qubits()[3].input.as_deref(), Some("a"));
        assert_eq!(circuit.qubits()[4].input.as_deref(), Some("b"));
        assert_eq!(circuit.qubits()[0].input.as_deref(), Some("i0"));
        assert_eq!(
            circuit.gates()[0].qubits().collect::<Vec<_>>(),
            vec![QubitId(3), QubitId(4)]
        );
        assert!(!ApplyAssignment.should_run(&circuit, &props));
    }

    #[test]
    fn test_apply_assignment_requires_assignment() {
        let mut circuit = Circuit::with_size("test", 2);
        let mut props = scenario_props();
        assert!(matches!(
            ApplyAssignment.run(&mut circuit, &mut props),
            Err(CompileError::MissingAssignment)
        ));
        assert_eq!(circuit.num_qubits(), 2);
    }
}
