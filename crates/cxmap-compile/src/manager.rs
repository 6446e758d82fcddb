//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use cxmap_ir::Circuit;

use crate::assignment::{Assignment, SearchStrategy};
use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{ApplyAssignment, AssignmentSearch, CnotExpansion};
use crate::property::PropertySet;
use crate::target::Target;

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given circuit.
    #[instrument(skip(self, circuit, properties), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            circuit.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                debug!("Pass {} completed, gates: {}", pass.name(), circuit.num_gates());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, gates: {}, cnots: {}",
            circuit.depth(),
            circuit.num_gates(),
            circuit.cnot_count()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the mapping pipeline.
///
/// With a target, the pipeline is assignment search, relabeling onto the
/// physical register and CNOT expansion. A fixed assignment skips the search.
pub struct PassManagerBuilder {
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            properties: PropertySet::new(),
        }
    }

    /// Replace the property set.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target to map onto.
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.properties.target = Some(target);
        self
    }

    /// Set the assignment search strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.properties.strategy = strategy;
        self
    }

    /// Use a fixed assignment instead of searching one.
    #[must_use]
    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.properties.assignment = Some(assignment);
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        if self.properties.target.is_some() {
            pm.add_pass(AssignmentSearch);
            pm.add_pass(ApplyAssignment);
            pm.add_pass(CnotExpansion);
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ConnectivityGraph;
    use crate::passes::AssignmentReport;
    use cxmap_ir::QubitId;

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);
    }

    #[test]
    fn test_pass_manager_run() {
        let pm = PassManager::new();
        let mut props = PropertySet::new();

        let mut circuit = Circuit::with_size("test", 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        pm.run(&mut circuit, &mut props).unwrap();

        assert_eq!(circuit.num_gates(), 2);
    }

    #[test]
    fn test_builder_without_target() {
        let (pm, props) = PassManagerBuilder::new().build();
        assert!(pm.is_empty());
        assert!(props.target.is_none());
    }

    #[test]
    fn test_pass_manager_builder() {
        let target = Target::new(ConnectivityGraph::ibm_qx4()).unwrap();
        let (pm, mut props) = PassManagerBuilder::new()
            .with_target(target)
            .with_strategy(SearchStrategy::Exhaustive)
            .build();
        assert_eq!(pm.len(), 3);

        let mut circuit = Circuit::with_size("test", 3);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .cx(QubitId(1), QubitId(2))
            .unwrap();

        pm.run(&mut circuit, &mut props).unwrap();

        assert_eq!(circuit.num_qubits(), 5);
        let target = props.target.as_ref().unwrap();
        for gate in circuit.iter().filter(|g| g.is_cnot()) {
            assert!(
                target
                    .graph()
                    .has_edge(gate.controls[0].line.0, gate.targets[0].0)
            );
        }
        let report = props.get::<AssignmentReport>().unwrap();
        assert_eq!(report.strategy, SearchStrategy::Exhaustive);
        assert_eq!(
            circuit.num_gates() as u64,
            3 + report.cost,
            "expansion adds exactly the table cost"
        );
    }

    #[test]
    fn test_fixed_assignment_skips_search() {
        let target = Target::new(ConnectivityGraph::linear(3)).unwrap();
        let (pm, mut props) = PassManagerBuilder::new()
            .with_target(target)
            .with_assignment(Assignment::new(vec![1, 0], 3).unwrap())
            .build();

        let mut circuit = Circuit::with_size("test", 2);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        pm.run(&mut circuit, &mut props).unwrap();

        assert!(props.get::<AssignmentReport>().is_none());
        // cx(1, 0) on a line whose only edge into 0 runs 0 -> 1: one flip.
        assert_eq!(circuit.num_gates(), 5);
    }
}
