//! CNOT expansion pass.

use cxmap_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::expansion::expand;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Replace every CNOT by its lowering onto native edges of the target.
pub struct CnotExpansion;

impl Pass for CnotExpansion {
    fn name(&self) -> &'static str {
        "CnotExpansion"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let target = properties
            .target
            .as_ref()
            .ok_or(CompileError::MissingTarget)?;
        *circuit = expand(circuit, target)?;
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.target.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ConnectivityGraph;
    use crate::target::Target;
    use cxmap_ir::QubitId;

    #[test]
    fn test_cnot_expansion_pass() {
        let graph = ConnectivityGraph::from_edges(5, [(0, 1), (0, 2), (3, 2), (3, 4)]).unwrap();
        let mut props = PropertySet::new().with_target(Target::new(graph).unwrap());
        let mut circuit = Circuit::with_size("test", 5);
        circuit.cx(QubitId(2), QubitId(4)).unwrap();

        CnotExpansion.run(&mut circuit, &mut props).unwrap();

        assert_eq!(circuit.num_gates(), 11);
        assert_eq!(circuit.count_ops().get("h"), Some(&6));
        let target = props.target.as_ref().unwrap();
        for gate in circuit.iter().filter(|g| g.is_cnot()) {
            let (c, t) = (gate.controls[0].line.0, gate.targets[0].0);
            assert!(target.graph().has_edge(c, t));
        }
    }

    #[test]
    fn test_cnot_expansion_requires_target() {
        let mut circuit = Circuit::with_size("test", 2);
        let mut props = PropertySet::new();
        assert!(!CnotExpansion.should_run(&circuit, &props));
        assert!(matches!(
            CnotExpansion.run(&mut circuit, &mut props),
            Err(CompileError::MissingTarget)
        ));
    }
}
