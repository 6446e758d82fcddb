//! High-level circuit builder API.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Axis, Control, CustomGate, Gate, GateKind, PauliTag};
use crate::qubit::{Qubit, QubitId};

/// A reversible / Clifford+T circuit.
///
/// An ordered list of gate records over a fixed set of lines. The compiler
/// only ever appends to a circuit, so gates are stored flat in program order.
///
/// Deserialization runs every gate through [`Circuit::append`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CircuitData")]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Lines in the circuit.
    qubits: Vec<Qubit>,
    /// Gates in program order.
    gates: Vec<Gate>,
}

/// Unchecked serialized form of a [`Circuit`].
#[derive(Deserialize)]
struct CircuitData {
    name: String,
    qubits: Vec<Qubit>,
    gates: Vec<Gate>,
}

impl TryFrom<CircuitData> for Circuit {
    type Error = IrError;

    fn try_from(data: CircuitData) -> IrResult<Self> {
        let mut circuit = Self::new(data.name);
        for qubit in &data.qubits {
            circuit.add_line_like(qubit);
        }
        for gate in data.gates {
            circuit.append(gate)?;
        }
        Ok(circuit)
    }
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            gates: vec![],
        }
    }

    /// Create a circuit with a given number of unnamed lines.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        circuit
    }

    /// Create an empty circuit with the same name and lines as `self`.
    pub fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            qubits: self.qubits.clone(),
            gates: vec![],
        }
    }

    /// Add a single unnamed line to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = self.next_id();
        self.qubits.push(Qubit::new(id));
        id
    }

    /// Add a line with input and output names.
    pub fn add_line(&mut self, input: impl Into<String>, output: impl Into<String>) -> QubitId {
        let id = self.next_id();
        self.qubits.push(Qubit::named(id, input, output));
        id
    }

    /// Add a line carrying the input and output names of `qubit`.
    pub fn add_line_like(&mut self, qubit: &Qubit) -> QubitId {
        let id = self.next_id();
        self.qubits.push(Qubit {
            id,
            ..qubit.clone()
        });
        id
    }

    fn next_id(&self) -> QubitId {
        QubitId::from(self.qubits.len())
    }

    /// Append a gate after validating its operands.
    pub fn append(&mut self, gate: Gate) -> IrResult<&mut Self> {
        self.validate(&gate)?;
        self.gates.push(gate);
        Ok(self)
    }

    fn validate(&self, gate: &Gate) -> IrResult<()> {
        if gate.targets.is_empty() {
            return Err(IrError::EmptyTargets {
                gate_name: gate.name(),
            });
        }

        let mut seen = vec![false; self.qubits.len()];
        for qubit in gate.qubits() {
            let Some(slot) = seen.get_mut(qubit.index()) else {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: Some(gate.name()),
                });
            };
            if *slot {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: Some(gate.name()),
                });
            }
            *slot = true;
        }
        Ok(())
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply NOT gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Gate::not(qubit))
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Gate::hadamard(qubit))
    }

    /// Apply a Pauli gate (or one of its roots).
    pub fn pauli(&mut self, tag: PauliTag, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Gate::pauli(tag, qubit))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.pauli(PauliTag::new(Axis::Y, 1, false), qubit)
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.pauli(PauliTag::new(Axis::Z, 1, false), qubit)
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.pauli(PauliTag::new(Axis::Z, 2, false), qubit)
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.pauli(PauliTag::new(Axis::Z, 2, true), qubit)
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.pauli(PauliTag::new(Axis::Z, 4, false), qubit)
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.pauli(PauliTag::new(Axis::Z, 4, true), qubit)
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Gate::rotation(Axis::X, theta, qubit))
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Gate::rotation(Axis::Y, theta, qubit))
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Gate::rotation(Axis::Z, theta, qubit))
    }

    // =========================================================================
    // Controlled gates
    // =========================================================================

    /// Apply CNOT gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Gate::cnot(control, target))
    }

    /// Apply CNOT gate that fires when the control is |0⟩.
    pub fn cx_negative(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Gate::toffoli([Control::negative(control)], target))
    }

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Gate::toffoli(
            [Control::positive(c1), Control::positive(c2)],
            target,
        ))
    }

    /// Apply a custom gate.
    pub fn gate(
        &mut self,
        gate: CustomGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.append(Gate::new(GateKind::Custom(gate), qubits))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of lines.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of gates.
    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Get the lines.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the gates in program order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Iterate over the gates in program order.
    pub fn iter(&self) -> std::slice::Iter<'_, Gate> {
        self.gates.iter()
    }

    /// Get the circuit depth (longest chain of gates sharing a line).
    pub fn depth(&self) -> usize {
        let mut level = vec![0usize; self.qubits.len()];
        let mut depth = 0;
        for gate in &self.gates {
            let next = gate
                .qubits()
                .filter_map(|q| level.get(q.index()))
                .max()
                .copied()
                .unwrap_or(0)
                + 1;
            for q in gate.qubits() {
                if let Some(l) = level.get_mut(q.index()) {
                    *l = next;
                }
            }
            depth = depth.max(next);
        }
        depth
    }

    /// Count gates by name.
    pub fn count_ops(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for gate in &self.gates {
            *counts.entry(gate.name()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of single-control NOT gates.
    pub fn cnot_count(&self) -> usize {
        self.gates.iter().filter(|g| g.is_cnot()).count()
    }
}

impl<'a> IntoIterator for &'a Circuit {
    type Item = &'a Gate;
    type IntoIter = std::slice::Iter<'a, Gate>;

    fn into_iter(self) -> Self::IntoIter {
        self.gates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_gates(), 0);
    }

    #[test]
    fn test_circuit_with_size() {
        let circuit = Circuit::with_size("test", 3);
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.qubits()[2].id, QubitId(2));
    }

    #[test]
    fn test_named_lines() {
        let mut circuit = Circuit::new("test");
        let a = circuit.add_line("a", "a'");
        let b = circuit.add_line("b", "b'");
        assert_eq!((a, b), (QubitId(0), QubitId(1)));
        assert_eq!(circuit.qubits()[1].input.as_deref(), Some("b"));
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::with_size("test", 3);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .t(QubitId(2))
            .unwrap()
            .ccx(QubitId(0), QubitId(2), QubitId(1))
            .unwrap();

        assert_eq!(circuit.num_gates(), 4);
        assert_eq!(circuit.cnot_count(), 1);
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_count_ops() {
        let mut circuit = Circuit::with_size("test", 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .h(QubitId(1))
            .unwrap()
            .cx_negative(QubitId(1), QubitId(0))
            .unwrap()
            .rz(PI / 2.0, QubitId(0))
            .unwrap();

        let ops = circuit.count_ops();
        assert_eq!(ops.get("h"), Some(&2));
        assert_eq!(ops.get("cx"), Some(&1));
        assert_eq!(ops.get("rz"), Some(&1));
    }

    #[test]
    fn test_append_rejects_unknown_line() {
        let mut circuit = Circuit::with_size("test", 2);
        let err = circuit.cx(QubitId(0), QubitId(5)).unwrap_err();
        assert!(matches!(err, IrError::QubitNotFound { qubit: QubitId(5), .. }));
        assert_eq!(circuit.num_gates(), 0);
    }

    #[test]
    fn test_append_rejects_duplicate_line() {
        let mut circuit = Circuit::with_size("test", 2);
        let err = circuit.cx(QubitId(1), QubitId(1)).unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { .. }));
    }

    #[test]
    fn test_append_rejects_empty_targets() {
        let mut circuit = Circuit::with_size("test", 1);
        let err = circuit
            .append(Gate::new(GateKind::Hadamard, []))
            .unwrap_err();
        assert!(matches!(err, IrError::EmptyTargets { .. }));
    }

    #[test]
    fn test_empty_like_keeps_lines() {
        let mut circuit = Circuit::new("adder");
        circuit.add_line("a", "s");
        circuit.add_line("b", "c");
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let empty = circuit.empty_like();
        assert_eq!(empty.name(), "adder");
        assert_eq!(empty.qubits(), circuit.qubits());
        assert_eq!(empty.num_gates(), 0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut circuit = Circuit::with_size("test", 2);
        circuit
            .cx_negative(QubitId(0), QubitId(1))
            .unwrap()
            .sdg(QubitId(1))
            .unwrap();

        let json = serde_json::to_string(&circuit).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, circuit);
    }

    #[test]
    fn test_deserialize_rejects_unknown_line() {
        let mut circuit = Circuit::with_size("test", 2);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let mut value = serde_json::to_value(&circuit).unwrap();
        value["qubits"].as_array_mut().unwrap().pop();
        let err = serde_json::from_value::<Circuit>(value).unwrap_err();
        assert!(err.to_string().contains("not found"), "{err}");
    }

    proptest! {
        #[test]
        fn prop_depth_bounded_by_gate_count(
            ops in proptest::collection::vec((0u32..4, 0u32..4), 0..32)
        ) {
            let mut circuit = Circuit::with_size("random", 4);
            for (a, b) in ops {
                if a == b {
                    circuit.h(QubitId(a)).unwrap();
                } else {
                    circuit.cx(QubitId(a), QubitId(b)).unwrap();
                }
            }
            prop_assert!(circuit.depth() <= circuit.num_gates());
            prop_assert_eq!(circuit.iter().count(), circuit.num_gates());
        }
    }
}
