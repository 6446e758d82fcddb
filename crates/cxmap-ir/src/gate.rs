//! Gate records: kind, target lines and control entries.

use serde::{Deserialize, Serialize};

use crate::qubit::QubitId;

/// Axis of a Pauli or rotation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

/// Pauli gate tag.
///
/// `root` selects a root of the Pauli operator: Z with root 2 is S, Z with
/// root 4 is T. `adjoint` selects the inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PauliTag {
    /// Axis of the Pauli operator.
    pub axis: Axis,
    /// Root of the operator (1 = the Pauli itself).
    pub root: u32,
    /// Whether the adjoint is applied.
    pub adjoint: bool,
}

impl PauliTag {
    /// Create a new Pauli tag.
    pub fn new(axis: Axis, root: u32, adjoint: bool) -> Self {
        Self {
            axis,
            root,
            adjoint,
        }
    }

    /// Get the name of the gate this tag denotes.
    pub fn name(&self) -> &'static str {
        match (self.axis, self.root, self.adjoint) {
            (Axis::X, _, _) => "x",
            (Axis::Y, _, _) => "y",
            (Axis::Z, 2, false) => "s",
            (Axis::Z, 2, true) => "sdg",
            (Axis::Z, 4, false) => "t",
            (Axis::Z, 4, true) => "tdg",
            (Axis::Z, _, _) => "z",
        }
    }
}

/// A user-defined gate the compiler has no lowering for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
}

impl CustomGate {
    /// Create a new custom gate.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The kind of a gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// Multiple-controlled NOT. No controls is NOT, one control is CNOT.
    Toffoli,
    /// Hadamard gate.
    Hadamard,
    /// Pauli gate or one of its roots (S, T, ...).
    Pauli(PauliTag),
    /// Rotation around an axis by an angle in radians.
    Rotation {
        /// Rotation axis.
        axis: Axis,
        /// Rotation angle in radians.
        angle: f64,
    },
    /// A custom gate.
    Custom(CustomGate),
}

impl GateKind {
    /// Base name of this kind, ignoring controls.
    pub fn name(&self) -> &str {
        match self {
            GateKind::Toffoli => "x",
            GateKind::Hadamard => "h",
            GateKind::Pauli(tag) => tag.name(),
            GateKind::Rotation { axis: Axis::X, .. } => "rx",
            GateKind::Rotation { axis: Axis::Y, .. } => "ry",
            GateKind::Rotation { axis: Axis::Z, .. } => "rz",
            GateKind::Custom(g) => &g.name,
        }
    }
}

/// A control entry: a line plus the polarity it fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Control {
    /// The control line.
    pub line: QubitId,
    /// `true` fires on |1⟩, `false` on |0⟩.
    pub polarity: bool,
}

impl Control {
    /// A control firing on |1⟩.
    pub fn positive(line: QubitId) -> Self {
        Self {
            line,
            polarity: true,
        }
    }

    /// A control firing on |0⟩.
    pub fn negative(line: QubitId) -> Self {
        Self {
            line,
            polarity: false,
        }
    }
}

/// A gate record with its operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Target lines (non-empty in a valid circuit).
    pub targets: Vec<QubitId>,
    /// Control entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<Control>,
}

impl Gate {
    /// Create a gate without controls.
    pub fn new(kind: GateKind, targets: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind,
            targets: targets.into_iter().collect(),
            controls: vec![],
        }
    }

    /// Add controls to the gate.
    #[must_use]
    pub fn with_controls(mut self, controls: impl IntoIterator<Item = Control>) -> Self {
        self.controls = controls.into_iter().collect();
        self
    }

    /// NOT gate.
    pub fn not(target: QubitId) -> Self {
        Self::new(GateKind::Toffoli, [target])
    }

    /// CNOT gate with a positive control.
    pub fn cnot(control: QubitId, target: QubitId) -> Self {
        Self::not(target).with_controls([Control::positive(control)])
    }

    /// Multiple-controlled NOT gate.
    pub fn toffoli(controls: impl IntoIterator<Item = Control>, target: QubitId) -> Self {
        Self::not(target).with_controls(controls)
    }

    /// Hadamard gate.
    pub fn hadamard(target: QubitId) -> Self {
        Self::new(GateKind::Hadamard, [target])
    }

    /// Pauli gate.
    pub fn pauli(tag: PauliTag, target: QubitId) -> Self {
        Self::new(GateKind::Pauli(tag), [target])
    }

    /// Rotation gate.
    pub fn rotation(axis: Axis, angle: f64, target: QubitId) -> Self {
        Self::new(GateKind::Rotation { axis, angle }, [target])
    }

    /// Get the name of this gate, prefixed with one `c` per control.
    pub fn name(&self) -> String {
        let mut name = "c".repeat(self.controls.len());
        name.push_str(self.kind.name());
        name
    }

    /// The first target line.
    pub fn target(&self) -> Option<QubitId> {
        self.targets.first().copied()
    }

    /// Check if this is a NOT gate (Toffoli without controls).
    pub fn is_not(&self) -> bool {
        matches!(self.kind, GateKind::Toffoli) && self.controls.is_empty()
    }

    /// Check if this is a CNOT gate (Toffoli with exactly one control).
    pub fn is_cnot(&self) -> bool {
        matches!(self.kind, GateKind::Toffoli) && self.controls.len() == 1
    }

    /// Number of lines this gate touches.
    pub fn num_qubits(&self) -> usize {
        self.controls.len() + self.targets.len()
    }

    /// All lines this gate touches, controls first.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.controls
            .iter()
            .map(|c| c.line)
            .chain(self.targets.iter().copied())
    }

    /// Return a copy of this gate with every line relabelled by `map`.
    #[must_use]
    pub fn remap(&self, map: impl Fn(QubitId) -> QubitId) -> Self {
        Self {
            kind: self.kind.clone(),
            targets: self.targets.iter().map(|&t| map(t)).collect(),
            controls: self
                .controls
                .iter()
                .map(|c| Control {
                    line: map(c.line),
                    polarity: c.polarity,
                })
                .collect(),
        }
    }
}
