//! Transformation steps and paths.
//!
//! A [`TransformationPath`] describes how a logical CNOT(v, w) is realized on
//! a directed connectivity graph: a prefix of relabeling moves that walk the
//! control or the target along native edges, a terminal step that applies the
//! CNOT natively (possibly flipped or as a cascade), and the inverse of the
//! prefix that restores the original labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of a transformation step.
///
/// Each kind has a fixed intrinsic cost: the number of primitive gates it
/// adds over the logical CNOT it helps to realize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    /// Move the control forward along edge a → b.
    Cab,
    /// Move the control along the reversed edge b → a.
    Cba,
    /// Move the target forward along edge a → b.
    Tab,
    /// Move the target along the reversed edge b → a.
    Tba,
    /// Inverse of [`StepKind::Cab`].
    CabInv,
    /// Inverse of [`StepKind::Cba`].
    CbaInv,
    /// Inverse of [`StepKind::Tab`].
    TabInv,
    /// Inverse of [`StepKind::Tba`].
    TbaInv,
    /// Native CNOT a → b.
    Nop,
    /// CNOT a → b realized on the reversed edge b → a with Hadamards.
    Flip,
    /// CNOT a → c realized through the chain a → b → c.
    Cnot3,
}

impl StepKind {
    /// All step kinds, in persisted-token order.
    pub const ALL: [StepKind; 11] = [
        StepKind::Cab,
        StepKind::Cba,
        StepKind::Tab,
        StepKind::Tba,
        StepKind::CabInv,
        StepKind::CbaInv,
        StepKind::TabInv,
        StepKind::TbaInv,
        StepKind::Nop,
        StepKind::Flip,
        StepKind::Cnot3,
    ];

    /// Token used in the persisted text format.
    pub fn token(self) -> &'static str {
        match self {
            StepKind::Cab => "cab",
            StepKind::Cba => "cba",
            StepKind::Tab => "tab",
            StepKind::Tba => "tba",
            StepKind::CabInv => "cabi",
            StepKind::CbaInv => "cbai",
            StepKind::TabInv => "tabi",
            StepKind::TbaInv => "tbai",
            StepKind::Nop => "nop",
            StepKind::Flip => "flip",
            StepKind::Cnot3 => "cnot3",
        }
    }

    /// Intrinsic cost of the step.
    pub fn cost(self) -> u32 {
        match self {
            StepKind::Cab | StepKind::Tba | StepKind::CabInv | StepKind::TbaInv => 6,
            StepKind::Cba | StepKind::Tab | StepKind::CbaInv | StepKind::TabInv => 5,
            StepKind::Flip => 4,
            StepKind::Cnot3 => 3,
            StepKind::Nop => 0,
        }
    }

    /// The step undoing this one.
    pub fn inverse(self) -> Self {
        match self {
            StepKind::Cab => StepKind::CabInv,
            StepKind::Cba => StepKind::CbaInv,
            StepKind::Tab => StepKind::TabInv,
            StepKind::Tba => StepKind::TbaInv,
            StepKind::CabInv => StepKind::Cab,
            StepKind::CbaInv => StepKind::Cba,
            StepKind::TabInv => StepKind::Tab,
            StepKind::TbaInv => StepKind::Tba,
            other => other,
        }
    }

    /// Number of qubit operands.
    pub fn arity(self) -> usize {
        if self == StepKind::Cnot3 { 3 } else { 2 }
    }

    /// Whether the step applies the CNOT itself rather than relabeling.
    pub fn is_terminal(self) -> bool {
        matches!(self, StepKind::Nop | StepKind::Flip | StepKind::Cnot3)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for StepKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepKind::ALL
            .into_iter()
            .find(|k| k.token() == s)
            .ok_or_else(|| format!("unknown step token '{s}'"))
    }
}

/// One step of a transformation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransformationStep {
    /// The kind of step.
    pub kind: StepKind,
    /// First operand.
    pub a: u32,
    /// Second operand.
    pub b: u32,
    /// Third operand, present only for [`StepKind::Cnot3`].
    pub c: Option<u32>,
}

impl TransformationStep {
    /// Create a two-operand step.
    pub fn new(kind: StepKind, a: u32, b: u32) -> Self {
        debug_assert_eq!(kind.arity(), 2);
        Self { kind, a, b, c: None }
    }

    /// Create a cascade step through `b`.
    pub fn cascade(a: u32, b: u32, c: u32) -> Self {
        Self {
            kind: StepKind::Cnot3,
            a,
            b,
            c: Some(c),
        }
    }

    /// Intrinsic cost of the step.
    pub fn cost(&self) -> u32 {
        self.kind.cost()
    }

    /// The step undoing this one, with the same operands.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            kind: self.kind.inverse(),
            ..*self
        }
    }

    /// Directed (control, target) edges the lowered step drives CNOTs along.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> {
        let (a, b) = (self.a, self.b);
        let (first, second) = match self.kind {
            StepKind::Cab | StepKind::Tab | StepKind::CabInv | StepKind::TabInv | StepKind::Nop => {
                ((a, b), None)
            }
            StepKind::Cba | StepKind::Tba | StepKind::CbaInv | StepKind::TbaInv | StepKind::Flip => {
                ((b, a), None)
            }
            StepKind::Cnot3 => ((a, b), self.c.map(|c| (b, c))),
        };
        std::iter::once(first).chain(second)
    }

    /// Apply the relabeling of this step to a (control, target) position.
    pub fn relabel(&self, (control, target): (u32, u32)) -> (u32, u32) {
        let (a, b) = (self.a, self.b);
        let swap = |q: u32, from: u32, to: u32| if q == from { to } else { q };
        match self.kind {
            StepKind::Cab | StepKind::Cba => (swap(control, a, b), target),
            StepKind::CabInv | StepKind::CbaInv => (swap(control, b, a), target),
            StepKind::Tab | StepKind::Tba => (control, swap(target, a, b)),
            StepKind::TabInv | StepKind::TbaInv => (control, swap(target, b, a)),
            StepKind::Nop | StepKind::Flip | StepKind::Cnot3 => (control, target),
        }
    }
}

impl fmt::Display for TransformationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.a, self.b)?;
        if let Some(c) = self.c {
            write!(f, " {c}")?;
        }
        Ok(())
    }
}

/// An ordered sequence of steps realizing one logical CNOT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationPath {
    steps: Vec<TransformationStep>,
}

impl TransformationPath {
    /// Create a path from its steps.
    pub fn new(steps: Vec<TransformationStep>) -> Self {
        Self { steps }
    }

    /// Get the steps.
    pub fn steps(&self) -> &[TransformationStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the path has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of the intrinsic step costs.
    pub fn cost(&self) -> u32 {
        self.steps.iter().map(TransformationStep::cost).sum()
    }

    /// Cost of this prefix-plus-terminal path once its inverse is appended.
    pub fn realized_cost(&self) -> u32 {
        let last = self.steps.last().map_or(0, TransformationStep::cost);
        2 * self.cost() - last
    }

    /// Collapse a two-step forward chain into a single cascade step.
    ///
    /// `[cab(v,i), nop(i,w)]` and `[tba(w,i), nop(v,i)]` both realize
    /// CNOT(v, w) through v → i → w.
    #[must_use]
    pub fn with_cascade(self) -> Self {
        match self.steps.as_slice() {
            [first, last] if last.kind == StepKind::Nop => match first.kind {
                StepKind::Cab if first.b == last.a => Self::new(vec![
                    TransformationStep::cascade(first.a, first.b, last.b),
                ]),
                StepKind::Tba if first.b == last.b => Self::new(vec![
                    TransformationStep::cascade(last.a, first.b, first.a),
                ]),
                _ => self,
            },
            _ => self,
        }
    }

    /// Append the inverse of every step but the last, in reverse order.
    #[must_use]
    pub fn with_inverse(mut self) -> Self {
        let prefix = self.steps.len().saturating_sub(1);
        let inverse: Vec<_> = self.steps[..prefix]
            .iter()
            .rev()
            .map(TransformationStep::inverse)
            .collect();
        self.steps.extend(inverse);
        self
    }

    /// Whether the path realizes CNOT(v, w): exactly one terminal step, applied
    /// where the preceding steps moved (v, w), and the rest restores (v, w).
    pub fn realizes(&self, v: u32, w: u32) -> bool {
        let mut position = (v, w);
        let mut applied = false;
        for step in &self.steps {
            if step.kind.is_terminal() {
                if applied || (step.a, step.c.unwrap_or(step.b)) != position {
                    return false;
                }
                applied = true;
            } else {
                position = step.relabel(position);
            }
        }
        applied && position == (v, w)
    }

    /// Track a (control, target) position through every step.
    pub fn relabel(&self, position: (u32, u32)) -> (u32, u32) {
        self.steps.iter().fold(position, |p, step| step.relabel(p))
    }

    /// Number of primitive gates the steps lower to.
    pub fn num_gates(&self) -> usize {
        let mut cascades = 0u32;
        let mut emitted = 0usize;
        for step in &self.steps {
            emitted += match step.kind {
                StepKind::Nop => 1,
                StepKind::Flip => 5,
                StepKind::Cnot3 => {
                    cascades += 1;
                    if cascades == 1 {
                        4
                    } else {
                        replay_len(cascades - 1).min(emitted) + 2
                    }
                }
                kind => kind.cost() as usize,
            };
        }
        emitted
    }
}

/// Number of gates the n-th chained cascade (n >= 1) replays:
/// 2^n + 2^(n+1) - 2.
pub(crate) fn replay_len(n: u32) -> usize {
    (1usize << n) + (1usize << (n + 1)) - 2
}

/// One step per line, then `cost = <sum>`.
impl fmt::Display for TransformationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{step}")?;
        }
        writeln!(f, "cost = {}", self.cost())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_roundtrip() {
        for kind in StepKind::ALL {
            assert_eq!(kind.token().parse::<StepKind>().unwrap(), kind);
        }
        assert!("swap".parse::<StepKind>().is_err());
    }

    #[test]
    fn test_inverse_pairs() {
        for kind in StepKind::ALL {
            assert_eq!(kind.inverse().inverse(), kind);
            assert_eq!(kind.inverse().cost(), kind.cost());
        }
        assert_eq!(StepKind::Cba.inverse(), StepKind::CbaInv);
        assert_eq!(StepKind::Flip.inverse(), StepKind::Flip);
    }

    #[test]
    fn test_relabel_moves() {
        let cab = TransformationStep::new(StepKind::Cab, 0, 2);
        assert_eq!(cab.relabel((0, 4)), (2, 4));
        assert_eq!(cab.inverse().relabel((2, 4)), (0, 4));

        let tba = TransformationStep::new(StepKind::Tba, 4, 3);
        assert_eq!(tba.relabel((0, 4)), (0, 3));
        assert_eq!(tba.inverse().relabel((0, 3)), (0, 4));
    }

    #[test]
    fn test_step_edges() {
        let edges = |step: TransformationStep| step.edges().collect::<Vec<_>>();
        assert_eq!(edges(TransformationStep::new(StepKind::Cab, 0, 2)), vec![(0, 2)]);
        assert_eq!(edges(TransformationStep::new(StepKind::TbaInv, 4, 3)), vec![(3, 4)]);
        assert_eq!(edges(TransformationStep::new(StepKind::Flip, 1, 0)), vec![(0, 1)]);
        assert_eq!(edges(TransformationStep::cascade(0, 1, 2)), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_realized_cost_and_inverse() {
        let path = TransformationPath::new(vec![
            TransformationStep::new(StepKind::Cba, 2, 3),
            TransformationStep::new(StepKind::Nop, 3, 4),
        ]);
        assert_eq!(path.realized_cost(), 10);

        let full = path.with_inverse();
        assert_eq!(full.cost(), 10);
        assert_eq!(full.steps()[2], TransformationStep::new(StepKind::CbaInv, 2, 3));
        assert_eq!(full.relabel((2, 4)), (2, 4));
        assert_eq!(full.num_gates(), 11);
    }

    #[test]
    fn test_realizes() {
        let relay = TransformationPath::new(vec![
            TransformationStep::new(StepKind::Cba, 2, 3),
            TransformationStep::new(StepKind::Nop, 3, 4),
            TransformationStep::new(StepKind::CbaInv, 2, 3),
        ]);
        assert!(relay.realizes(2, 4));
        assert!(!relay.realizes(3, 4));
        assert!(TransformationPath::new(vec![TransformationStep::cascade(0, 1, 2)]).realizes(0, 2));

        assert!(!TransformationPath::default().realizes(0, 1));
        let unrestored = TransformationPath::new(vec![
            TransformationStep::new(StepKind::Cba, 2, 3),
            TransformationStep::new(StepKind::Nop, 3, 4),
        ]);
        assert!(!unrestored.realizes(2, 4));
        let twice = TransformationPath::new(vec![
            TransformationStep::new(StepKind::Nop, 0, 1),
            TransformationStep::new(StepKind::Nop, 0, 1),
        ]);
        assert!(!twice.realizes(0, 1));
    }

    #[test]
    fn test_cascade_conversion() {
        let control = TransformationPath::new(vec![
            TransformationStep::new(StepKind::Cab, 0, 1),
            TransformationStep::new(StepKind::Nop, 1, 2),
        ]);
        assert_eq!(
            control.with_cascade().steps(),
            &[TransformationStep::cascade(0, 1, 2)]
        );

        let target = TransformationPath::new(vec![
            TransformationStep::new(StepKind::Tba, 2, 1),
            TransformationStep::new(StepKind::Nop, 0, 1),
        ]);
        let cascade = target.with_cascade();
        assert_eq!(cascade.steps(), &[TransformationStep::cascade(0, 1, 2)]);
        assert_eq!(cascade.realized_cost(), 3);
        assert_eq!(cascade.num_gates(), 4);

        let other = TransformationPath::new(vec![
            TransformationStep::new(StepKind::Cba, 0, 1),
            TransformationStep::new(StepKind::Nop, 1, 2),
        ]);
        assert_eq!(other.clone().with_cascade(), other);
    }

    #[test]
    fn test_replay_len() {
        assert_eq!(replay_len(1), 4);
        assert_eq!(replay_len(2), 10);
        assert_eq!(replay_len(3), 22);
    }

    #[test]
    fn test_display() {
        let path = TransformationPath::new(vec![TransformationStep::new(StepKind::Flip, 1, 0)]);
        assert_eq!(path.to_string(), "flip 1 0\ncost = 4\n");
        assert_eq!(TransformationStep::cascade(0, 1, 2).to_string(), "cnot3 0 1 2");
    }
}
