//! Qubit (circuit line) types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qubit (circuit line) within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The line index as a `usize`, for indexing dense tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

impl From<usize> for QubitId {
    fn from(id: usize) -> Self {
        QubitId(u32::try_from(id).expect("QubitId overflow: exceeds u32::MAX"))
    }
}

/// A circuit line with optional input and output names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qubit {
    /// The unique identifier.
    pub id: QubitId,
    /// Name of the line at the circuit input, if any.
    pub input: Option<String>,
    /// Name of the line at the circuit output, if any.
    pub output: Option<String>,
}

impl Qubit {
    /// Create a new unnamed line.
    pub fn new(id: QubitId) -> Self {
        Self {
            id,
            input: None,
            output: None,
        }
    }

    /// Create a new line with input and output names.
    pub fn named(id: QubitId, input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            id,
            input: Some(input.into()),
            output: Some(output.into()),
        }
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.input {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "{}", self.id),
        }
    }
}
