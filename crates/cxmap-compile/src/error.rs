//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] cxmap_ir::IrError),

    /// I/O error while reading or writing a persisted target.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed persisted graph or table.
    #[error("Format error at line {line}: {message}")]
    Format { line: usize, message: String },

    /// Invalid configuration (qubit index out of range, non-injective assignment, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Circuit too large for target.
    #[error("Circuit requires {required} qubits but target only has {available}")]
    CircuitTooLarge { required: usize, available: usize },

    /// Gate the expander has no lowering for.
    #[error("Unsupported gate '{name}' at position {position}")]
    UnsupportedGate { position: usize, name: String },

    /// Two physical qubits lie in different components of the connectivity graph.
    #[error("Qubits {control} and {target} are not connected")]
    Disconnected { control: u32, target: u32 },

    /// Missing target for a pass that needs one.
    #[error("Missing target (connectivity graph and cost table)")]
    MissingTarget,

    /// Missing assignment for a pass that needs one.
    #[error("Missing qubit assignment")]
    MissingAssignment,
}

impl CompileError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        CompileError::Format {
            line,
            message: message.into(),
        }
    }
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
