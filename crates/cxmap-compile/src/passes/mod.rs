//! Built-in compilation passes.

pub mod target;

pub use target::{ApplyAssignment, AssignmentReport, AssignmentSearch, CnotExpansion};
