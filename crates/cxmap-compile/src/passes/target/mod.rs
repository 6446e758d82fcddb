//! Target-specific compilation passes.
//!
//! These passes read the target (connectivity graph and cost table) from
//! the PropertySet and turn a logical circuit into one whose CNOTs all run
//! on native edges.

pub mod expansion;
pub mod layout;

pub use expansion::CnotExpansion;
pub use layout::{ApplyAssignment, AssignmentReport, AssignmentSearch, PhysicalLayout};
