//! `PropertySet` for pass communication.
//!
//! Passes share a [`PropertySet`]: the target (graph + cost table), the
//! search strategy, the assignment chosen by the search pass and arbitrary
//! typed custom properties.
//!
//! # Examples
//!
//! ```
//! use cxmap_compile::{ConnectivityGraph, PropertySet, SearchStrategy, Target};
//!
//! let target = Target::new(ConnectivityGraph::ibm_qx4()).unwrap();
//! let props = PropertySet::new()
//!     .with_target(target)
//!     .with_strategy(SearchStrategy::Greedy);
//!
//! assert_eq!(props.target.as_ref().unwrap().num_qubits(), 5);
//! assert!(props.assignment.is_none());
//! ```
//!
//! ## Custom properties
//!
//! ```
//! use cxmap_compile::PropertySet;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct ExpansionStats {
//!     hadamards: usize,
//! }
//!
//! let mut props = PropertySet::new();
//! props.insert(ExpansionStats { hadamards: 6 });
//!
//! let stats = props.get::<ExpansionStats>().unwrap();
//! assert_eq!(stats.hadamards, 6);
//! ```

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};

use crate::assignment::{Assignment, SearchStrategy};
use crate::target::Target;

/// Properties shared between compilation passes.
///
/// # Standard Properties
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `target` | [`Target`] | Connectivity graph and cost/path table |
/// | `strategy` | [`SearchStrategy`] | How the assignment is searched |
/// | `assignment` | [`Assignment`] | Logical-to-physical qubit mapping |
///
/// # Custom Properties
///
/// Passes can store arbitrary data using the type-safe [`insert`](Self::insert)
/// and [`get`](Self::get) methods. Each type can have at most one value stored.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Target the circuit is mapped onto.
    pub target: Option<Target>,

    /// Assignment search strategy.
    pub strategy: SearchStrategy,

    /// Qubit assignment (logical → physical).
    ///
    /// Set by the assignment search, consumed when the circuit is relabeled.
    pub assignment: Option<Assignment>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target.
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the assignment search strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set a fixed assignment, skipping the search.
    #[must_use]
    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignment = Some(assignment);
        self
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
