//! Target context: a connectivity graph bundled with its cost/path table.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{CompileError, CompileResult};
use crate::graph::ConnectivityGraph;
use crate::path::TransformationPath;
use crate::persistence;
use crate::table::CostPathTable;

/// A device graph together with the synthesized table for it.
///
/// Passed by reference to the expander and the assignment search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    graph: ConnectivityGraph,
    table: CostPathTable,
}

impl Target {
    /// Synthesize the table for `graph`.
    #[instrument(skip(graph), fields(num_qubits = graph.num_qubits()))]
    pub fn new(graph: ConnectivityGraph) -> CompileResult<Self> {
        let table = CostPathTable::build(&graph)?;
        Ok(Self { graph, table })
    }

    /// Bundle an existing graph and table.
    pub fn from_parts(graph: ConnectivityGraph, table: CostPathTable) -> CompileResult<Self> {
        if graph.num_qubits() != table.num_qubits() {
            return Err(CompileError::InvalidConfiguration(format!(
                "graph has {} qubits but table has {}",
                graph.num_qubits(),
                table.num_qubits()
            )));
        }
        Ok(Self { graph, table })
    }

    /// Load a target from the persisted text format.
    pub fn load(reader: impl Read) -> CompileResult<Self> {
        let (graph, table) = persistence::read_target(reader)?;
        info!("Loaded target with {} qubits", graph.num_qubits());
        Ok(Self { graph, table })
    }

    /// Save the target in the persisted text format.
    pub fn save(&self, writer: impl Write) -> CompileResult<()> {
        persistence::write_target(writer, &self.graph, &self.table)
    }

    /// Replace this target with one loaded from `reader`.
    ///
    /// On error `self` is left untouched.
    pub fn replace_from_reader(&mut self, reader: impl Read) -> CompileResult<()> {
        let loaded = Self::load(reader)?;
        debug!(
            "Replacing target ({} -> {} qubits)",
            self.num_qubits(),
            loaded.num_qubits()
        );
        *self = loaded;
        Ok(())
    }

    /// Get the connectivity graph.
    pub fn graph(&self) -> &ConnectivityGraph {
        &self.graph
    }

    /// Get the cost/path table.
    pub fn table(&self) -> &CostPathTable {
        &self.table
    }

    /// Get the number of physical qubits.
    pub fn num_qubits(&self) -> usize {
        self.graph.num_qubits()
    }

    /// Cost of realizing CNOT(v, w).
    pub fn cost(&self, v: u32, w: u32) -> u32 {
        self.table.cost(v, w)
    }

    /// Path realizing CNOT(v, w).
    pub fn path(&self, v: u32, w: u32) -> &TransformationPath {
        self.table.path(v, w)
    }
}
