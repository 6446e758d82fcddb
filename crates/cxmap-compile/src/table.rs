//! Cost/path table: the cheapest transformation path for every ordered pair.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{CompileError, CompileResult};
use crate::graph::ConnectivityGraph;
use crate::path::TransformationPath;
use crate::synthesis::synthesize;

/// Cheapest transformation path and its cost for every ordered qubit pair.
///
/// Built once per graph and read-only afterwards. The diagonal holds empty
/// paths of cost 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostPathTable {
    /// Number of physical qubits.
    num_qubits: usize,
    /// Row-major path costs.
    costs: Vec<u32>,
    /// Row-major paths.
    paths: Vec<TransformationPath>,
}

impl CostPathTable {
    /// Synthesize the table for every ordered pair of `graph`.
    ///
    /// Fails with [`CompileError::Disconnected`] if some pair lies in
    /// different weakly connected components.
    #[instrument(skip(graph), fields(num_qubits = graph.num_qubits()))]
    pub fn build(graph: &ConnectivityGraph) -> CompileResult<Self> {
        let n = graph.num_qubits();
        let components = graph.components();
        for v in 0..n {
            for w in 0..n {
                if !components.equiv(v, w) {
                    return Err(CompileError::Disconnected {
                        control: v as u32,
                        target: w as u32,
                    });
                }
            }
        }

        let paths = synthesize_all(graph)?;
        let table = Self::from_paths(n, paths);
        info!(
            "Built cost table for {} qubits, total cost {}",
            n,
            table.costs.iter().map(|&c| u64::from(c)).sum::<u64>()
        );
        Ok(table)
    }

    /// Create a table from row-major paths. Costs are the step-cost sums.
    pub(crate) fn from_paths(num_qubits: usize, paths: Vec<TransformationPath>) -> Self {
        debug_assert_eq!(paths.len(), num_qubits * num_qubits);
        let costs = paths.iter().map(TransformationPath::cost).collect();
        Self {
            num_qubits,
            costs,
            paths,
        }
    }

    /// Get the number of physical qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Cost of realizing CNOT(v, w).
    ///
    /// # Panics
    ///
    /// Panics if `v` or `w` is not a qubit of the table.
    #[inline]
    pub fn cost(&self, v: u32, w: u32) -> u32 {
        self.costs[self.index(v, w)]
    }

    /// Path realizing CNOT(v, w).
    ///
    /// # Panics
    ///
    /// Panics if `v` or `w` is not a qubit of the table.
    #[inline]
    pub fn path(&self, v: u32, w: u32) -> &TransformationPath {
        &self.paths[self.index(v, w)]
    }

    /// Cost and path of CNOT(v, w), or `None` if either qubit is out of range.
    pub fn get(&self, v: u32, w: u32) -> Option<(u32, &TransformationPath)> {
        let idx = self.checked_index(v, w)?;
        Some((self.costs[idx], &self.paths[idx]))
    }

    /// Check if `qubit` is a qubit of the table.
    #[inline]
    pub fn contains(&self, qubit: u32) -> bool {
        (qubit as usize) < self.num_qubits
    }

    /// Costs in row-major order.
    pub fn costs(&self) -> &[u32] {
        &self.costs
    }

    /// Iterate over `(v, w, path)` for every off-diagonal pair, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &TransformationPath)> + '_ {
        let n = self.num_qubits;
        self.paths
            .iter()
            .enumerate()
            .map(move |(idx, path)| ((idx / n) as u32, (idx % n) as u32, path))
            .filter(|(v, w, _)| v != w)
    }

    fn checked_index(&self, v: u32, w: u32) -> Option<usize> {
        (self.contains(v) && self.contains(w)).then(|| v as usize * self.num_qubits + w as usize)
    }

    fn index(&self, v: u32, w: u32) -> usize {
        match self.checked_index(v, w) {
            Some(idx) => idx,
            None => panic!(
                "cnot({v},{w}) out of range for a table of {} qubits",
                self.num_qubits
            ),
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn synthesize_all(graph: &ConnectivityGraph) -> CompileResult<Vec<TransformationPath>> {
    let n = graph.num_qubits() as u32;
    (0..n * n).map(|idx| synthesize(graph, idx / n, idx % n)).collect()
}

#[cfg(feature = "parallel")]
fn synthesize_all(graph: &ConnectivityGraph) -> CompileResult<Vec<TransformationPath>> {
    use rayon::prelude::*;

    let n = graph.num_qubits() as u32;
    (0..n * n)
        .into_par_iter()
        .map(|idx| synthesize(graph, idx / n, idx % n))
        .collect()
}

/// Cost matrix, one row per control qubit.
impl fmt::Display for CostPathTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.costs.chunks(self.num_qubits.max(1)) {
            let cells: Vec<String> = row.iter().map(u32::to_string).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::StepKind;

    #[test]
    fn test_qx2_table() {
        let table = CostPathTable::build(&ConnectivityGraph::ibm_qx2()).unwrap();
        assert_eq!(table.num_qubits(), 5);
        for v in 0..5 {
            assert_eq!(table.cost(v, v), 0);
            assert!(table.path(v, v).is_empty());
        }
        assert_eq!(table.cost(0, 1), 0);
        assert_eq!(table.cost(1, 0), 4);
        assert_eq!(table.cost(0, 3), 10);
        assert_eq!(table.path(1, 0).steps()[0].kind, StepKind::Flip);
        assert_eq!(table.iter().count(), 20);
    }

    #[test]
    fn test_costs_match_paths() {
        let table = CostPathTable::build(&ConnectivityGraph::ibm_qx4()).unwrap();
        for (v, w, path) in table.iter() {
            assert_eq!(table.cost(v, w), path.cost());
            assert_eq!(path.relabel((v, w)), (v, w));
        }
    }

    #[test]
    fn test_out_of_range_pair() {
        let table = CostPathTable::build(&ConnectivityGraph::ibm_qx2()).unwrap();
        // (0, 7) would land on row 1 of a flat 5x5 lookup
        assert!(table.get(0, 7).is_none());
        assert!(table.get(7, 0).is_none());
        assert_eq!(table.get(1, 0), Some((4, table.path(1, 0))));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_cost_panics_out_of_range() {
        let table = CostPathTable::build(&ConnectivityGraph::ibm_qx2()).unwrap();
        table.cost(0, 7);
    }

    #[test]
    fn test_disconnected_graph() {
        let graph = ConnectivityGraph::from_edges(3, [(0, 1)]).unwrap();
        assert!(matches!(
            CostPathTable::build(&graph),
            Err(CompileError::Disconnected { .. })
        ));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_build_matches_pairwise_synthesis() {
        let graph = ConnectivityGraph::ibm_qx4();
        let n = graph.num_qubits() as u32;
        let paths = (0..n * n)
            .map(|idx| synthesize(&graph, idx / n, idx % n).unwrap())
            .collect();
        let table = CostPathTable::build(&graph).unwrap();
        assert_eq!(table, CostPathTable::from_paths(n as usize, paths));
    }

    #[test]
    fn test_display() {
        let table = CostPathTable::build(&ConnectivityGraph::linear(2)).unwrap();
        assert_eq!(table.to_string(), "0 0\n4 0\n");
    }

    #[test]
    fn test_serde_roundtrip() {
        let table = CostPathTable::build(&ConnectivityGraph::linear(3)).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let back: CostPathTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
