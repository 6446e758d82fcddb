//! Directed connectivity graph of a target device.

use std::fmt;

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};

/// Directed connectivity graph.
///
/// `has_edge(v, w)` is true iff the device natively supports a CNOT with
/// control `v` and target `w`. The adjacency matrix is stored flat and
/// row-major, and the diagonal is always empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityGraph {
    /// Number of physical qubits.
    num_qubits: usize,
    /// Row-major `num_qubits * num_qubits` adjacency matrix.
    adjacency: Vec<bool>,
}

impl ConnectivityGraph {
    /// Create a graph from a list of directed edges.
    pub fn from_edges(
        num_qubits: usize,
        edges: impl IntoIterator<Item = (u32, u32)>,
    ) -> CompileResult<Self> {
        let mut adjacency = vec![false; num_qubits * num_qubits];
        for (v, w) in edges {
            let (v, w) = (v as usize, w as usize);
            if v >= num_qubits || w >= num_qubits {
                return Err(CompileError::InvalidConfiguration(format!(
                    "edge ({v}, {w}) out of range for {num_qubits} qubits"
                )));
            }
            if v == w {
                return Err(CompileError::InvalidConfiguration(format!(
                    "self-loop on qubit {v}"
                )));
            }
            adjacency[v * num_qubits + w] = true;
        }
        Ok(Self {
            num_qubits,
            adjacency,
        })
    }

    /// Create a graph from a dense row-major matrix. The caller guarantees
    /// the shape and the empty diagonal.
    pub(crate) fn from_matrix(num_qubits: usize, adjacency: Vec<bool>) -> Self {
        debug_assert_eq!(adjacency.len(), num_qubits * num_qubits);
        Self {
            num_qubits,
            adjacency,
        }
    }

    /// Get the number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Check if a native CNOT(control = `v`, target = `w`) exists.
    #[inline]
    pub fn has_edge(&self, v: u32, w: u32) -> bool {
        let (v, w) = (v as usize, w as usize);
        v < self.num_qubits && w < self.num_qubits && self.adjacency[v * self.num_qubits + w]
    }

    /// Iterate over the directed edges in row-major order.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let n = self.num_qubits;
        self.adjacency
            .iter()
            .enumerate()
            .filter(|&(_, &e)| e)
            .map(move |(idx, _)| ((idx / n) as u32, (idx % n) as u32))
    }

    /// Number of directed edges.
    pub fn num_edges(&self) -> usize {
        self.adjacency.iter().filter(|&&e| e).count()
    }

    /// Weakly connected components, ignoring edge direction.
    pub fn components(&self) -> UnionFind<usize> {
        let mut components = UnionFind::new(self.num_qubits);
        for (v, w) in self.edges() {
            components.union(v as usize, w as usize);
        }
        components
    }

    /// Check whether every qubit can reach every other one, ignoring direction.
    pub fn is_weakly_connected(&self) -> bool {
        let components = self.components();
        (1..self.num_qubits).all(|q| components.equiv(0, q))
    }

    /// Create a linear chain 0 → 1 → ... → n-1.
    pub fn linear(n: usize) -> Self {
        let mut adjacency = vec![false; n * n];
        for i in 1..n {
            adjacency[(i - 1) * n + i] = true;
        }
        Self::from_matrix(n, adjacency)
    }

    /// IBM QX2 (5 qubits, "bow tie").
    pub fn ibm_qx2() -> Self {
        Self::preset(5, &[(0, 1), (0, 2), (1, 2), (3, 2), (3, 4), (4, 2)])
    }

    /// IBM QX4 (5 qubits, "bow tie" with reversed edges).
    pub fn ibm_qx4() -> Self {
        Self::preset(5, &[(1, 0), (2, 0), (2, 1), (3, 2), (3, 4), (4, 2)])
    }

    /// IBM QX3 (16 qubits, ladder).
    pub fn ibm_qx3() -> Self {
        Self::preset(
            16,
            &[
                (0, 1),
                (1, 2),
                (2, 3),
                (3, 14),
                (4, 3),
                (4, 5),
                (6, 7),
                (6, 11),
                (7, 10),
                (8, 7),
                (9, 8),
                (9, 10),
                (11, 10),
                (12, 5),
                (12, 11),
                (12, 13),
                (13, 4),
                (13, 14),
                (15, 0),
                (15, 14),
            ],
        )
    }

    fn preset(n: usize, edges: &[(u32, u32)]) -> Self {
        let mut adjacency = vec![false; n * n];
        for &(v, w) in edges {
            adjacency[v as usize * n + w as usize] = true;
        }
        Self::from_matrix(n, adjacency)
    }
}

/// One row per qubit, `X` for an outgoing edge and `-` otherwise.
impl fmt::Display for ConnectivityGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.adjacency.chunks(self.num_qubits.max(1)) {
            let cells: Vec<&str> = row.iter().map(|&e| if e { "X" } else { "-" }).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_edges() {
        let graph = ConnectivityGraph::from_edges(3, [(0, 1), (2, 1)]).unwrap();
        assert_eq!(graph.num_qubits(), 3);
        assert!(graph.has_edge(0, 1));
        assert!(!graph.has_edge(1, 0));
        assert!(graph.has_edge(2, 1));
        assert!(!graph.has_edge(0, 0));
        assert!(!graph.has_edge(7, 1));
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(0, 1), (2, 1)]);
    }

    #[test]
    fn test_from_edges_rejects_bad_input() {
        assert!(matches!(
            ConnectivityGraph::from_edges(2, [(0, 2)]),
            Err(CompileError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            ConnectivityGraph::from_edges(2, [(1, 1)]),
            Err(CompileError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_presets() {
        let qx2 = ConnectivityGraph::ibm_qx2();
        assert_eq!(qx2.num_qubits(), 5);
        assert_eq!(qx2.num_edges(), 6);
        assert!(qx2.has_edge(3, 4));
        assert!(qx2.is_weakly_connected());

        let qx4 = ConnectivityGraph::ibm_qx4();
        assert!(qx4.has_edge(1, 0));
        assert!(!qx4.has_edge(0, 1));

        let qx3 = ConnectivityGraph::ibm_qx3();
        assert_eq!(qx3.num_qubits(), 16);
        assert_eq!(qx3.num_edges(), 20);
        assert!(qx3.is_weakly_connected());
    }

    #[test]
    fn test_linear() {
        let graph = ConnectivityGraph::linear(4);
        assert_eq!(graph.num_edges(), 3);
        assert!(graph.has_edge(2, 3));
        assert!(!graph.has_edge(3, 2));
        assert!(graph.is_weakly_connected());
    }

    #[test]
    fn test_components() {
        let graph = ConnectivityGraph::from_edges(4, [(0, 1), (3, 2)]).unwrap();
        let components = graph.components();
        assert!(components.equiv(0, 1));
        assert!(components.equiv(2, 3));
        assert!(!components.equiv(1, 2));
        assert!(!graph.is_weakly_connected());
    }

    #[test]
    fn test_display() {
        let graph = ConnectivityGraph::from_edges(3, [(0, 1), (2, 0)]).unwrap();
        assert_eq!(graph.to_string(), "- X -\n- - -\nX - -\n");
    }
}
