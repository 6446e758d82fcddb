//! Transformation path synthesis.
//!
//! For an ordered pair (v, w) the synthesizer runs a depth-first search over
//! (control, target) positions. Each relabeling move walks the control or the
//! target one edge further (in either edge direction) to a qubit not yet
//! visited, until the pair sits on a native edge in one orientation or the
//! other. Every such path is a candidate; the cheapest one, costed with its
//! inverse suffix, is the result.
//!
//! The search backtracks over a single prefix stack and visited set owned by
//! the call for that pair. No state is shared between pairs.

use fixedbitset::FixedBitSet;
use tracing::trace;

use crate::error::{CompileError, CompileResult};
use crate::graph::ConnectivityGraph;
use crate::path::{StepKind, TransformationPath, TransformationStep};

/// How far the search explores past a native base case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exploration {
    /// Stop a branch as soon as the pair sits on a native edge.
    EarlyStop,
    /// Keep relabeling past native base cases.
    Unrestricted,
}

/// Visit every candidate path for CNOT(v, w).
///
/// Candidates are reported as their forward part: relabeling moves followed
/// by the terminal `nop` or `flip`. The inverse suffix is not included.
pub fn enumerate_paths(
    graph: &ConnectivityGraph,
    v: u32,
    w: u32,
    exploration: Exploration,
    mut visit: impl FnMut(&[TransformationStep]),
) {
    let mut visited = FixedBitSet::with_capacity(graph.num_qubits());
    visited.insert(v as usize);
    visited.insert(w as usize);
    let mut prefix = Vec::new();
    search(graph, v, w, exploration, &mut prefix, &mut visited, &mut visit);
}

fn search(
    graph: &ConnectivityGraph,
    v: u32,
    w: u32,
    exploration: Exploration,
    prefix: &mut Vec<TransformationStep>,
    visited: &mut FixedBitSet,
    visit: &mut impl FnMut(&[TransformationStep]),
) {
    let mut based = false;
    for (kind, holds) in [
        (StepKind::Nop, graph.has_edge(v, w)),
        (StepKind::Flip, graph.has_edge(w, v)),
    ] {
        if holds {
            prefix.push(TransformationStep::new(kind, v, w));
            visit(prefix);
            prefix.pop();
            based = true;
        }
    }
    if based && exploration == Exploration::EarlyStop {
        return;
    }

    for i in 0..graph.num_qubits() as u32 {
        // Control moves relabel (v, w) to (i, w), target moves to (v, i).
        let moves = [
            (StepKind::Cab, v, graph.has_edge(v, i)),
            (StepKind::Cba, v, graph.has_edge(i, v)),
            (StepKind::Tab, w, graph.has_edge(w, i)),
            (StepKind::Tba, w, graph.has_edge(i, w)),
        ];
        for (kind, from, holds) in moves {
            if !holds || visited.contains(i as usize) {
                continue;
            }
            prefix.push(TransformationStep::new(kind, from, i));
            visited.insert(i as usize);
            match kind {
                StepKind::Cab | StepKind::Cba => {
                    search(graph, i, w, exploration, prefix, visited, visit);
                }
                _ => search(graph, v, i, exploration, prefix, visited, visit),
            }
            visited.set(i as usize, false);
            prefix.pop();
        }
    }
}

/// Cheapest candidate among the visited paths, after cascade conversion.
/// Ties keep the first candidate found.
pub fn cheapest_path(
    graph: &ConnectivityGraph,
    v: u32,
    w: u32,
    exploration: Exploration,
) -> Option<TransformationPath> {
    let mut best: Option<(u32, TransformationPath)> = None;
    enumerate_paths(graph, v, w, exploration, |steps| {
        let candidate = TransformationPath::new(steps.to_vec()).with_cascade();
        let cost = candidate.realized_cost();
        if best.as_ref().is_none_or(|(best_cost, _)| cost < *best_cost) {
            best = Some((cost, candidate));
        }
    });
    best.map(|(_, path)| path)
}

/// Synthesize the stored path for CNOT(v, w): the cheapest candidate with
/// its inverse suffix appended. An empty path for `v == w`.
pub fn synthesize(graph: &ConnectivityGraph, v: u32, w: u32) -> CompileResult<TransformationPath> {
    let n = graph.num_qubits();
    if v as usize >= n || w as usize >= n {
        return Err(CompileError::InvalidConfiguration(format!(
            "pair ({v}, {w}) out of range for {n} qubits"
        )));
    }
    if v == w {
        return Ok(TransformationPath::default());
    }

    let path = cheapest_path(graph, v, w, Exploration::EarlyStop)
        .ok_or(CompileError::Disconnected {
            control: v,
            target: w,
        })?
        .with_inverse();
    trace!("cnot({v},{w}) => {} steps, cost {}", path.len(), path.cost());
    Ok(path)
}
