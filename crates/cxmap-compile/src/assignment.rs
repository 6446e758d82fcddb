//! Qubit assignment search.
//!
//! Chooses an injective mapping of logical qubits onto the physical qubits
//! of a target that minimizes the total table cost of the circuit's CNOTs.

use std::cmp::Ordering;

use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use cxmap_ir::{Circuit, QubitId};

use crate::error::{CompileError, CompileResult};
use crate::table::CostPathTable;
use crate::target::Target;

/// Candidate limit under which [`SearchStrategy::Auto`] searches exhaustively.
pub const DEFAULT_MAX_CANDIDATES: u64 = 1_000_000;

/// How many times each logical (control, target) pair occurs as a CNOT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceMatrix {
    num_qubits: usize,
    counts: FxHashMap<(u32, u32), u64>,
}

impl OccurrenceMatrix {
    /// Count the single-control NOT gates of `circuit`.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut counts = FxHashMap::default();
        for gate in circuit.iter().filter(|g| g.is_cnot()) {
            if let (Some(control), Some(target)) = (gate.controls.first(), gate.target()) {
                *counts.entry((control.line.0, target.0)).or_insert(0) += 1;
            }
        }
        Self {
            num_qubits: circuit.num_qubits(),
            counts,
        }
    }

    /// Number of logical qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Occurrences of CNOT(control, target).
    pub fn count(&self, control: u32, target: u32) -> u64 {
        self.counts.get(&(control, target)).copied().unwrap_or(0)
    }

    /// Iterate over `((control, target), count)`.
    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32), u64)> + '_ {
        self.counts.iter().map(|(&pair, &count)| (pair, count))
    }

    /// Total CNOT occurrences involving `qubit` as control or target.
    pub fn incidence(&self, qubit: u32) -> u64 {
        self.iter()
            .filter(|&((c, t), _)| c == qubit || t == qubit)
            .map(|(_, count)| count)
            .sum()
    }

    /// Total table cost of the CNOTs under `assignment`.
    ///
    /// Fails if the assignment does not cover exactly the logical qubits or
    /// maps one outside the table.
    pub fn cost(&self, assignment: &Assignment, table: &CostPathTable) -> CompileResult<u64> {
        if assignment.len() != self.num_qubits {
            return Err(CompileError::InvalidConfiguration(format!(
                "assignment covers {} qubits, circuit has {}",
                assignment.len(),
                self.num_qubits
            )));
        }
        if let Some(&physical) = assignment.as_slice().iter().find(|&&p| !table.contains(p)) {
            return Err(CompileError::InvalidConfiguration(format!(
                "physical qubit {physical} out of range for {} qubits",
                table.num_qubits()
            )));
        }
        Ok(self.mapped_cost(assignment.as_slice(), table))
    }

    /// Total table cost under a mapping the search already keeps in range.
    fn mapped_cost(&self, mapping: &[u32], table: &CostPathTable) -> u64 {
        self.iter()
            .map(|((c, t), count)| {
                count * u64::from(table.cost(mapping[c as usize], mapping[t as usize]))
            })
            .sum()
    }

    /// Cost of the CNOTs touching logical `qubit` under `mapping`.
    fn incident_cost(&self, qubit: u32, mapping: &[u32], table: &CostPathTable) -> u64 {
        self.iter()
            .filter(|&((c, t), _)| c == qubit || t == qubit)
            .map(|((c, t), count)| {
                count * u64::from(table.cost(mapping[c as usize], mapping[t as usize]))
            })
            .sum()
    }
}

/// Injective mapping from logical qubit index to physical qubit index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment(Vec<u32>);

impl Assignment {
    /// Validate and wrap a mapping onto `num_physical` qubits.
    pub fn new(mapping: Vec<u32>, num_physical: usize) -> CompileResult<Self> {
        if mapping.len() > num_physical {
            return Err(CompileError::CircuitTooLarge {
                required: mapping.len(),
                available: num_physical,
            });
        }
        let mut used = FixedBitSet::with_capacity(num_physical);
        for (logical, &physical) in mapping.iter().enumerate() {
            if physical as usize >= num_physical {
                return Err(CompileError::InvalidConfiguration(format!(
                    "logical qubit {logical} mapped to physical qubit {physical}, \
                     target has {num_physical}"
                )));
            }
            if used.put(physical as usize) {
                return Err(CompileError::InvalidConfiguration(format!(
                    "physical qubit {physical} assigned twice"
                )));
            }
        }
        Ok(Self(mapping))
    }

    /// Logical qubit i on physical qubit i.
    pub fn identity(num_logical: usize) -> Self {
        Self((0..num_logical as u32).collect())
    }

    /// Number of logical qubits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no qubit is mapped.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Physical qubit of `logical`.
    pub fn physical(&self, logical: QubitId) -> Option<u32> {
        self.0.get(logical.index()).copied()
    }

    /// The mapping as a slice indexed by logical qubit.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Relabel `circuit` onto `num_physical` lines.
    ///
    /// Each physical line takes the names of the logical line mapped onto it;
    /// unused physical lines are named `i<k>` / `o<k>`.
    pub fn apply(&self, circuit: &Circuit, num_physical: usize) -> CompileResult<Circuit> {
        if circuit.num_qubits() != self.len() {
            return Err(CompileError::InvalidConfiguration(format!(
                "assignment covers {} qubits, circuit has {}",
                self.len(),
                circuit.num_qubits()
            )));
        }
        let mut logical_of = vec![None; num_physical];
        for (logical, &physical) in self.0.iter().enumerate() {
            let slot = logical_of.get_mut(physical as usize).ok_or_else(|| {
                CompileError::InvalidConfiguration(format!(
                    "physical qubit {physical} out of range for {num_physical} qubits"
                ))
            })?;
            *slot = Some(logical);
        }

        let mut out = Circuit::new(circuit.name());
        for (physical, logical) in logical_of.into_iter().enumerate() {
            match logical {
                Some(l) => out.add_line_like(&circuit.qubits()[l]),
                None => out.add_line(format!("i{physical}"), format!("o{physical}")),
            };
        }
        for gate in circuit {
            out.append(gate.remap(|q| QubitId(self.0[q.index()])))?;
        }
        Ok(out)
    }
}

/// Assignment search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Score every injective mapping and keep all minima.
    Exhaustive,
    /// Pivot-and-swap heuristic starting from the identity placement.
    Greedy,
    /// Exhaustive when at most `max_candidates` mappings exist, greedy otherwise.
    Auto {
        /// Candidate limit for the exhaustive search.
        max_candidates: u64,
    },
}

impl Default for SearchStrategy {
    fn default() -> Self {
        SearchStrategy::Auto {
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// Outcome of an assignment search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentResult {
    /// Total table cost of the best mapping(s).
    pub cost: u64,
    /// Every mapping achieving `cost`, in enumeration order.
    pub mappings: Vec<Assignment>,
    /// The strategy that produced the result (never `Auto`).
    pub strategy: SearchStrategy,
}

impl AssignmentResult {
    /// The first best mapping.
    pub fn best(&self) -> Option<&Assignment> {
        self.mappings.first()
    }
}

/// Number of injective mappings of `num_logical` onto `num_physical` qubits,
/// saturating at `u64::MAX`.
pub fn candidate_count(num_physical: usize, num_logical: usize) -> u64 {
    if num_logical > num_physical {
        return 0;
    }
    (num_physical - num_logical + 1..=num_physical)
        .try_fold(1u64, |acc, k| acc.checked_mul(k as u64))
        .unwrap_or(u64::MAX)
}

/// Search a mapping of the circuit's qubits onto `target`.
#[instrument(skip(occurrences, target), fields(logical = occurrences.num_qubits(), physical = target.num_qubits()))]
pub fn search_assignment(
    occurrences: &OccurrenceMatrix,
    target: &Target,
    strategy: SearchStrategy,
) -> CompileResult<AssignmentResult> {
    check_size(occurrences, target.table())?;
    let result = match strategy {
        SearchStrategy::Exhaustive => exhaustive_search(occurrences, target.table())?,
        SearchStrategy::Greedy => greedy_search(occurrences, target.table())?,
        SearchStrategy::Auto { max_candidates } => {
            let count = candidate_count(target.num_qubits(), occurrences.num_qubits());
            if count <= max_candidates {
                debug!("{count} candidates within limit {max_candidates}, searching exhaustively");
                exhaustive_search(occurrences, target.table())?
            } else {
                warn!(
                    "{count} candidates exceed limit {max_candidates}, falling back to greedy search"
                );
                greedy_search(occurrences, target.table())?
            }
        }
    };
    info!(
        "Assignment search ({:?}) found {} mapping(s) with cost {}",
        result.strategy,
        result.mappings.len(),
        result.cost
    );
    Ok(result)
}

fn check_size(occurrences: &OccurrenceMatrix, table: &CostPathTable) -> CompileResult<()> {
    if occurrences.num_qubits() > table.num_qubits() {
        return Err(CompileError::CircuitTooLarge {
            required: occurrences.num_qubits(),
            available: table.num_qubits(),
        });
    }
    Ok(())
}

/// Score every combination of physical qubits in every order.
///
/// Combinations are enumerated lexicographically and each is permuted
/// lexicographically from its sorted order. All mappings achieving the
/// minimum are kept in enumeration order.
pub fn exhaustive_search(
    occurrences: &OccurrenceMatrix,
    table: &CostPathTable,
) -> CompileResult<AssignmentResult> {
    check_size(occurrences, table)?;
    let n = table.num_qubits();
    let l = occurrences.num_qubits();

    let mut best = u64::MAX;
    let mut mappings = Vec::new();
    let mut combination: Vec<u32> = (0..l as u32).collect();
    loop {
        let mut permutation = combination.clone();
        loop {
            let cost = occurrences.mapped_cost(&permutation, table);
            match cost.cmp(&best) {
                Ordering::Less => {
                    best = cost;
                    mappings.clear();
                    mappings.push(Assignment(permutation.clone()));
                }
                Ordering::Equal => mappings.push(Assignment(permutation.clone())),
                Ordering::Greater => {}
            }
            if !next_permutation(&mut permutation) {
                break;
            }
        }
        if !next_combination(&mut combination, n) {
            break;
        }
    }

    Ok(AssignmentResult {
        cost: best,
        mappings,
        strategy: SearchStrategy::Exhaustive,
    })
}

/// Pivot-and-swap heuristic.
///
/// Starts from the identity placement. Each round picks the unplaced physical
/// qubit whose occupant carries the highest incident cost (ties: more
/// incident CNOTs, then lower index), tries swapping that occupant with every
/// other unplaced physical qubit, applies the strictly cheapest swap if any
/// and fixes the occupant where it ends up.
pub fn greedy_search(
    occurrences: &OccurrenceMatrix,
    table: &CostPathTable,
) -> CompileResult<AssignmentResult> {
    check_size(occurrences, table)?;
    let n = table.num_qubits();
    let l = occurrences.num_qubits();

    // phys[q] is the physical qubit of q; q >= l are idle placeholders.
    let mut phys: Vec<u32> = (0..n as u32).collect();
    let mut occupant: Vec<u32> = (0..n as u32).collect();
    let mut placed = FixedBitSet::with_capacity(n);
    let mut cost = occurrences.mapped_cost(&phys[..l], table);

    for _ in 0..n {
        let Some(pivot) = pick_pivot(occurrences, table, &phys[..l], &occupant, &placed) else {
            break;
        };

        let mut best: Option<(usize, u64)> = None;
        for q in (0..n).filter(|&q| q != pivot && !placed.contains(q)) {
            swap_occupants(&mut phys, &mut occupant, pivot, q);
            let trial = occurrences.mapped_cost(&phys[..l], table);
            swap_occupants(&mut phys, &mut occupant, pivot, q);
            if trial < best.map_or(cost, |(_, c)| c) {
                best = Some((q, trial));
            }
        }

        let destination = match best {
            Some((q, trial)) => {
                swap_occupants(&mut phys, &mut occupant, pivot, q);
                cost = trial;
                q
            }
            None => pivot,
        };
        placed.insert(destination);
    }

    Ok(AssignmentResult {
        cost,
        mappings: vec![Assignment(phys[..l].to_vec())],
        strategy: SearchStrategy::Greedy,
    })
}

fn pick_pivot(
    occurrences: &OccurrenceMatrix,
    table: &CostPathTable,
    mapping: &[u32],
    occupant: &[u32],
    placed: &FixedBitSet,
) -> Option<usize> {
    let mut pivot: Option<(usize, u64, u64)> = None;
    for p in (0..occupant.len()).filter(|&p| !placed.contains(p)) {
        let logical = occupant[p];
        let (weight, incidence) = if (logical as usize) < mapping.len() {
            (
                occurrences.incident_cost(logical, mapping, table),
                occurrences.incidence(logical),
            )
        } else {
            (0, 0)
        };
        let better = pivot.is_none_or(|(_, w, i)| (weight, incidence) > (w, i));
        if better {
            pivot = Some((p, weight, incidence));
        }
    }
    pivot.map(|(p, _, _)| p)
}

fn swap_occupants(phys: &mut [u32], occupant: &mut [u32], p: usize, q: usize) {
    occupant.swap(p, q);
    phys[occupant[p] as usize] = p as u32;
    phys[occupant[q] as usize] = q as u32;
}

/// Advance to the next lexicographic `k`-combination of `0..n`.
fn next_combination(combination: &mut [u32], n: usize) -> bool {
    let k = combination.len();
    let Some(i) = (0..k).rev().find(|&i| (combination[i] as usize) < n - k + i) else {
        return false;
    };
    combination[i] += 1;
    for j in i + 1..k {
        combination[j] = combination[j - 1] + 1;
    }
    true
}

/// Advance to the next lexicographic permutation.
fn next_permutation(values: &mut [u32]) -> bool {
    let Some(i) = (1..values.len()).rev().find(|&i| values[i - 1] < values[i]) else {
        return false;
    };
    let pivot = i - 1;
    let Some(j) = (i..values.len()).rev().find(|&j| values[j] > values[pivot]) else {
        return false;
    };
    values.swap(pivot, j);
    values[i..].reverse();
    true
}
