// Structure mapping result types, symmetry canonicalization, and the
// best-first search over (lattice mapping x trial translation x assignment).

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;

use log::{debug, trace};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::{
    COST_TOLERANCE, DEFAULT_INFINITY, DEFAULT_REORIENTATION_RANGE, FINGERPRINT_QUANTUM,
};
use crate::error::{MappingError, Result};
use crate::lattice::{det_i64, flatten, hnf, is_integer_matrix, is_integer_vector};
use crate::mapping::atom_cost::{
    make_trial_translations, symmetry_breaking_atom_cost, AtomCostFunction,
};
use crate::mapping::atom_mapping::{make_atom_mapping, AtomMapping};
use crate::mapping::lattice_cost::StrainCostFunction;
use crate::mapping::lattice_mapping::{
    enumerate_lattice_mappings, LatticeMapping, LatticeMappingOptions,
};
use crate::mapping::murty::AssignmentEnumerator;
use crate::mapping::search_data::{
    AtomMappingSearchData, LatticeMappingSearchData, PrimSearchData, StructureSearchData,
};
use crate::symmetries::SymOp;

/// A full structure mapping: how the child lattice deforms onto a prim
/// superlattice, and which atom lands on which site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureMapping {
    pub lattice_mapping: LatticeMapping,
    pub atom_mapping: AtomMapping,
}

/// A structure mapping with its cost breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredStructureMapping {
    pub lattice_cost: f64,
    pub atom_cost: f64,
    pub total_cost: f64,
    pub mapping: StructureMapping,
}

/// Score-ordered mapping results. `truncated` is set when a cost ceiling,
/// `k_best`, or the iteration bound cut the enumeration short; it is false
/// only when the search space was exhausted.
#[derive(Debug, Clone, Default)]
pub struct StructureMappingResults {
    pub data: Vec<ScoredStructureMapping>,
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct StructureMappingOptions {
    /// Weight of the lattice cost in the combined score.
    pub lattice_cost_weight: f64,
    /// Weight of the atom cost in the combined score.
    pub atom_cost_weight: f64,
    pub max_lattice_cost: f64,
    pub max_atom_cost: f64,
    pub max_total_cost: f64,
    /// Number of canonical mappings kept (ties with the k-th kept).
    pub k_best: usize,
    /// Supercell volume range override; the default is derived from the
    /// atom and prim site counts.
    pub min_vol: Option<i64>,
    pub max_vol: Option<i64>,
    pub lattice_cost_function: StrainCostFunction,
    pub atom_cost_function: AtomCostFunction,
    /// Sentinel cost marking forbidden assignments.
    pub infinity: f64,
    pub reorientation_range: i64,
    /// Tolerance classifying scores as equal.
    pub cost_tol: f64,
    /// Bound on queue pops before giving up.
    pub max_iterations: usize,
}

impl Default for StructureMappingOptions {
    fn default() -> Self {
        StructureMappingOptions {
            lattice_cost_weight: 0.5,
            atom_cost_weight: 0.5,
            max_lattice_cost: f64::INFINITY,
            max_atom_cost: f64::INFINITY,
            max_total_cost: f64::INFINITY,
            k_best: 1,
            min_vol: None,
            max_vol: None,
            lattice_cost_function: StrainCostFunction::Isotropic,
            atom_cost_function: AtomCostFunction::Isotropic,
            infinity: DEFAULT_INFINITY,
            reorientation_range: DEFAULT_REORIENTATION_RANGE,
            cost_tol: COST_TOLERANCE,
            max_iterations: usize::MAX,
        }
    }
}

/// Canonical identity of a structure mapping under the combined
/// prim x structure symmetry: the lexicographically smallest image of the
/// `(supercell HNF, site permutation, translation)` triple, with synthetic
/// vacancies collapsed and the translation reduced to quantized fractional
/// coordinates in `[0, 1)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MappingFingerprint {
    supercell_hnf: [i64; 9],
    permutation: Vec<usize>,
    translation: [i64; 3],
}

// Per-lattice-candidate state kept while full candidates from it are in
// flight.
struct ExpandedLattice {
    data: Arc<LatticeMappingSearchData>,
    lattice_cost: f64,
    supercell_hnf: [i64; 9],
    // supercell-preserving prim factor ops with the site permutation each
    // induces
    site_ops: Vec<(SymOp, Vec<usize>)>,
}

// Prim factor-group operations that map the supercell lattice onto itself,
// with the permutation they induce on supercell sites. Operations that
// relate different supercell lattices are already handled by the lattice
// enumerator's orbit pruning.
fn supercell_site_ops(data: &LatticeMappingSearchData) -> Vec<(SymOp, Vec<usize>)> {
    let supercell = &data.supercell_lattice;
    let tol = supercell.tol.max(1e-9);
    let sites = &data.supercell_site_coordinate_cart;
    let n_site = data.n_supercell_site;

    let mut out = Vec::new();
    for op in &data.prim_data.prim_factor_group {
        let integer_rep = supercell.inverse * op.rotation * supercell.direct;
        if !is_integer_matrix(&integer_rep, tol) {
            continue;
        }
        let mut perm = Vec::with_capacity(n_site);
        let mut valid = true;
        for site_index in 0..n_site {
            let image = op.apply(sites.column(site_index).into_owned());
            let found = (0..n_site).find(|&other| {
                let site = sites.column(other).into_owned();
                is_integer_vector(&supercell.cart_to_frac(image - site), tol)
            });
            match found {
                Some(other) => perm.push(other),
                None => {
                    valid = false;
                    break;
                }
            }
        }
        if valid {
            out.push((op.clone(), perm));
        }
    }
    if out.is_empty() {
        out.push((SymOp::identity(), (0..n_site).collect()));
    }
    out
}

// Atom permutations induced by the structure factor group.
fn structure_atom_ops(structure_data: &StructureSearchData) -> Vec<Vec<usize>> {
    let lattice = &structure_data.lattice;
    let tol = lattice.tol.max(1e-9);
    let n_atom = structure_data.n_atom;

    let mut out: Vec<Vec<usize>> = Vec::new();
    for op in &structure_data.structure_factor_group {
        let mut perm = Vec::with_capacity(n_atom);
        let mut valid = true;
        for atom_index in 0..n_atom {
            let image = op.apply(
                structure_data
                    .atom_coordinate_cart
                    .column(atom_index)
                    .into_owned(),
            );
            let found = (0..n_atom).find(|&other| {
                structure_data.atom_type[other] == structure_data.atom_type[atom_index]
                    && is_integer_vector(
                        &lattice.cart_to_frac(
                            image
                                - structure_data
                                    .atom_coordinate_cart
                                    .column(other)
                                    .into_owned(),
                        ),
                        tol,
                    )
            });
            match found {
                Some(other) => perm.push(other),
                None => {
                    valid = false;
                    break;
                }
            }
        }
        if valid && is_bijection(&perm) {
            out.push(perm);
        }
    }
    if out.is_empty() {
        out.push((0..n_atom).collect());
    }
    out
}

fn is_bijection(perm: &[usize]) -> bool {
    let mut seen = vec![false; perm.len()];
    for &p in perm {
        if p >= perm.len() || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}

fn quantize_frac(frac: &Vector3<f64>) -> [i64; 3] {
    let steps = (1.0 / FINGERPRINT_QUANTUM).round() as i64;
    let mut out = [0i64; 3];
    for (slot, x) in out.iter_mut().zip(frac.iter()) {
        *slot = ((x / FINGERPRINT_QUANTUM).round() as i64).rem_euclid(steps);
    }
    out
}

// The canonical fingerprint: minimum image of the mapping triple over the
// supercell-preserving prim ops (acting on sites and the translation) and
// the structure ops (relabeling atoms). Synthetic vacancy indices collapse
// to `n_atom` so that interchangeable vacancies compare equal.
fn canonical_fingerprint(
    expanded: &ExpandedLattice,
    atom_ops: &[Vec<usize>],
    permutation: &[usize],
    translation: &Vector3<f64>,
    n_atom: usize,
) -> MappingFingerprint {
    let prim_lattice = &expanded.data.prim_data.prim_lattice;
    let n_site = permutation.len();

    let mut best: Option<MappingFingerprint> = None;
    for (op, site_perm) in &expanded.site_ops {
        let image_translation = op.rotation * translation + op.translation;
        let frac = prim_lattice
            .cart_to_frac(image_translation)
            .map(|x| x - x.floor());
        let quantized = quantize_frac(&frac);
        for atom_perm in atom_ops {
            let mut image_permutation = vec![0usize; n_site];
            for site_index in 0..n_site {
                let atom_index = permutation[site_index];
                let relabeled = if atom_index < n_atom {
                    atom_perm[atom_index]
                } else {
                    n_atom
                };
                image_permutation[site_perm[site_index]] = relabeled;
            }
            let candidate = MappingFingerprint {
                supercell_hnf: expanded.supercell_hnf,
                permutation: image_permutation,
                translation: quantized,
            };
            if best.as_ref().map_or(true, |current| candidate < *current) {
                best = Some(candidate);
            }
        }
    }
    best.expect("site operations always include at least the identity")
}

#[derive(Debug)]
enum Pending {
    Lattice {
        lattice_index: usize,
    },
    Full {
        source_index: usize,
        atom_cost: f64,
        assignment: Vec<usize>,
    },
}

#[derive(Debug)]
struct QueueEntry {
    score: f64,
    seq: usize,
    pending: Pending,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

struct MurtySource {
    lattice_index: usize,
    atom_data: Arc<AtomMappingSearchData>,
    enumerator: AssignmentEnumerator,
}

/// Best-first search for the `k_best` lowest-scoring canonical structure
/// mappings of `structure_data` onto superstructures of `prim_data`.
///
/// The queue holds lattice-only candidates scored by their lattice-cost
/// lower bound and full candidates scored by the combined cost; popping a
/// lattice-only candidate expands it into one assignment enumerator per
/// trial translation. Infeasible or over-budget pairs are skipped, never
/// fatal. Results are deduplicated by canonical fingerprint and ordered by
/// `(total cost, fingerprint)`.
pub fn map_structures(
    prim_data: Arc<PrimSearchData>,
    structure_data: Arc<StructureSearchData>,
    options: &StructureMappingOptions,
) -> Result<StructureMappingResults> {
    if options.lattice_cost_weight < 0.0 || options.atom_cost_weight < 0.0 {
        return Err(MappingError::InvalidInput(
            "cost weights must be non-negative".to_string(),
        ));
    }
    if options.k_best == 0 {
        return Ok(StructureMappingResults::default());
    }

    let n_prim_site = prim_data.n_prim_site;
    let n_atom = structure_data.n_atom;
    let derived_min_vol = (n_atom.div_ceil(n_prim_site).max(1)) as i64;
    let min_vol = options.min_vol.unwrap_or(derived_min_vol);
    let max_vol = options.max_vol.unwrap_or(min_vol.max(derived_min_vol));

    let prim_rotations: Vec<Matrix3<f64>> = prim_data
        .prim_factor_group
        .iter()
        .map(|op| op.rotation)
        .collect();
    let structure_rotations: Vec<Matrix3<f64>> = structure_data
        .structure_factor_group
        .iter()
        .map(|op| op.rotation)
        .collect();
    let lattice_options = LatticeMappingOptions {
        min_vol,
        max_vol,
        max_cost: options.max_lattice_cost,
        k_best: None,
        reorientation_range: options.reorientation_range,
        cost_function: options.lattice_cost_function,
    };
    let candidates = enumerate_lattice_mappings(
        &prim_data.prim_lattice,
        &structure_data.lattice,
        &prim_rotations,
        &structure_rotations,
        &lattice_options,
    )?;
    debug!(
        "structure mapping search over {} lattice candidates, volumes [{min_vol}, {max_vol}]",
        candidates.len()
    );

    let atom_ops = structure_atom_ops(&structure_data);
    let alpha = options.lattice_cost_weight;
    let beta = options.atom_cost_weight;
    let cost_tol = options.cost_tol;

    let mut heap: BinaryHeap<Reverse<QueueEntry>> = BinaryHeap::new();
    let mut seq = 0usize;
    for (lattice_index, candidate) in candidates.iter().enumerate() {
        heap.push(Reverse(QueueEntry {
            score: alpha * candidate.cost,
            seq,
            pending: Pending::Lattice { lattice_index },
        }));
        seq += 1;
    }

    let mut expanded: Vec<Option<ExpandedLattice>> =
        (0..candidates.len()).map(|_| None).collect();
    let mut sources: Vec<MurtySource> = Vec::new();
    let mut results: Vec<(MappingFingerprint, usize, ScoredStructureMapping)> = Vec::new();
    let mut seen: HashSet<MappingFingerprint> = HashSet::new();
    let mut truncated = false;
    let mut iterations = 0usize;

    while let Some(Reverse(entry)) = heap.pop() {
        iterations += 1;
        if iterations > options.max_iterations {
            truncated = true;
            break;
        }
        if entry.score > options.max_total_cost + cost_tol {
            truncated = true;
            break;
        }
        if results.len() >= options.k_best
            && entry.score > results[options.k_best - 1].2.total_cost + cost_tol
        {
            truncated = true;
            break;
        }

        match entry.pending {
            Pending::Lattice { lattice_index } => {
                let candidate = &candidates[lattice_index];
                let volume = det_i64(&candidate.mapping.transformation_matrix());
                if (n_prim_site as i64) * volume < n_atom as i64 {
                    trace!("skipping lattice candidate {lattice_index}: too few supercell sites");
                    continue;
                }
                let data = Arc::new(LatticeMappingSearchData::new(
                    Arc::clone(&prim_data),
                    Arc::clone(&structure_data),
                    candidate.mapping.clone(),
                )?);
                let trial_translations = match make_trial_translations(&data) {
                    Ok(translations) => translations,
                    Err(MappingError::AtomRowAllForbidden(atom_type)) => {
                        trace!("skipping lattice candidate {lattice_index}: atom type {atom_type} has no allowed site");
                        continue;
                    }
                    Err(other) => return Err(other),
                };
                expanded[lattice_index] = Some(ExpandedLattice {
                    lattice_cost: candidate.cost,
                    supercell_hnf: flatten(&hnf(&data.transformation_matrix_to_super)),
                    site_ops: supercell_site_ops(&data),
                    data: Arc::clone(&data),
                });
                for translation in trial_translations {
                    let atom_data = Arc::new(AtomMappingSearchData::new(
                        Arc::clone(&data),
                        translation,
                        options.infinity,
                    )?);
                    let mut enumerator = match AssignmentEnumerator::new(
                        atom_data.cost_matrix.clone(),
                        options.infinity,
                        options.max_atom_cost,
                        cost_tol,
                    ) {
                        Ok(enumerator) => enumerator,
                        Err(MappingError::NoAssignmentsUnderBound) => {
                            trace!("skipping translation with no assignment under bound");
                            continue;
                        }
                        Err(other) => return Err(other),
                    };
                    if let Some((atom_cost, assignment)) = enumerator.next_assignment() {
                        let source_index = sources.len();
                        sources.push(MurtySource {
                            lattice_index,
                            atom_data,
                            enumerator,
                        });
                        heap.push(Reverse(QueueEntry {
                            score: alpha * candidate.cost + beta * atom_cost,
                            seq,
                            pending: Pending::Full {
                                source_index,
                                atom_cost,
                                assignment,
                            },
                        }));
                        seq += 1;
                    }
                }
            }
            Pending::Full {
                source_index,
                atom_cost,
                assignment,
            } => {
                let lattice_index = sources[source_index].lattice_index;
                let exp = expanded[lattice_index]
                    .as_ref()
                    .expect("full candidates are only created after expansion");
                let atom_mapping =
                    make_atom_mapping(&sources[source_index].atom_data, &assignment);
                let fingerprint = canonical_fingerprint(
                    exp,
                    &atom_ops,
                    &atom_mapping.permutation,
                    &atom_mapping.translation,
                    n_atom,
                );
                if seen.insert(fingerprint.clone()) {
                    let scored = ScoredStructureMapping {
                        lattice_cost: exp.lattice_cost,
                        atom_cost,
                        total_cost: entry.score,
                        mapping: StructureMapping {
                            lattice_mapping: candidates[lattice_index].mapping.clone(),
                            atom_mapping,
                        },
                    };
                    insert_result(
                        &mut results,
                        fingerprint,
                        lattice_index,
                        scored,
                        options.k_best,
                        cost_tol,
                    );
                } else {
                    trace!("dropping symmetry-equivalent mapping");
                }
                if let Some((next_cost, next_assignment)) =
                    sources[source_index].enumerator.next_assignment()
                {
                    heap.push(Reverse(QueueEntry {
                        score: alpha * exp.lattice_cost + beta * next_cost,
                        seq,
                        pending: Pending::Full {
                            source_index,
                            atom_cost: next_cost,
                            assignment: next_assignment,
                        },
                    }));
                    seq += 1;
                }
            }
        }
    }

    // re-score on request: assignments were enumerated under the geometric
    // cost, the symmetry-breaking displacement cost applies to the complete
    // mappings
    if options.atom_cost_function == AtomCostFunction::SymmetryBreaking {
        for (_, lattice_index, scored) in &mut results {
            let data = &expanded[*lattice_index]
                .as_ref()
                .expect("results reference expanded lattice candidates")
                .data;
            scored.atom_cost =
                symmetry_breaking_atom_cost(&scored.mapping.atom_mapping.displacement, data)?;
            scored.total_cost = alpha * scored.lattice_cost + beta * scored.atom_cost;
        }
        results.sort_by(|a, b| {
            a.2.total_cost
                .total_cmp(&b.2.total_cost)
                .then_with(|| a.0.cmp(&b.0))
        });
    }

    Ok(StructureMappingResults {
        data: results.into_iter().map(|(_, _, scored)| scored).collect(),
        truncated,
    })
}

// Keep `results` sorted by (total cost, fingerprint) and capped at k_best
// entries, retaining ties with the k-th score.
fn insert_result(
    results: &mut Vec<(MappingFingerprint, usize, ScoredStructureMapping)>,
    fingerprint: MappingFingerprint,
    lattice_index: usize,
    scored: ScoredStructureMapping,
    k_best: usize,
    cost_tol: f64,
) {
    let position = results.partition_point(|(existing_fp, _, existing)| {
        match existing.total_cost.total_cmp(&scored.total_cost) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => existing_fp <= &fingerprint,
        }
    });
    results.insert(position, (fingerprint, lattice_index, scored));
    while results.len() > k_best {
        let cutoff = results[k_best - 1].2.total_cost + cost_tol;
        if results
            .last()
            .is_some_and(|(_, _, last)| last.total_cost > cutoff)
        {
            results.pop();
        } else {
            break;
        }
    }
}
