// Lattice mapping types and the cost-bounded, symmetry-pruned enumerator
// over Hermite Normal Form superlattices.

use std::collections::HashSet;

use log::debug;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::config::{COST_TOLERANCE, DEFAULT_REORIENTATION_RANGE};
use crate::error::{MappingError, Result};
use crate::lattice::{
    det_i64, flatten, hnf_matrices, is_integer_matrix, is_unimodular, lll_reduce, lround, to_f64,
    unimodular_matrices, Lattice,
};
use crate::mapping::lattice_cost::StrainCostFunction;
use crate::symmetries::lattice_point_group;

/// A lattice mapping `F * L1 * T * N = L2` relating a prim lattice `L1` to
/// a child lattice `L2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeMapping {
    /// Deformation gradient `F`.
    pub deformation_gradient: Matrix3<f64>,
    /// Integer transformation `T` to the superlattice, `det(T) > 0`.
    pub transformation_matrix_to_super: Matrix3<i64>,
    /// Unimodular reorientation `N`.
    pub reorientation: Matrix3<i64>,
}

impl LatticeMapping {
    pub fn new(
        deformation_gradient: Matrix3<f64>,
        transformation_matrix_to_super: Matrix3<i64>,
        reorientation: Matrix3<i64>,
    ) -> Result<Self> {
        if det_i64(&transformation_matrix_to_super) <= 0 {
            return Err(MappingError::InvalidInput(format!(
                "transformation matrix must have positive determinant, got {}",
                det_i64(&transformation_matrix_to_super)
            )));
        }
        if !is_unimodular(&reorientation) {
            return Err(MappingError::InvalidInput(
                "reorientation matrix must be unimodular".to_string(),
            ));
        }
        if deformation_gradient.determinant().abs() < 1e-14 {
            return Err(MappingError::InvalidInput(
                "deformation gradient must be invertible".to_string(),
            ));
        }
        Ok(LatticeMapping {
            deformation_gradient,
            transformation_matrix_to_super,
            reorientation,
        })
    }

    /// Combined integer supercell transform `T * N`.
    pub fn transformation_matrix(&self) -> Matrix3<i64> {
        self.transformation_matrix_to_super * self.reorientation
    }

    /// Right stretch `U = sqrt(F^T F)`.
    pub fn right_stretch(&self) -> Matrix3<f64> {
        super::lattice_cost::right_stretch(&self.deformation_gradient)
    }

    /// Isometry `Q = F * U^-1` of the polar decomposition `F = Q * U`.
    pub fn isometry(&self) -> Matrix3<f64> {
        let stretch_inverse = self
            .right_stretch()
            .try_inverse()
            .expect("right stretch of an invertible deformation is invertible");
        self.deformation_gradient * stretch_inverse
    }
}

/// A lattice mapping with its strain cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredLatticeMapping {
    pub lattice_cost: f64,
    pub lattice_mapping: LatticeMapping,
}

#[derive(Debug, Clone)]
pub struct LatticeMappingOptions {
    /// Smallest supercell volume (in prim cells) to search.
    pub min_vol: i64,
    /// Largest supercell volume to search.
    pub max_vol: i64,
    /// Strain cost ceiling.
    pub max_cost: f64,
    /// Keep only the best `k` mappings (ties with the k-th kept).
    pub k_best: Option<usize>,
    /// Entry bound for the unimodular reorientation search.
    pub reorientation_range: i64,
    pub cost_function: StrainCostFunction,
}

impl Default for LatticeMappingOptions {
    fn default() -> Self {
        LatticeMappingOptions {
            min_vol: 1,
            max_vol: 1,
            max_cost: f64::INFINITY,
            k_best: None,
            reorientation_range: DEFAULT_REORIENTATION_RANGE,
            cost_function: StrainCostFunction::Isotropic,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LatticeMappingResults {
    pub data: Vec<ScoredLatticeMapping>,
}

/// An enumerated candidate, carrying the canonical fingerprint used for
/// symmetry deduplication.
#[derive(Debug, Clone)]
pub(crate) struct LatticeMappingCandidate {
    pub cost: f64,
    pub mapping: LatticeMapping,
    pub fingerprint: [i64; 9],
}

/// Enumerate lattice mappings from `prim_lattice` onto `child_lattice`,
/// sorted ascending by `(cost, fingerprint)` and pruned to one
/// representative per symmetry orbit.
///
/// For each HNF supercell transformation `T`, the reorientation `N`
/// minimizing the strain cost of `F = L2 (L1 T N)^-1` is found from the LLL
/// reduction of the superlattice perturbed by unimodular matrices with
/// bounded entries. Two candidates `V = T N` and `V'` are equivalent when
/// `G_g V Q_h = V'` for a prim operation `g` and a child operation `h`
/// (integer representations in the respective bases); the fingerprint is
/// the lexicographically smallest image over the combined group.
pub(crate) fn enumerate_lattice_mappings(
    prim_lattice: &Lattice,
    child_lattice: &Lattice,
    prim_rotations: &[Matrix3<f64>],
    child_rotations: &[Matrix3<f64>],
    options: &LatticeMappingOptions,
) -> Result<Vec<LatticeMappingCandidate>> {
    if options.min_vol < 1 || options.max_vol < options.min_vol {
        return Err(MappingError::InvalidInput(format!(
            "invalid volume range [{}, {}]",
            options.min_vol, options.max_vol
        )));
    }
    if options.reorientation_range < 0 {
        return Err(MappingError::InvalidInput(
            "negative reorientation range".to_string(),
        ));
    }

    let l1 = prim_lattice.direct;
    let l2 = child_lattice.direct;
    let tol = prim_lattice.tol.max(child_lattice.tol);
    let perturbations = unimodular_matrices(options.reorientation_range);

    // integer representations of the symmetry groups in their own bases
    let prim_reps = integer_representations(prim_lattice, prim_rotations, tol);
    let child_reps = integer_representations(child_lattice, child_rotations, tol);

    let mut candidates: Vec<LatticeMappingCandidate> = Vec::new();
    for volume in options.min_vol..=options.max_vol {
        for transformation in hnf_matrices(volume) {
            let l_super = l1 * to_f64(&transformation);
            let (_, reduction_transform) = lll_reduce(&l_super);

            // best reorientation for this superlattice; cost ties resolve
            // to the reorientation closest to the identity
            let mut best: Option<(f64, i64, Matrix3<i64>, Matrix3<f64>)> = None;
            for perturbation in &perturbations {
                let reorientation = reduction_transform * perturbation;
                if det_i64(&reorientation) != 1 {
                    continue;
                }
                let shaped = l_super * to_f64(&reorientation);
                let Some(shaped_inverse) = shaped.try_inverse() else {
                    continue;
                };
                let deformation = l2 * shaped_inverse;
                let cost = options.cost_function.cost(&deformation, prim_rotations);
                let distance = identity_distance(&reorientation);
                let improved = match &best {
                    None => true,
                    Some((best_cost, best_distance, _, _)) => {
                        cost < best_cost - COST_TOLERANCE
                            || (cost < best_cost + COST_TOLERANCE && distance < *best_distance)
                    }
                };
                if improved {
                    best = Some((cost, distance, reorientation, deformation));
                }
            }
            let Some((cost, _, reorientation, deformation)) = best else {
                continue;
            };
            if cost > options.max_cost + COST_TOLERANCE {
                continue;
            }

            let combined = transformation * reorientation;
            let mut fingerprint = flatten(&combined);
            for g in &prim_reps {
                for h in &child_reps {
                    let image = flatten(&(g * combined * h));
                    if image < fingerprint {
                        fingerprint = image;
                    }
                }
            }
            candidates.push(LatticeMappingCandidate {
                cost,
                mapping: LatticeMapping::new(deformation, transformation, reorientation)?,
                fingerprint,
            });
        }
    }

    candidates.sort_by(|a, b| {
        a.cost
            .total_cmp(&b.cost)
            .then_with(|| a.fingerprint.cmp(&b.fingerprint))
    });
    let before = candidates.len();
    let mut seen: HashSet<[i64; 9]> = HashSet::new();
    candidates.retain(|candidate| seen.insert(candidate.fingerprint));
    debug!(
        "lattice mapping enumeration: {} candidates, {} after symmetry pruning",
        before,
        candidates.len()
    );
    Ok(candidates)
}

/// Enumerate scored lattice mappings from `prim_lattice` onto
/// `child_lattice`, in ascending cost order.
///
/// Symmetry pruning uses the point group of the prim lattice. When mapping
/// structures, prefer `map_structures`, which prunes with the prim's factor
/// group instead.
pub fn map_lattices(
    prim_lattice: &Lattice,
    child_lattice: &Lattice,
    options: &LatticeMappingOptions,
) -> Result<LatticeMappingResults> {
    let prim_rotations: Vec<Matrix3<f64>> = lattice_point_group(prim_lattice)
        .into_iter()
        .map(|op| op.rotation)
        .collect();
    let child_rotations: Vec<Matrix3<f64>> = lattice_point_group(child_lattice)
        .into_iter()
        .map(|op| op.rotation)
        .collect();
    let candidates = enumerate_lattice_mappings(
        prim_lattice,
        child_lattice,
        &prim_rotations,
        &child_rotations,
        options,
    )?;
    let mut data: Vec<ScoredLatticeMapping> = candidates
        .into_iter()
        .map(|candidate| ScoredLatticeMapping {
            lattice_cost: candidate.cost,
            lattice_mapping: candidate.mapping,
        })
        .collect();
    if let Some(k) = options.k_best {
        data = truncate_keeping_ties(data, k, |scored| scored.lattice_cost);
    }
    Ok(LatticeMappingResults { data })
}

// Entry-wise distance of an integer matrix from the identity, used to pick
// a canonical reorientation among strain-cost ties.
fn identity_distance(m: &Matrix3<i64>) -> i64 {
    let mut distance = 0;
    for row in 0..3 {
        for col in 0..3 {
            let target = i64::from(row == col);
            distance += (m[(row, col)] - target).abs();
        }
    }
    distance
}

// Integer representations of point operations in a lattice's own basis;
// operations that are not symmetries of the lattice are dropped, duplicates
// collapse. Always contains the identity.
fn integer_representations(
    lattice: &Lattice,
    rotations: &[Matrix3<f64>],
    tol: f64,
) -> Vec<Matrix3<i64>> {
    let mut reps: Vec<Matrix3<i64>> = Vec::new();
    for rotation in rotations {
        let rep = lattice.inverse * rotation * lattice.direct;
        if !is_integer_matrix(&rep, tol.max(1e-9)) {
            continue;
        }
        let rep = lround(&rep);
        if is_unimodular(&rep) && !reps.contains(&rep) {
            reps.push(rep);
        }
    }
    if reps.is_empty() {
        reps.push(Matrix3::identity());
    }
    reps
}

// Truncate a cost-sorted list to k entries, retaining trailing entries that
// tie the k-th cost within tolerance.
pub(crate) fn truncate_keeping_ties<T>(
    mut sorted: Vec<T>,
    k: usize,
    cost_of: impl Fn(&T) -> f64,
) -> Vec<T> {
    if k == 0 {
        sorted.clear();
        return sorted;
    }
    if sorted.len() <= k {
        return sorted;
    }
    let cutoff = cost_of(&sorted[k - 1]) + COST_TOLERANCE;
    let mut end = sorted.len();
    for (index, item) in sorted.iter().enumerate().skip(k) {
        if cost_of(item) > cutoff {
            end = index;
            break;
        }
    }
    sorted.truncate(end);
    sorted
}
