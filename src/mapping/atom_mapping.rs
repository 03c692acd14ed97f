// Atom mapping result types and the per-lattice-mapping atom search.

use std::sync::Arc;

use nalgebra::{Matrix3xX, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::{COST_TOLERANCE, DEFAULT_INFINITY};
use crate::error::{MappingError, Result};
use crate::mapping::atom_cost::{
    make_trial_translations, symmetry_breaking_atom_cost, AtomCostFunction,
};
use crate::mapping::lattice_mapping::truncate_keeping_ties;
use crate::mapping::murty::AssignmentEnumerator;
use crate::mapping::search_data::{AtomMappingSearchData, LatticeMappingSearchData};

/// An atom mapping: which atom (or synthetic vacancy) sits on each site,
/// displaced by what, after which rigid translation.
///
/// Column `l` of `displacement` satisfies
/// `site[l] + displacement[l] == atom[permutation[l]] + translation`
/// as the minimum image under the supercell lattice; vacancy columns are
/// zero. `permutation[site] = atom_or_vacancy_index` is a bijection on the
/// supercell sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomMapping {
    pub displacement: Matrix3xX<f64>,
    pub permutation: Vec<usize>,
    pub translation: Vector3<f64>,
}

/// An atom mapping with its cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredAtomMapping {
    pub atom_cost: f64,
    pub atom_mapping: AtomMapping,
}

#[derive(Debug, Clone, Default)]
pub struct AtomMappingResults {
    pub data: Vec<ScoredAtomMapping>,
}

#[derive(Debug, Clone)]
pub struct AtomMappingOptions {
    pub cost_function: AtomCostFunction,
    /// Sentinel cost marking forbidden assignments.
    pub infinity: f64,
    /// Atom cost ceiling.
    pub max_cost: f64,
    /// Number of assignments kept per trial translation and overall
    /// (ties with the k-th kept).
    pub k_best: usize,
}

impl Default for AtomMappingOptions {
    fn default() -> Self {
        AtomMappingOptions {
            cost_function: AtomCostFunction::Isotropic,
            infinity: DEFAULT_INFINITY,
            max_cost: f64::INFINITY,
            k_best: 1,
        }
    }
}

/// Assemble the atom mapping selected by an assignment on the cost matrix
/// of `data`.
pub fn make_atom_mapping(data: &AtomMappingSearchData, assignment: &[usize]) -> AtomMapping {
    let n_site = assignment.len();
    let n_atom = data.lattice_mapping_data.structure_data.n_atom;
    let mut displacement = Matrix3xX::<f64>::zeros(n_site);
    for (site_index, &atom_index) in assignment.iter().enumerate() {
        if atom_index < n_atom {
            displacement.set_column(site_index, &data.site_displacements[site_index][atom_index]);
        }
    }
    AtomMapping {
        displacement,
        permutation: assignment.to_vec(),
        translation: data.trial_translation_cart,
    }
}

/// Enumerate the best atom mappings for one lattice mapping, across all of
/// its trial translations, sorted ascending by atom cost.
///
/// Translations whose best assignment exceeds `max_cost` are skipped; the
/// result may be empty. Fails with `AtomRowAllForbidden` when no
/// translation can exist at all.
pub fn map_atoms(
    data: Arc<LatticeMappingSearchData>,
    options: &AtomMappingOptions,
) -> Result<AtomMappingResults> {
    let trial_translations = make_trial_translations(&data)?;
    let mut scored: Vec<ScoredAtomMapping> = Vec::new();
    for translation in trial_translations {
        let atom_data =
            AtomMappingSearchData::new(Arc::clone(&data), translation, options.infinity)?;
        let mut enumerator = match AssignmentEnumerator::new(
            atom_data.cost_matrix.clone(),
            options.infinity,
            options.max_cost,
            COST_TOLERANCE,
        ) {
            Ok(enumerator) => enumerator,
            Err(MappingError::NoAssignmentsUnderBound) => continue,
            Err(other) => return Err(other),
        };
        let mut emitted = 0usize;
        while emitted < options.k_best {
            let Some((atom_cost, assignment)) = enumerator.next_assignment() else {
                break;
            };
            scored.push(ScoredAtomMapping {
                atom_cost,
                atom_mapping: make_atom_mapping(&atom_data, &assignment),
            });
            emitted += 1;
        }
    }

    if options.cost_function == AtomCostFunction::SymmetryBreaking {
        for entry in &mut scored {
            entry.atom_cost =
                symmetry_breaking_atom_cost(&entry.atom_mapping.displacement, &data)?;
        }
    }
    scored.sort_by(|a, b| a.atom_cost.total_cmp(&b.atom_cost));
    let scored = truncate_keeping_ties(scored, options.k_best, |entry| entry.atom_cost);
    Ok(AtomMappingResults { data: scored })
}
