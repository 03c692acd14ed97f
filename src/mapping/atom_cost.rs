// Periodic-boundary displacements, trial translations, and assignment cost
// matrices for atom mapping.

use nalgebra::{DMatrix, Matrix3xX, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};
use crate::lattice::{is_integer_vector, Lattice};
use crate::structure::is_vacancy;
use crate::mapping::search_data::LatticeMappingSearchData;

/// Which total displacement cost scores an atom mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtomCostFunction {
    /// Sum of squared displacement lengths.
    Isotropic,
    /// Sum of squared lengths of the symmetry-breaking displacement part.
    SymmetryBreaking,
}

/// Minimum length displacement `atom_cart - site_cart` under periodic
/// boundary conditions, by removing the rounded lattice translation.
///
/// Correct whenever the result lies within the inscribed sphere of the
/// Wigner-Seitz cell; the robust variant covers the rest.
pub fn fast_pbc_displacement_cart(
    lattice: &Lattice,
    site_cart: &Vector3<f64>,
    atom_cart: &Vector3<f64>,
) -> Vector3<f64> {
    let disp_cart = atom_cart - site_cart;
    let mut disp_frac = lattice.cart_to_frac(disp_cart);
    disp_frac -= disp_frac.map(f64::round);
    lattice.frac_to_cart(disp_frac)
}

/// Minimum length displacement `atom_cart - site_cart` under periodic
/// boundary conditions, guaranteed to land in the Wigner-Seitz cell.
pub fn robust_pbc_displacement_cart(
    lattice: &Lattice,
    site_cart: &Vector3<f64>,
    atom_cart: &Vector3<f64>,
) -> Result<Vector3<f64>> {
    let disp_cart = fast_pbc_displacement_cart(lattice, site_cart, atom_cart);
    if disp_cart.norm() < lattice.inner_voronoi_radius() + lattice.tol {
        return Ok(disp_cart);
    }
    lattice.voronoi_reduce(&disp_cart)
}

/// Cost of mapping one atom to one site.
///
/// A vacancy costs 0 on any site that allows a vacancy and infinity
/// elsewhere; a disallowed species costs infinity; otherwise the cost is
/// the squared displacement length.
pub fn atom_mapping_cost(
    displacement: &Vector3<f64>,
    atom_type: &str,
    allowed_atom_types: &[String],
    infinity: f64,
) -> f64 {
    if is_vacancy(atom_type) {
        if allowed_atom_types.iter().any(|t| is_vacancy(t)) {
            return 0.0;
        }
        return infinity;
    }
    if !allowed_atom_types.iter().any(|t| t == atom_type) {
        return infinity;
    }
    displacement.norm_squared()
}

// Equivalent translations differ by an internal translation plus a prim
// lattice vector; a candidate is new iff no such combination reproduces an
// already-accepted translation.
fn is_new_unique_translation(
    prim_lattice: &Lattice,
    test_translation_cart: &Vector3<f64>,
    internal_translations_cart: &[Vector3<f64>],
    current_unique_translations_cart: &[Vector3<f64>],
) -> bool {
    if internal_translations_cart.len() == 1 {
        return true;
    }
    let tol = prim_lattice.tol;
    for internal in internal_translations_cart {
        let shifted = test_translation_cart + internal;
        for existing in current_unique_translations_cart {
            if is_integer_vector(&prim_lattice.cart_to_frac(shifted - existing), tol) {
                return false;
            }
        }
    }
    true
}

/// Possible atom -> site translations bringing the atoms into registry with
/// the sites.
///
/// Candidates are generated from the atom with the fewest allowed prim
/// sites (ties to the smallest index) to every prim site allowing its type,
/// then reduced modulo the prim's internal translations and lattice
/// vectors.
///
/// Fails with `AtomRowAllForbidden` when some atom type is allowed on no
/// prim site at all.
pub fn make_trial_translations(data: &LatticeMappingSearchData) -> Result<Vec<Vector3<f64>>> {
    let prim = &data.prim_data;
    let atom_type = &data.structure_data.atom_type;
    let n_atom = data.structure_data.n_atom;
    if n_atom == 0 {
        return Ok(Vec::new());
    }

    let mut best_atom_index = 0usize;
    let mut min_n_allowed_sites = usize::MAX;
    for (atom_index, this_type) in atom_type.iter().enumerate() {
        let n_allowed_sites = prim
            .prim_allowed_atom_types
            .iter()
            .filter(|allowed| allowed.iter().any(|t| t == this_type))
            .count();
        if n_allowed_sites == 0 {
            return Err(MappingError::AtomRowAllForbidden(this_type.clone()));
        }
        if n_allowed_sites < min_n_allowed_sites {
            min_n_allowed_sites = n_allowed_sites;
            best_atom_index = atom_index;
        }
    }

    let best_type = &atom_type[best_atom_index];
    let atom_cart: Vector3<f64> = data
        .atom_coordinate_cart_in_supercell
        .column(best_atom_index)
        .into_owned();
    let internal = &prim.prim_internal_translations;

    let mut trial_translations: Vec<Vector3<f64>> = Vec::new();
    for prim_site_index in 0..prim.n_prim_site {
        if !prim.prim_allowed_atom_types[prim_site_index]
            .iter()
            .any(|t| t == best_type)
        {
            continue;
        }
        let test_translation = prim
            .prim_site_coordinate_cart
            .column(prim_site_index)
            .into_owned()
            - atom_cart;
        if is_new_unique_translation(
            &prim.prim_lattice,
            &test_translation,
            internal,
            &trial_translations,
        ) {
            trial_translations.push(test_translation);
        }
    }
    Ok(trial_translations)
}

/// Site-to-atom displacement table: `displacements[site][atom]` is the
/// minimum image of `atom + translation - site` under the lattice.
pub fn make_site_displacements(
    lattice: &Lattice,
    supercell_site_coordinate_cart: &Matrix3xX<f64>,
    atom_coordinate_cart_in_supercell: &Matrix3xX<f64>,
    trial_translation_cart: &Vector3<f64>,
) -> Result<Vec<Vec<Vector3<f64>>>> {
    let n_site = supercell_site_coordinate_cart.ncols();
    let n_atom = atom_coordinate_cart_in_supercell.ncols();
    if n_atom > n_site {
        return Err(MappingError::InvalidInput(format!(
            "{n_atom} atoms cannot map onto {n_site} supercell sites"
        )));
    }
    let mut site_displacements = Vec::with_capacity(n_site);
    for site_index in 0..n_site {
        let site: Vector3<f64> = supercell_site_coordinate_cart
            .column(site_index)
            .into_owned();
        let mut row = Vec::with_capacity(n_atom);
        for atom_index in 0..n_atom {
            let atom = atom_coordinate_cart_in_supercell
                .column(atom_index)
                .into_owned()
                + trial_translation_cart;
            row.push(robust_pbc_displacement_cart(lattice, &site, &atom)?);
        }
        site_displacements.push(row);
    }
    Ok(site_displacements)
}

/// Assignment cost matrix of shape `(N_site, N_site)`.
///
/// `cost[(site, atom)]` scores mapping atom `atom` to site `site`; columns
/// past the last real atom are synthetic vacancies with zero displacement.
pub fn make_cost_matrix(
    site_displacements: &[Vec<Vector3<f64>>],
    atom_type: &[String],
    allowed_atom_types: &[Vec<String>],
    infinity: f64,
) -> DMatrix<f64> {
    let n_site = allowed_atom_types.len();
    let n_atom = atom_type.len();
    let mut cost_matrix = DMatrix::<f64>::zeros(n_site, n_site);
    for atom_index in 0..n_atom {
        for site_index in 0..n_site {
            cost_matrix[(site_index, atom_index)] = atom_mapping_cost(
                &site_displacements[site_index][atom_index],
                &atom_type[atom_index],
                &allowed_atom_types[site_index],
                infinity,
            );
        }
    }
    // extra sites are filled by synthetic vacancies
    let zero = Vector3::zeros();
    for atom_index in n_atom..n_site {
        for site_index in 0..n_site {
            cost_matrix[(site_index, atom_index)] =
                atom_mapping_cost(&zero, "Va", &allowed_atom_types[site_index], infinity);
        }
    }
    cost_matrix
}

/// Total cost of the symmetry-breaking part of a displacement field: the
/// squared norm left after projecting out the prim's invariant displacement
/// modes, tiled over the supercell.
///
/// Requires the prim search data to carry invariant displacement modes.
pub fn symmetry_breaking_atom_cost(
    displacement: &Matrix3xX<f64>,
    data: &LatticeMappingSearchData,
) -> Result<f64> {
    let modes = data
        .prim_data
        .prim_sym_invariant_displacement_modes
        .as_ref()
        .ok_or_else(|| {
            MappingError::InvalidInput(
                "symmetry-breaking atom cost requires invariant displacement modes".to_string(),
            )
        })?;
    let n_site = displacement.ncols();
    let n_unitcells = data.index_converter.n_unitcells();
    let normalization = 1.0 / (n_unitcells as f64).sqrt();

    let total = displacement.norm_squared();
    let mut preserved = 0.0;
    for mode in modes {
        let mut overlap = 0.0;
        for site_index in 0..n_site {
            let (sublattice, _) = data.index_converter.unitcell_coord(site_index);
            overlap +=
                displacement.column(site_index).dot(&mode.column(sublattice)) * normalization;
        }
        preserved += overlap * overlap;
    }
    Ok((total - preserved).max(0.0))
}
