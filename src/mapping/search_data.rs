// Immutable shared search records.
//
// Each layer is constructed once and referenced by later layers through
// shared ownership; layers never mutate their ancestors. Prim and structure
// records live for a whole query; lattice-mapping and atom-mapping records
// are created as candidates enter the search queue.

use std::sync::Arc;

use nalgebra::{DMatrix, Matrix3, Matrix3xX, Vector3};

use crate::error::{MappingError, Result};
use crate::lattice::{Lattice, SiteIndexConverter};
use crate::structure::BasicStructure;
use crate::symmetries::{
    generate_invariant_displacement_modes, make_internal_translations, SymOp,
};
use crate::mapping::atom_cost::{make_cost_matrix, make_site_displacements};
use crate::mapping::lattice_mapping::LatticeMapping;

/// Query-lifetime data about the prim a structure is being mapped to.
#[derive(Debug, Clone)]
pub struct PrimSearchData {
    /// The primitive reference "parent" structure.
    pub shared_prim: Arc<BasicStructure>,
    pub prim_lattice: Lattice,
    pub n_prim_site: usize,
    /// Cartesian site coordinates (columns).
    pub prim_site_coordinate_cart: Matrix3xX<f64>,
    /// Atom types allowed on each prim site.
    pub prim_allowed_atom_types: Vec<Vec<String>>,
    /// True iff any site allows a vacancy.
    pub vacancies_allowed: bool,
    /// Used to skip symmetrically equivalent mappings. Empty input is
    /// replaced by the identity operation.
    pub prim_factor_group: Vec<SymOp>,
    /// Pure translations of the factor group (always contains zero).
    pub prim_internal_translations: Vec<Vector3<f64>>,
    /// Present only when the symmetry-breaking atom cost was requested.
    pub prim_sym_invariant_displacement_modes: Option<Vec<Matrix3xX<f64>>>,
}

impl PrimSearchData {
    /// Build the prim record.
    ///
    /// Set `make_invariant_displacement_modes` when the symmetry-breaking
    /// atom cost will be used.
    pub fn new(
        shared_prim: Arc<BasicStructure>,
        prim_factor_group: Vec<SymOp>,
        make_invariant_displacement_modes: bool,
    ) -> Result<Self> {
        let prim_factor_group = if prim_factor_group.is_empty() {
            vec![SymOp::identity()]
        } else {
            prim_factor_group
        };
        let prim_lattice = shared_prim.lattice.clone();
        let prim_internal_translations =
            make_internal_translations(&prim_factor_group, prim_lattice.tol.max(1e-9));
        let prim_sym_invariant_displacement_modes = if make_invariant_displacement_modes {
            Some(generate_invariant_displacement_modes(
                &shared_prim,
                &prim_factor_group,
            ))
        } else {
            None
        };
        Ok(PrimSearchData {
            n_prim_site: shared_prim.n_site(),
            prim_site_coordinate_cart: shared_prim.site_coordinate_cart.clone(),
            prim_allowed_atom_types: shared_prim.allowed_occupants.clone(),
            vacancies_allowed: shared_prim.max_possible_vacancies(),
            prim_lattice,
            prim_factor_group,
            prim_internal_translations,
            prim_sym_invariant_displacement_modes,
            shared_prim,
        })
    }
}

/// Query-lifetime data about the structure being mapped.
#[derive(Debug, Clone)]
pub struct StructureSearchData {
    /// The child structure's lattice.
    pub lattice: Lattice,
    pub n_atom: usize,
    /// Cartesian atom coordinates (columns), without the inverse lattice
    /// mapping deformation applied.
    pub atom_coordinate_cart: Matrix3xX<f64>,
    /// Atom types; may include vacancies, which then must be mapped.
    pub atom_type: Vec<String>,
    /// Used to skip symmetrically equivalent mappings. Empty input is
    /// replaced by the identity operation.
    pub structure_factor_group: Vec<SymOp>,
}

impl StructureSearchData {
    pub fn new(
        lattice: Lattice,
        atom_coordinate_cart: Matrix3xX<f64>,
        atom_type: Vec<String>,
        structure_factor_group: Vec<SymOp>,
    ) -> Result<Self> {
        if atom_type.len() != atom_coordinate_cart.ncols() {
            return Err(MappingError::InvalidInput(format!(
                "{} atom coordinates but {} atom types",
                atom_coordinate_cart.ncols(),
                atom_type.len()
            )));
        }
        Ok(StructureSearchData {
            lattice,
            n_atom: atom_coordinate_cart.ncols(),
            atom_coordinate_cart,
            atom_type,
            structure_factor_group: if structure_factor_group.is_empty() {
                vec![SymOp::identity()]
            } else {
                structure_factor_group
            },
        })
    }
}

/// Data derived from one lattice mapping, shared by all of its trial
/// translations.
#[derive(Debug, Clone)]
pub struct LatticeMappingSearchData {
    pub prim_data: Arc<PrimSearchData>,
    pub structure_data: Arc<StructureSearchData>,
    pub lattice_mapping: LatticeMapping,
    /// Combined integer supercell transform `T * N`.
    pub transformation_matrix_to_super: Matrix3<i64>,
    pub supercell_lattice: Lattice,
    pub index_converter: SiteIndexConverter,
    pub n_supercell_site: usize,
    /// Child atom coordinates with the inverse deformation applied,
    /// `F^-1 r2` (columns).
    pub atom_coordinate_cart_in_supercell: Matrix3xX<f64>,
    /// Cartesian supercell site coordinates (columns).
    pub supercell_site_coordinate_cart: Matrix3xX<f64>,
    /// Atom types allowed on each supercell site.
    pub supercell_allowed_atom_types: Vec<Vec<String>>,
}

impl LatticeMappingSearchData {
    pub fn new(
        prim_data: Arc<PrimSearchData>,
        structure_data: Arc<StructureSearchData>,
        lattice_mapping: LatticeMapping,
    ) -> Result<Self> {
        let transformation_matrix_to_super = lattice_mapping.transformation_matrix();
        let supercell_lattice = prim_data
            .prim_lattice
            .make_superlattice(&transformation_matrix_to_super)?;
        let index_converter =
            SiteIndexConverter::new(transformation_matrix_to_super, prim_data.n_prim_site)?;
        let n_supercell_site = index_converter.total_sites();
        if structure_data.n_atom > n_supercell_site {
            return Err(MappingError::InvalidInput(format!(
                "{} atoms cannot map onto {} supercell sites",
                structure_data.n_atom, n_supercell_site
            )));
        }
        let deformation_inverse = lattice_mapping
            .deformation_gradient
            .try_inverse()
            .ok_or_else(|| {
                MappingError::InvalidInput("deformation gradient is singular".to_string())
            })?;
        let atom_coordinate_cart_in_supercell =
            deformation_inverse * &structure_data.atom_coordinate_cart;

        let supercell_site_coordinate_cart = make_supercell_site_coordinate_cart(
            &index_converter,
            &prim_data.prim_site_coordinate_cart,
            &prim_data.prim_lattice,
        );
        let supercell_allowed_atom_types = make_supercell_allowed_atom_types(
            &index_converter,
            &prim_data.prim_allowed_atom_types,
        );

        Ok(LatticeMappingSearchData {
            prim_data,
            structure_data,
            lattice_mapping,
            transformation_matrix_to_super,
            supercell_lattice,
            index_converter,
            n_supercell_site,
            atom_coordinate_cart_in_supercell,
            supercell_site_coordinate_cart,
            supercell_allowed_atom_types,
        })
    }
}

/// Data derived from one (lattice mapping, trial translation) pair: the
/// displacement table and the assignment cost matrix.
#[derive(Debug, Clone)]
pub struct AtomMappingSearchData {
    pub lattice_mapping_data: Arc<LatticeMappingSearchData>,
    /// Cartesian translation applied to the atoms in the ideal
    /// superstructure setting.
    pub trial_translation_cart: Vector3<f64>,
    /// `site_displacements[site][atom]`, minimum images under the
    /// supercell lattice.
    pub site_displacements: Vec<Vec<Vector3<f64>>>,
    /// Shape `(N_site, N_site)`; vacancy-padded past the last real atom.
    pub cost_matrix: DMatrix<f64>,
}

impl AtomMappingSearchData {
    pub fn new(
        lattice_mapping_data: Arc<LatticeMappingSearchData>,
        trial_translation_cart: Vector3<f64>,
        infinity: f64,
    ) -> Result<Self> {
        let site_displacements = make_site_displacements(
            &lattice_mapping_data.supercell_lattice,
            &lattice_mapping_data.supercell_site_coordinate_cart,
            &lattice_mapping_data.atom_coordinate_cart_in_supercell,
            &trial_translation_cart,
        )?;
        let cost_matrix = make_cost_matrix(
            &site_displacements,
            &lattice_mapping_data.structure_data.atom_type,
            &lattice_mapping_data.supercell_allowed_atom_types,
            infinity,
        );
        Ok(AtomMappingSearchData {
            lattice_mapping_data,
            trial_translation_cart,
            site_displacements,
            cost_matrix,
        })
    }
}

// Supercell site coordinates: the sublattice coordinate plus the unit cell
// offset in prim lattice vectors.
fn make_supercell_site_coordinate_cart(
    index_converter: &SiteIndexConverter,
    prim_site_coordinate_cart: &Matrix3xX<f64>,
    prim_lattice: &Lattice,
) -> Matrix3xX<f64> {
    let n_supercell_site = index_converter.total_sites();
    let mut coordinates = Matrix3xX::<f64>::zeros(n_supercell_site);
    for linear_index in 0..n_supercell_site {
        let (sublattice, unitcell) = index_converter.unitcell_coord(linear_index);
        let offset = prim_lattice.direct
            * Vector3::new(unitcell[0] as f64, unitcell[1] as f64, unitcell[2] as f64);
        let coordinate =
            prim_site_coordinate_cart.column(sublattice).into_owned() + offset;
        coordinates.set_column(linear_index, &coordinate);
    }
    coordinates
}

fn make_supercell_allowed_atom_types(
    index_converter: &SiteIndexConverter,
    prim_allowed_atom_types: &[Vec<String>],
) -> Vec<Vec<String>> {
    (0..index_converter.total_sites())
        .map(|linear_index| {
            let (sublattice, _) = index_converter.unitcell_coord(linear_index);
            prim_allowed_atom_types[sublattice].clone()
        })
        .collect()
}
