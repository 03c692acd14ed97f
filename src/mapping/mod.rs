// Mapping module: assignment solvers, strain and displacement costs, the
// shared search records, and the best-first structure mapping search.

// ======================== MODULE DECLARATIONS ========================
pub mod atom_cost;
pub mod atom_mapping;
pub mod hungarian;
pub mod lattice_cost;
pub mod lattice_mapping;
pub mod murty;
pub mod search_data;
pub mod structure_mapping;

mod _tests_lattice_cost;
mod _tests_lattice_mapping;
mod _tests_murty;

// ======================== RE-EXPORTS ========================
pub use atom_cost::{
    atom_mapping_cost, fast_pbc_displacement_cart, make_cost_matrix, make_site_displacements,
    make_trial_translations, robust_pbc_displacement_cart, symmetry_breaking_atom_cost,
    AtomCostFunction,
};
pub use atom_mapping::{
    make_atom_mapping, map_atoms, AtomMapping, AtomMappingOptions, AtomMappingResults,
    ScoredAtomMapping,
};
pub use hungarian::{solve_assignment, AssignmentSolution};
pub use lattice_cost::{
    isotropic_strain_cost, right_stretch, symmetry_breaking_strain_cost, StrainCostFunction,
};
pub use lattice_mapping::{
    map_lattices, LatticeMapping, LatticeMappingOptions, LatticeMappingResults,
    ScoredLatticeMapping,
};
pub use murty::{k_best_assignments, AssignmentEnumerator};
pub use search_data::{
    AtomMappingSearchData, LatticeMappingSearchData, PrimSearchData, StructureSearchData,
};
pub use structure_mapping::{
    map_structures, MappingFingerprint, ScoredStructureMapping, StructureMapping,
    StructureMappingOptions, StructureMappingResults,
};
