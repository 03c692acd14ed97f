// Symmetries module: Cartesian symmetry operations, factor-group
// generation, and symmetry-invariant displacement modes.

// ======================== MODULE DECLARATIONS ========================
pub mod factor_group;
pub mod invariant_modes;
pub mod symmetry_operations;


// ======================== RE-EXPORTS ========================
pub use factor_group::{lattice_point_group, make_factor_group, site_permutation};
pub use invariant_modes::generate_invariant_displacement_modes;
pub use symmetry_operations::{make_internal_translations, SymOp};
