// Lattice module: lattice arithmetic and the integer-matrix machinery used
// to enumerate and index superlattices.

// ======================== MODULE DECLARATIONS ========================
pub mod hnf;
pub mod integer;
#[allow(clippy::module_inception)]
pub mod lattice;
pub mod reduction;
pub mod supercell;

mod _tests_lattice;
mod _tests_reduction;
mod _tests_supercell;

// ======================== RE-EXPORTS ========================
pub use hnf::{flatten, hnf, hnf_matrices};
pub use integer::{
    adjugate_i64, det_i64, is_integer_matrix, is_integer_vector, is_unimodular, lround, to_f64,
};
pub use lattice::Lattice;
pub use reduction::{lll_reduce, unimodular_matrices};
pub use supercell::SiteIndexConverter;
