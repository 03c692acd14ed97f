//! # Structure Mapping
//!
//! A Rust library for mapping atomic structures onto superstructures of a
//! reference crystal, designed for crystal-structure comparison, ordering
//! analysis, and transformation-pathway searches.
//!
//! ## Overview
//!
//! Given an idealized primitive reference crystal (the "prim") and a candidate
//! atomic structure (the "child"), this library enumerates low-cost mappings
//! of the child onto superstructures of the prim. A structure mapping has
//! three parts:
//!
//! - a *lattice mapping* `F * L1 * T * N = L2` relating the prim lattice `L1`
//!   to the child lattice `L2` through a deformation gradient `F`, an integer
//!   supercell transformation `T`, and a unimodular reorientation `N`
//! - a *trial translation* bringing the atoms into registry with the sites
//! - an *atom assignment* placing each child atom (and synthetic vacancies)
//!   on a site, with a small displacement
//!
//! ## Modules
//!
//! - [`lattice`]: lattice arithmetic, basis reduction, Hermite Normal Form
//!   enumeration, and supercell site indexing
//! - [`structure`]: the reference crystal and its allowed site occupants
//! - [`symmetries`]: crystallographic symmetry operations and factor groups
//! - [`mapping`]: assignment solvers, strain and displacement costs, and the
//!   best-first mapping search

pub mod config;
pub mod error;
pub mod lattice;
pub mod mapping;
pub mod structure;
pub mod symmetries;

pub use error::{MappingError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::lattice::Lattice;
    pub use crate::mapping::{
        map_atoms, map_lattices, map_structures, AtomMappingOptions, LatticeMappingOptions,
        PrimSearchData, StructureMappingOptions, StructureSearchData,
    };
    pub use crate::structure::BasicStructure;
    pub use crate::Result;
}
