use nalgebra::Matrix3xX;
use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};
use crate::lattice::Lattice;

/// True iff `label` names a vacancy.
pub fn is_vacancy(label: &str) -> bool {
    matches!(label, "Va" | "VA" | "va")
}

/// An idealized crystal: a lattice plus basis sites, each with the list of
/// occupant species allowed on it.
///
/// Occupants are atomic (single species labels); vacancy labels mark sites
/// that may be left empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicStructure {
    /// The crystal lattice.
    pub lattice: Lattice,
    /// Cartesian site coordinates (columns).
    pub site_coordinate_cart: Matrix3xX<f64>,
    /// Occupant species allowed on each site.
    pub allowed_occupants: Vec<Vec<String>>,
}

impl BasicStructure {
    /// Construct from Cartesian site coordinates.
    pub fn new(
        lattice: Lattice,
        site_coordinate_cart: Matrix3xX<f64>,
        allowed_occupants: Vec<Vec<String>>,
    ) -> Result<Self> {
        if site_coordinate_cart.ncols() == 0 {
            return Err(MappingError::InvalidInput(
                "structure must have at least one basis site".to_string(),
            ));
        }
        if site_coordinate_cart.ncols() != allowed_occupants.len() {
            return Err(MappingError::InvalidInput(format!(
                "{} site coordinates but {} occupant lists",
                site_coordinate_cart.ncols(),
                allowed_occupants.len()
            )));
        }
        if let Some(i) = allowed_occupants.iter().position(|occ| occ.is_empty()) {
            return Err(MappingError::InvalidInput(format!(
                "site {i} allows no occupants"
            )));
        }
        Ok(BasicStructure {
            lattice,
            site_coordinate_cart,
            allowed_occupants,
        })
    }

    /// Construct from fractional site coordinates.
    pub fn from_fractional(
        lattice: Lattice,
        site_coordinate_frac: Matrix3xX<f64>,
        allowed_occupants: Vec<Vec<String>>,
    ) -> Result<Self> {
        let cart = lattice.direct * &site_coordinate_frac;
        Self::new(lattice, cart, allowed_occupants)
    }

    pub fn n_site(&self) -> usize {
        self.site_coordinate_cart.ncols()
    }

    /// Fractional site coordinates (columns).
    pub fn site_coordinate_frac(&self) -> Matrix3xX<f64> {
        self.lattice.inverse * &self.site_coordinate_cart
    }

    /// True iff any site allows a vacancy occupant.
    pub fn max_possible_vacancies(&self) -> bool {
        self.allowed_occupants
            .iter()
            .any(|occ| occ.iter().any(|label| is_vacancy(label)))
    }
}
