// Strain metrics scoring a lattice deformation.

use nalgebra::{Matrix3, SymmetricEigen};
use serde::{Deserialize, Serialize};

/// Right stretch tensor `U = sqrt(F^T F)` of a deformation gradient.
pub fn right_stretch(deformation_gradient: &Matrix3<f64>) -> Matrix3<f64> {
    let cauchy_green = deformation_gradient.transpose() * deformation_gradient;
    let eigen = SymmetricEigen::new(cauchy_green);
    let sqrt_eigenvalues = eigen.eigenvalues.map(|x| x.max(0.0).sqrt());
    eigen.eigenvectors * Matrix3::from_diagonal(&sqrt_eigenvalues) * eigen.eigenvectors.transpose()
}

/// Isotropic strain cost: `(1/3) tr((U - I)^2)`, the squared Frobenius norm
/// of the Biot strain divided by 3.
///
/// Invariant under any rotation applied to `F`; zero iff `U = I`.
pub fn isotropic_strain_cost(deformation_gradient: &Matrix3<f64>) -> f64 {
    let biot = right_stretch(deformation_gradient) - Matrix3::identity();
    biot.norm_squared() / 3.0
}

/// Symmetry-breaking strain cost: the isotropic cost of the part of the
/// Biot strain that is not invariant under the given point-group rotations.
///
/// The invariant part is the group average `(1/|G|) sum_g R_g B R_g^T`. An
/// empty rotation list is treated as the identity group, under which every
/// strain is symmetry-preserving.
pub fn symmetry_breaking_strain_cost(
    deformation_gradient: &Matrix3<f64>,
    point_group_rotations: &[Matrix3<f64>],
) -> f64 {
    let biot = right_stretch(deformation_gradient) - Matrix3::identity();
    if point_group_rotations.is_empty() {
        return 0.0;
    }
    let mut invariant = Matrix3::zeros();
    for rotation in point_group_rotations {
        invariant += rotation * biot * rotation.transpose();
    }
    invariant /= point_group_rotations.len() as f64;
    (biot - invariant).norm_squared() / 3.0
}

/// Which strain metric scores a lattice mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrainCostFunction {
    Isotropic,
    SymmetryBreaking,
}

impl StrainCostFunction {
    pub fn cost(
        &self,
        deformation_gradient: &Matrix3<f64>,
        point_group_rotations: &[Matrix3<f64>],
    ) -> f64 {
        match self {
            StrainCostFunction::Isotropic => isotropic_strain_cost(deformation_gradient),
            StrainCostFunction::SymmetryBreaking => {
                symmetry_breaking_strain_cost(deformation_gradient, point_group_rotations)
            }
        }
    }
}
