use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// A single symmetry operation in Cartesian representation: orthogonal
/// rotation (proper or improper) + translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymOp {
    /// Orthogonal rotation matrix with determinant +-1
    pub rotation: Matrix3<f64>,
    /// Cartesian translation shift
    pub translation: Vector3<f64>,
}

impl SymOp {
    /// Create a new symmetry operation
    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Create identity operation
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Apply symmetry operation to a point
    pub fn apply(&self, point: Vector3<f64>) -> Vector3<f64> {
        self.rotation * point + self.translation
    }

    /// Composition `self . other`, the operation applying `other` first.
    pub fn compose(&self, other: &SymOp) -> SymOp {
        SymOp {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Check if this is the identity operation
    pub fn is_identity(&self, tol: f64) -> bool {
        (self.rotation - Matrix3::identity()).abs().max() < tol
            && self.translation.norm() < tol
    }

    /// Check if the rotation part is the identity
    pub fn is_pure_translation(&self, tol: f64) -> bool {
        (self.rotation - Matrix3::identity()).abs().max() < tol
    }
}

/// The pure translations of a factor group: the Cartesian translations of
/// every operation whose rotation part is the identity. Always contains the
/// zero translation.
pub fn make_internal_translations(factor_group: &[SymOp], tol: f64) -> Vec<Vector3<f64>> {
    let mut translations: Vec<Vector3<f64>> = factor_group
        .iter()
        .filter(|op| op.is_pure_translation(tol))
        .map(|op| op.translation)
        .collect();
    if !translations.iter().any(|t| t.norm() < tol) {
        translations.push(Vector3::zeros());
    }
    translations
}
