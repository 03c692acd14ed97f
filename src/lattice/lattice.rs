use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::MAX_VORONOI_ITERATIONS;
use crate::error::{MappingError, Result};
use crate::lattice::integer::{det_i64, to_f64};
use crate::lattice::reduction::lll_reduce;

/// A 3D lattice.
///
/// Beyond the basis matrix, a `Lattice` carries the quantities needed to
/// compute minimum-image displacements under periodic boundary conditions:
/// the LLL-reduced basis, the set of lattice points bounding the
/// Wigner-Seitz cell, and the radius of the sphere inscribed in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// Real-space basis vectors (columns).
    pub direct: Matrix3<f64>,
    /// Inverse of the basis matrix.
    pub inverse: Matrix3<f64>,
    /// Signed unit cell volume = det(direct).
    pub volume: f64,
    /// Tolerance for float comparisons.
    pub tol: f64,
    /// LLL-reduced basis spanning the same lattice.
    reduced: Matrix3<f64>,
    /// Lattice points whose perpendicular bisectors bound the Wigner-Seitz cell.
    voronoi_vectors: Vec<Vector3<f64>>,
    /// Radius of the largest sphere inscribed in the Wigner-Seitz cell.
    inner_voronoi_radius: f64,
}

impl Lattice {
    /// Construct a new lattice from a real-space basis.
    pub fn new(direct: Matrix3<f64>, tol: f64) -> Result<Self> {
        if tol < 0.0 {
            return Err(MappingError::InvalidInput(format!(
                "negative lattice tolerance: {tol}"
            )));
        }
        let volume = direct.determinant();
        let inverse = direct.try_inverse().filter(|_| volume.abs() > 1e-14).ok_or_else(|| {
            MappingError::InvalidInput("singular lattice basis".to_string())
        })?;

        let (reduced, _) = lll_reduce(&direct);

        // Lattice points within one reduced-basis shell of the origin bound
        // the Wigner-Seitz cell of a reduced basis.
        let mut voronoi_vectors = Vec::with_capacity(26);
        for i in -1i64..=1 {
            for j in -1i64..=1 {
                for k in -1i64..=1 {
                    if i == 0 && j == 0 && k == 0 {
                        continue;
                    }
                    let point = reduced * Vector3::new(i as f64, j as f64, k as f64);
                    voronoi_vectors.push(point);
                }
            }
        }
        let inner_voronoi_radius = voronoi_vectors
            .iter()
            .map(|v| v.norm() / 2.0)
            .fold(f64::INFINITY, f64::min);

        Ok(Lattice {
            direct,
            inverse,
            volume,
            tol,
            reduced,
            voronoi_vectors,
            inner_voronoi_radius,
        })
    }

    /// Convert fractional coords -> cartesian.
    pub fn frac_to_cart(&self, v_frac: Vector3<f64>) -> Vector3<f64> {
        self.direct * v_frac
    }

    /// Convert cartesian coords -> fractional.
    pub fn cart_to_frac(&self, v_cart: Vector3<f64>) -> Vector3<f64> {
        self.inverse * v_cart
    }

    /// Radius of the largest sphere inscribed in the Wigner-Seitz cell. Any
    /// vector shorter than this is already the minimum image.
    pub fn inner_voronoi_radius(&self) -> f64 {
        self.inner_voronoi_radius
    }

    /// The maximum Voronoi measure of `v` over the cell-bounding lattice
    /// points, and the lattice point attaining it.
    ///
    /// The measure against a lattice point `w` is `2 v.w / |w|^2`; it exceeds
    /// 1 exactly when `v` lies beyond the perpendicular bisector of `w`, in
    /// which case subtracting `w` moves `v` toward the Wigner-Seitz cell.
    pub fn max_voronoi_measure(&self, v: &Vector3<f64>) -> (f64, Vector3<f64>) {
        let mut best = f64::NEG_INFINITY;
        let mut best_point = Vector3::zeros();
        for w in &self.voronoi_vectors {
            let measure = 2.0 * v.dot(w) / w.norm_squared();
            if measure > best {
                best = measure;
                best_point = *w;
            }
        }
        (best, best_point)
    }

    /// Wrap `v` into the Wigner-Seitz cell, yielding the unique minimum image.
    ///
    /// Iteration is bounded; failure to converge indicates pathological
    /// tolerance settings and surfaces as `NumericalTolerance`.
    pub fn voronoi_reduce(&self, v: &Vector3<f64>) -> Result<Vector3<f64>> {
        let mut out = *v;
        for _ in 0..MAX_VORONOI_ITERATIONS {
            let (measure, lattice_point) = self.max_voronoi_measure(&out);
            if measure <= 1.0 + self.tol {
                return Ok(out);
            }
            out -= lattice_point;
        }
        Err(MappingError::NumericalTolerance(format!(
            "Voronoi reduction did not converge within {MAX_VORONOI_ITERATIONS} iterations"
        )))
    }

    /// Construct the superlattice `L * T` for an integer transformation with
    /// positive determinant.
    pub fn make_superlattice(&self, transformation: &Matrix3<i64>) -> Result<Lattice> {
        if det_i64(transformation) <= 0 {
            return Err(MappingError::InvalidInput(format!(
                "superlattice transformation must have positive determinant, got {}",
                det_i64(transformation)
            )));
        }
        Lattice::new(self.direct * to_f64(transformation), self.tol)
    }

    /// LLL-reduced basis spanning the same lattice.
    pub fn reduced_basis(&self) -> &Matrix3<f64> {
        &self.reduced
    }
}
