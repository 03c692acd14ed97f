// Symmetry-invariant displacement modes.
//
// A displacement field assigns a Cartesian vector to each basis site. An
// operation g acts by rotating the vectors and permuting the sites; the
// invariant modes span the subspace fixed by every operation of the factor
// group. They are needed to split a displacement field into its
// symmetry-preserving and symmetry-breaking parts.

use nalgebra::{DVector, Matrix3xX, Vector3};

use crate::structure::BasicStructure;
use crate::symmetries::factor_group::site_permutation;
use crate::symmetries::symmetry_operations::SymOp;

const MODE_TOLERANCE: f64 = 1e-8;

/// Generate an orthonormal basis of the factor-group-invariant displacement
/// modes of the prim, as `3 x N_site` matrices (one column per site).
///
/// Operations that do not act on the basis are skipped.
pub fn generate_invariant_displacement_modes(
    prim: &BasicStructure,
    factor_group: &[SymOp],
) -> Vec<Matrix3xX<f64>> {
    let n_site = prim.n_site();
    let representations: Vec<(&SymOp, Vec<usize>)> = factor_group
        .iter()
        .filter_map(|op| site_permutation(op, prim).map(|perm| (op, perm)))
        .collect();
    if representations.is_empty() {
        return Vec::new();
    }

    let dim = 3 * n_site;
    let mut modes: Vec<DVector<f64>> = Vec::new();
    for basis_index in 0..dim {
        // group-average the unit displacement field e_{basis_index}
        let site = basis_index / 3;
        let axis = basis_index % 3;
        let mut unit = Vector3::zeros();
        unit[axis] = 1.0;

        let mut averaged = DVector::<f64>::zeros(dim);
        for (op, perm) in &representations {
            let rotated = op.rotation * unit;
            let target = perm[site];
            for component in 0..3 {
                averaged[3 * target + component] += rotated[component];
            }
        }
        averaged /= representations.len() as f64;

        // orthogonalize against the accepted modes
        for mode in &modes {
            let projection = mode.dot(&averaged);
            averaged -= mode * projection;
        }
        let norm = averaged.norm();
        if norm > MODE_TOLERANCE {
            modes.push(averaged / norm);
        }
    }

    modes
        .into_iter()
        .map(|flat| {
            let mut matrix = Matrix3xX::zeros(n_site);
            for site in 0..n_site {
                matrix.set_column(
                    site,
                    &Vector3::new(flat[3 * site], flat[3 * site + 1], flat[3 * site + 2]),
                );
            }
            matrix
        })
        .collect()
}
