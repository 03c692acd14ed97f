// Lattice basis reduction and bounded unimodular enumeration.

use nalgebra::{Matrix3, Vector3};

use crate::config::MAX_LLL_ITERATIONS;
use crate::lattice::integer::det_i64;

// Lovasz condition parameter
const DELTA: f64 = 0.75;

/// LLL-reduce the columns of `basis`.
///
/// Returns `(reduced, transform)` where `reduced = basis * transform` spans
/// the same lattice with shorter, more orthogonal columns and `transform` is
/// unimodular. The iteration count is bounded; for pathological input the
/// best basis found so far is returned, which is always a valid unimodular
/// image of the input.
pub fn lll_reduce(basis: &Matrix3<f64>) -> (Matrix3<f64>, Matrix3<i64>) {
    let mut b = *basis;
    let mut m = Matrix3::<i64>::identity();
    let mut k = 1usize;
    let mut iterations = 0usize;

    while k < 3 {
        iterations += 1;
        if iterations > MAX_LLL_ITERATIONS {
            break;
        }

        // size-reduce column k against columns j < k
        for j in (0..k).rev() {
            let (_, mu) = gram_schmidt(&b);
            let q = mu[k][j].round();
            if q != 0.0 {
                let new_b = b.column(k).into_owned() - b.column(j).into_owned() * q;
                b.set_column(k, &new_b);
                let new_m = m.column(k).into_owned() - m.column(j).into_owned() * (q as i64);
                m.set_column(k, &new_m);
            }
        }

        let (gs, mu) = gram_schmidt(&b);
        let lovasz = gs[k].norm_squared()
            >= (DELTA - mu[k][k - 1] * mu[k][k - 1]) * gs[k - 1].norm_squared();
        if lovasz {
            k += 1;
        } else {
            b.swap_columns(k - 1, k);
            m.swap_columns(k - 1, k);
            k = if k > 1 { k - 1 } else { 1 };
        }
    }

    debug_assert_eq!(det_i64(&m).abs(), 1);
    (b, m)
}

// Gram-Schmidt orthogonalization of the columns, returning the orthogonal
// vectors and the projection coefficients mu[i][j] = <b_i, b*_j> / <b*_j, b*_j>.
fn gram_schmidt(b: &Matrix3<f64>) -> ([Vector3<f64>; 3], [[f64; 3]; 3]) {
    let mut gs = [Vector3::zeros(); 3];
    let mut mu = [[0.0f64; 3]; 3];
    for i in 0..3 {
        let mut v: Vector3<f64> = b.column(i).into_owned();
        for j in 0..i {
            let denom = gs[j].norm_squared();
            mu[i][j] = if denom > 0.0 {
                b.column(i).dot(&gs[j]) / denom
            } else {
                0.0
            };
            v -= gs[j] * mu[i][j];
        }
        gs[i] = v;
    }
    (gs, mu)
}

/// Enumerate all unimodular integer matrices with entries in
/// `[-range, range]`, in a fixed (entry-lexicographic) order.
///
/// Both determinant signs are included; callers select the sign they need.
pub fn unimodular_matrices(range: i64) -> Vec<Matrix3<i64>> {
    assert!(range >= 0);
    let width = (2 * range + 1) as u64;
    let total = width.pow(9);
    let mut out = Vec::new();
    for code in 0..total {
        let mut digits = code;
        let mut entries = [0i64; 9];
        for entry in entries.iter_mut() {
            *entry = (digits % width) as i64 - range;
            digits /= width;
        }
        let m = Matrix3::from_row_slice(&entries);
        if det_i64(&m).abs() == 1 {
            out.push(m);
        }
    }
    out
}
