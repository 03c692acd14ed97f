// Integer 3x3 matrix helpers used by the HNF and supercell machinery.
//
// nalgebra's determinant/inverse require a field scalar, so the few exact
// integer operations needed here are written out explicitly.

use nalgebra::{Matrix3, Vector3};

/// Determinant of an integer matrix, computed exactly.
pub fn det_i64(m: &Matrix3<i64>) -> i64 {
    m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
        - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
        + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
}

/// Adjugate (transposed cofactor matrix), satisfying `adj(M) * M = det(M) * I`.
pub fn adjugate_i64(m: &Matrix3<i64>) -> Matrix3<i64> {
    let (a, b, c) = (m[(0, 0)], m[(0, 1)], m[(0, 2)]);
    let (d, e, f) = (m[(1, 0)], m[(1, 1)], m[(1, 2)]);
    let (g, h, i) = (m[(2, 0)], m[(2, 1)], m[(2, 2)]);
    Matrix3::new(
        e * i - f * h,
        c * h - b * i,
        b * f - c * e,
        f * g - d * i,
        a * i - c * g,
        c * d - a * f,
        d * h - e * g,
        b * g - a * h,
        a * e - b * d,
    )
}

/// True iff `|det(M)| == 1`.
pub fn is_unimodular(m: &Matrix3<i64>) -> bool {
    det_i64(m).abs() == 1
}

/// Round each entry to the nearest integer.
pub fn lround(m: &Matrix3<f64>) -> Matrix3<i64> {
    m.map(|x| x.round() as i64)
}

/// True iff every entry of `m` is integer to within `tol`.
pub fn is_integer_matrix(m: &Matrix3<f64>, tol: f64) -> bool {
    m.iter().all(|x| (x - x.round()).abs() < tol)
}

/// True iff every component of `v` is integer to within `tol`.
pub fn is_integer_vector(v: &Vector3<f64>, tol: f64) -> bool {
    v.iter().all(|x| (x - x.round()).abs() < tol)
}

/// Convert an integer matrix to floating point.
pub fn to_f64(m: &Matrix3<i64>) -> Matrix3<f64> {
    m.map(|x| x as f64)
}
