// Hermite Normal Form of integer matrices.
//
// The column-style HNF is the canonical representative of the column lattice
// of an integer matrix: two matrices span the same set of integer column
// combinations iff their HNFs are equal. The form used here is lower
// triangular with positive diagonal and, in each row, entries left of the
// diagonal reduced into [0, diagonal).

use nalgebra::Matrix3;

use crate::lattice::integer::det_i64;

/// Column-style Hermite Normal Form of a non-singular integer matrix.
///
/// `hnf(M) = M * U` for some unimodular `U`; the result is invariant under
/// right-multiplication of `M` by any unimodular matrix.
pub fn hnf(m: &Matrix3<i64>) -> Matrix3<i64> {
    debug_assert_ne!(det_i64(m), 0);
    let mut h = *m;
    for r in 0..3 {
        // column Euclid: zero the entries right of the pivot in row r
        loop {
            if (r + 1..3).all(|c| h[(r, c)] == 0) {
                break;
            }
            let mut pivot = r;
            let mut best = i64::MAX;
            for c in r..3 {
                let a = h[(r, c)].abs();
                if a != 0 && a < best {
                    best = a;
                    pivot = c;
                }
            }
            if pivot != r {
                h.swap_columns(r, pivot);
            }
            let p = h[(r, r)];
            for c in r + 1..3 {
                let q = h[(r, c)].div_euclid(p);
                if q != 0 {
                    let new_c = h.column(c).into_owned() - h.column(r).into_owned() * q;
                    h.set_column(c, &new_c);
                }
            }
        }
        if h[(r, r)] < 0 {
            let neg = -h.column(r).into_owned();
            h.set_column(r, &neg);
        }
        // reduce entries left of the diagonal into [0, diagonal)
        let p = h[(r, r)];
        for c in 0..r {
            let q = h[(r, c)].div_euclid(p);
            if q != 0 {
                let new_c = h.column(c).into_owned() - h.column(r).into_owned() * q;
                h.set_column(c, &new_c);
            }
        }
    }
    h
}

/// Enumerate all HNF matrices of the given (positive) determinant, in a
/// fixed lexicographic order of the diagonal and then the sub-diagonal
/// entries.
///
/// Every distinct index-`determinant` sublattice of the integer lattice is
/// represented exactly once.
pub fn hnf_matrices(determinant: i64) -> Vec<Matrix3<i64>> {
    let mut out = Vec::new();
    if determinant <= 0 {
        return out;
    }
    for a in divisors(determinant) {
        for c in divisors(determinant / a) {
            let f = determinant / (a * c);
            for b in 0..c {
                for d in 0..f {
                    for e in 0..f {
                        out.push(Matrix3::new(a, 0, 0, b, c, 0, d, e, f));
                    }
                }
            }
        }
    }
    out
}

fn divisors(n: i64) -> Vec<i64> {
    (1..=n).filter(|d| n % d == 0).collect()
}

/// Flatten an integer matrix row-major, for lexicographic comparisons.
pub fn flatten(m: &Matrix3<i64>) -> [i64; 9] {
    [
        m[(0, 0)],
        m[(0, 1)],
        m[(0, 2)],
        m[(1, 0)],
        m[(1, 1)],
        m[(1, 2)],
        m[(2, 0)],
        m[(2, 1)],
        m[(2, 2)],
    ]
}
