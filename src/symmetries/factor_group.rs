// Factor-group generation for a reference crystal.
//
// The lattice point group is found by a bounded search over integer
// transformation matrices of the LLL-reduced basis; factor-group
// translations are then found by matching the image of the first basis
// site onto each compatible site.

use nalgebra::{Matrix3, Vector3};

use crate::lattice::{is_integer_vector, to_f64, unimodular_matrices, Lattice};
use crate::structure::BasicStructure;
use crate::symmetries::symmetry_operations::SymOp;

/// Point group of a lattice: all orthogonal operations mapping the lattice
/// onto itself.
///
/// Candidates come from unimodular integer matrices with entries in
/// `[-1, 1]` acting on the LLL-reduced basis, which covers every point
/// operation of a reduced cell. The result is sorted deterministically.
pub fn lattice_point_group(lattice: &Lattice) -> Vec<SymOp> {
    let reduced = lattice.reduced_basis();
    let reduced_inverse = reduced
        .try_inverse()
        .expect("reduced basis of a valid lattice must be invertible");
    let tol = lattice.tol;

    let mut ops = Vec::new();
    for m in unimodular_matrices(1) {
        let candidate = reduced * to_f64(&m) * reduced_inverse;
        let residual = (candidate.transpose() * candidate - Matrix3::identity())
            .abs()
            .max();
        if residual < tol {
            ops.push(SymOp::new(candidate, Vector3::zeros()));
        }
    }
    sort_operations(&mut ops);
    ops
}

/// Factor group of a crystal: all operations `(R, t)` with `R` in the
/// lattice point group and `t` a translation mapping the basis (sites and
/// their allowed occupants) onto itself. Translations are reduced into the
/// unit cell; the result is sorted deterministically with the identity
/// first.
pub fn make_factor_group(prim: &BasicStructure) -> Vec<SymOp> {
    let lattice = &prim.lattice;
    let n_site = prim.n_site();
    let site_0: Vector3<f64> = prim.site_coordinate_cart.column(0).into_owned();

    let mut ops: Vec<SymOp> = Vec::new();
    for point_op in lattice_point_group(lattice) {
        for b in 0..n_site {
            if !same_occupants(&prim.allowed_occupants[0], &prim.allowed_occupants[b]) {
                continue;
            }
            let site_b: Vector3<f64> = prim.site_coordinate_cart.column(b).into_owned();
            let raw = site_b - point_op.rotation * site_0;
            let frac = lattice.cart_to_frac(raw).map(|x| x - x.floor());
            let candidate = SymOp::new(point_op.rotation, lattice.frac_to_cart(frac));
            if site_permutation(&candidate, prim).is_none() {
                continue;
            }
            if !ops
                .iter()
                .any(|existing| same_operation(existing, &candidate, lattice))
            {
                ops.push(candidate);
            }
        }
    }
    sort_operations(&mut ops);
    ops
}

/// The permutation of basis sites induced by `op`: `perm[i] = j` when `op`
/// maps site `i` onto site `j` modulo lattice translations. `None` when the
/// operation does not map the basis onto itself.
pub fn site_permutation(op: &SymOp, prim: &BasicStructure) -> Option<Vec<usize>> {
    let lattice = &prim.lattice;
    let tol = lattice.tol;
    let n_site = prim.n_site();
    let mut perm = Vec::with_capacity(n_site);
    for i in 0..n_site {
        let image = op.apply(prim.site_coordinate_cart.column(i).into_owned());
        let mut found = None;
        for j in 0..n_site {
            if !same_occupants(&prim.allowed_occupants[i], &prim.allowed_occupants[j]) {
                continue;
            }
            let site_j: Vector3<f64> = prim.site_coordinate_cart.column(j).into_owned();
            if is_integer_vector(&lattice.cart_to_frac(image - site_j), tol) {
                found = Some(j);
                break;
            }
        }
        perm.push(found?);
    }
    // must be a bijection
    let mut seen = vec![false; n_site];
    for &j in &perm {
        if seen[j] {
            return None;
        }
        seen[j] = true;
    }
    Some(perm)
}

fn same_occupants(a: &[String], b: &[String]) -> bool {
    let mut left: Vec<&String> = a.iter().collect();
    let mut right: Vec<&String> = b.iter().collect();
    left.sort();
    right.sort();
    left == right
}

fn same_operation(a: &SymOp, b: &SymOp, lattice: &Lattice) -> bool {
    (a.rotation - b.rotation).abs().max() < lattice.tol
        && is_integer_vector(
            &lattice.cart_to_frac(a.translation - b.translation),
            lattice.tol,
        )
}

// Deterministic ordering: identity first, then by rounded matrix entries
// and translation components.
fn sort_operations(ops: &mut [SymOp]) {
    ops.sort_by_key(|op| {
        let mut key = [0i64; 13];
        key[0] = i64::from(!op.is_identity(1e-8));
        for (slot, x) in key[1..10].iter_mut().zip(op.rotation.iter()) {
            *slot = (x * 1e6).round() as i64;
        }
        for (slot, x) in key[10..13].iter_mut().zip(op.translation.iter()) {
            *slot = (x * 1e6).round() as i64;
        }
        key
    });
}
