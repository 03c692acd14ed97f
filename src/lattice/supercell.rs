// Linear site index <-> (sublattice, unit cell) conversion for supercells.

use std::collections::HashMap;

use nalgebra::{Matrix3, Vector3};

use crate::error::{MappingError, Result};
use crate::lattice::integer::{adjugate_i64, det_i64};

/// Bijection between the linear site index `l` of a supercell and the pair
/// `(sublattice b, unit cell ijk)`, with `l = b * n_unitcells + cell_index`.
///
/// Unit cells inside the supercell are ordered lexicographically by their
/// integer offsets, which fixes the site ordering deterministically.
#[derive(Debug, Clone)]
pub struct SiteIndexConverter {
    transformation: Matrix3<i64>,
    adjugate: Matrix3<i64>,
    det: i64,
    unitcells: Vec<Vector3<i64>>,
    cell_index: HashMap<(i64, i64, i64), usize>,
    n_sublattice: usize,
}

impl SiteIndexConverter {
    /// Build the converter for an integer supercell transformation with
    /// positive determinant and `n_sublattice` basis sites per unit cell.
    pub fn new(transformation: Matrix3<i64>, n_sublattice: usize) -> Result<Self> {
        let det = det_i64(&transformation);
        if det <= 0 {
            return Err(MappingError::InvalidInput(format!(
                "supercell transformation must have positive determinant, got {det}"
            )));
        }
        if n_sublattice == 0 {
            return Err(MappingError::InvalidInput(
                "supercell requires at least one sublattice".to_string(),
            ));
        }
        let adjugate = adjugate_i64(&transformation);

        // Enumerate the unit cells inside the supercell: integer points u
        // with adj(T)*u componentwise in [0, det), scanned over the bounding
        // box of the supercell parallelepiped.
        let mut lo = Vector3::new(0i64, 0, 0);
        let mut hi = Vector3::new(0i64, 0, 0);
        for corner in 0..8u32 {
            let sel = Vector3::new(
                (corner & 1) as i64,
                ((corner >> 1) & 1) as i64,
                ((corner >> 2) & 1) as i64,
            );
            let p = transformation * sel;
            for axis in 0..3 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
        }

        let mut unitcells = Vec::with_capacity(det as usize);
        for i in lo[0]..=hi[0] {
            for j in lo[1]..=hi[1] {
                for k in lo[2]..=hi[2] {
                    let u = Vector3::new(i, j, k);
                    let q = adjugate * u;
                    if (0..3).all(|axis| q[axis] >= 0 && q[axis] < det) {
                        unitcells.push(u);
                    }
                }
            }
        }
        unitcells.sort_by_key(|u| (u[0], u[1], u[2]));
        if unitcells.len() != det as usize {
            return Err(MappingError::InvalidInput(format!(
                "supercell enumeration found {} unit cells, expected {det}",
                unitcells.len()
            )));
        }

        let cell_index = unitcells
            .iter()
            .enumerate()
            .map(|(idx, u)| ((u[0], u[1], u[2]), idx))
            .collect();

        Ok(SiteIndexConverter {
            transformation,
            adjugate,
            det,
            unitcells,
            cell_index,
            n_sublattice,
        })
    }

    pub fn total_sites(&self) -> usize {
        self.n_sublattice * self.det as usize
    }

    pub fn n_unitcells(&self) -> usize {
        self.det as usize
    }

    pub fn n_sublattice(&self) -> usize {
        self.n_sublattice
    }

    /// Wrap an arbitrary unit cell offset into its canonical image inside
    /// the supercell.
    pub fn wrap_unitcell(&self, unitcell: &Vector3<i64>) -> Vector3<i64> {
        let q = self.adjugate * unitcell;
        let r = Vector3::new(
            q[0].rem_euclid(self.det),
            q[1].rem_euclid(self.det),
            q[2].rem_euclid(self.det),
        );
        // T * adj(T) = det * I, so T * r is divisible by det exactly
        let p = self.transformation * r;
        Vector3::new(p[0] / self.det, p[1] / self.det, p[2] / self.det)
    }

    /// Linear site index of `(sublattice, unitcell)`; the cell offset may be
    /// outside the supercell and is wrapped first.
    pub fn linear_index(&self, sublattice: usize, unitcell: &Vector3<i64>) -> usize {
        debug_assert!(sublattice < self.n_sublattice);
        let w = self.wrap_unitcell(unitcell);
        let cell = self.cell_index[&(w[0], w[1], w[2])];
        sublattice * self.n_unitcells() + cell
    }

    /// Sublattice and unit cell of a linear site index.
    pub fn unitcell_coord(&self, linear_index: usize) -> (usize, Vector3<i64>) {
        debug_assert!(linear_index < self.total_sites());
        let n = self.n_unitcells();
        (linear_index / n, self.unitcells[linear_index % n])
    }
}
