#[cfg(test)]
mod _tests_lattice_mapping {
    use super::super::lattice_mapping::{map_lattices, LatticeMapping, LatticeMappingOptions};
    use crate::lattice::{to_f64, Lattice};
    use nalgebra::{Matrix3, Vector3};

    const TOL: f64 = 1e-10;

    fn cubic(a: f64) -> Lattice {
        Lattice::new(Matrix3::new(a, 0.0, 0.0, 0.0, a, 0.0, 0.0, 0.0, a), TOL).unwrap()
    }

    // F * L1 * T * N must reproduce the child basis
    fn assert_reconstructs(mapping: &LatticeMapping, prim: &Lattice, child: &Lattice) {
        let reconstructed = mapping.deformation_gradient
            * prim.direct
            * to_f64(&mapping.transformation_matrix_to_super)
            * to_f64(&mapping.reorientation);
        assert!(
            (reconstructed - child.direct).abs().max() < 1e-9,
            "F L1 T N != L2"
        );
    }

    #[test]
    fn test_validation_rejects_bad_matrices() {
        let negative_det = Matrix3::<i64>::new(-1, 0, 0, 0, 1, 0, 0, 0, 1);
        assert!(
            LatticeMapping::new(Matrix3::identity(), negative_det, Matrix3::identity()).is_err()
        );
        let non_unimodular = Matrix3::<i64>::new(2, 0, 0, 0, 1, 0, 0, 0, 1);
        assert!(
            LatticeMapping::new(Matrix3::identity(), Matrix3::identity(), non_unimodular).is_err()
        );
    }

    #[test]
    fn test_identity_mapping() {
        let prim = cubic(2.0);
        let child = cubic(2.0);
        let results = map_lattices(&prim, &child, &LatticeMappingOptions::default()).unwrap();
        assert_eq!(results.data.len(), 1);
        let best = &results.data[0];
        assert!(best.lattice_cost < 1e-12);
        assert_eq!(
            best.lattice_mapping.transformation_matrix_to_super,
            Matrix3::<i64>::identity()
        );
        assert_eq!(best.lattice_mapping.reorientation, Matrix3::<i64>::identity());
        assert!(
            (best.lattice_mapping.deformation_gradient - Matrix3::identity())
                .abs()
                .max()
                < 1e-9
        );
    }

    #[test]
    fn test_uniform_dilation() {
        let prim = cubic(2.0);
        let child = cubic(2.0 * 1.02);
        let results = map_lattices(&prim, &child, &LatticeMappingOptions::default()).unwrap();
        assert_eq!(results.data.len(), 1);
        let best = &results.data[0];
        assert!((best.lattice_cost - 4.0e-4).abs() < 1e-8);
        assert!(
            (best.lattice_mapping.deformation_gradient - Matrix3::identity() * 1.02)
                .abs()
                .max()
                < 1e-9
        );
        assert_reconstructs(&best.lattice_mapping, &prim, &child);
    }

    #[test]
    fn test_rotated_child_maps_with_zero_cost() {
        let prim = cubic(3.0);
        let rotation = Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let child = Lattice::new(rotation * prim.direct, TOL).unwrap();
        let results = map_lattices(&prim, &child, &LatticeMappingOptions::default()).unwrap();
        assert_eq!(results.data.len(), 1);
        let best = &results.data[0];
        assert!(best.lattice_cost < 1e-12);
        // deformation is a pure isometry
        let f = best.lattice_mapping.deformation_gradient;
        assert!((f.transpose() * f - Matrix3::identity()).abs().max() < 1e-9);
        assert_reconstructs(&best.lattice_mapping, &prim, &child);
    }

    #[test]
    fn test_volume_two_orbits() {
        // 7 index-2 sublattices of a cubic lattice fall into 3 orbits under
        // the cubic point group (axial, face, body)
        let prim = cubic(1.0);
        let child = Lattice::new(
            Matrix3::from_diagonal(&Vector3::new(2.0, 1.0, 1.0)),
            TOL,
        )
        .unwrap();
        let options = LatticeMappingOptions {
            min_vol: 2,
            max_vol: 2,
            ..Default::default()
        };
        let results = map_lattices(&prim, &child, &options).unwrap();
        assert_eq!(results.data.len(), 3);
        // costs ascend and exactly the axial orbit matches the child's shape
        let costs: Vec<f64> = results.data.iter().map(|r| r.lattice_cost).collect();
        assert!(costs.windows(2).all(|w| w[0] <= w[1] + 1e-12));
        assert_eq!(costs.iter().filter(|c| **c < 1e-9).count(), 1);
        for scored in &results.data {
            assert_reconstructs(&scored.lattice_mapping, &prim, &child);
        }
    }

    #[test]
    fn test_k_best_truncation() {
        let prim = cubic(1.0);
        let child = Lattice::new(
            Matrix3::from_diagonal(&Vector3::new(2.0, 1.0, 1.0)),
            TOL,
        )
        .unwrap();
        let options = LatticeMappingOptions {
            min_vol: 2,
            max_vol: 2,
            k_best: Some(1),
            ..Default::default()
        };
        let results = map_lattices(&prim, &child, &options).unwrap();
        assert_eq!(results.data.len(), 1);
        assert!(results.data[0].lattice_cost < 1e-9);
    }

    #[test]
    fn test_max_cost_ceiling() {
        let prim = cubic(1.0);
        let child = Lattice::new(
            Matrix3::from_diagonal(&Vector3::new(2.0, 1.0, 1.0)),
            TOL,
        )
        .unwrap();
        let options = LatticeMappingOptions {
            min_vol: 2,
            max_vol: 2,
            max_cost: 1e-6,
            ..Default::default()
        };
        let results = map_lattices(&prim, &child, &options).unwrap();
        assert_eq!(results.data.len(), 1);
    }

    #[test]
    fn test_invalid_volume_range() {
        let prim = cubic(1.0);
        let child = cubic(1.0);
        let options = LatticeMappingOptions {
            min_vol: 2,
            max_vol: 1,
            ..Default::default()
        };
        assert!(map_lattices(&prim, &child, &options).is_err());
    }

    #[test]
    fn test_isometry_and_stretch_factorize_deformation() {
        let prim = cubic(2.0);
        let child = cubic(2.0 * 1.02);
        let results = map_lattices(&prim, &child, &LatticeMappingOptions::default()).unwrap();
        let mapping = &results.data[0].lattice_mapping;
        let reassembled = mapping.isometry() * mapping.right_stretch();
        assert!((reassembled - mapping.deformation_gradient).abs().max() < 1e-9);
    }
}
