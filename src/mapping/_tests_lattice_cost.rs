#[cfg(test)]
mod _tests_lattice_cost {
    use super::super::lattice_cost::{
        isotropic_strain_cost, right_stretch, symmetry_breaking_strain_cost,
    };
    use crate::lattice::Lattice;
    use crate::symmetries::lattice_point_group;
    use nalgebra::Matrix3;

    const TOL: f64 = 1e-9;

    fn rotation_z_90() -> Matrix3<f64> {
        Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0)
    }

    fn cubic_rotations() -> Vec<Matrix3<f64>> {
        let lattice = Lattice::new(Matrix3::identity(), 1e-10).unwrap();
        lattice_point_group(&lattice)
            .into_iter()
            .map(|op| op.rotation)
            .collect()
    }

    #[test]
    fn test_right_stretch_of_rotation_is_identity() {
        let u = right_stretch(&rotation_z_90());
        assert!((u - Matrix3::identity()).abs().max() < TOL);
    }

    #[test]
    fn test_identity_has_zero_cost() {
        assert!(isotropic_strain_cost(&Matrix3::identity()) < TOL);
    }

    #[test]
    fn test_uniform_dilation_cost() {
        // 2% dilation: cost = (1/3) * 3 * 0.02^2 = 4e-4
        let f = Matrix3::identity() * 1.02;
        assert!((isotropic_strain_cost(&f) - 4.0e-4).abs() < TOL);
    }

    #[test]
    fn test_cost_invariant_under_rotation() {
        let f = rotation_z_90() * 1.02;
        assert!((isotropic_strain_cost(&f) - 4.0e-4).abs() < TOL);
        let pure_rotation = rotation_z_90();
        assert!(isotropic_strain_cost(&pure_rotation) < TOL);
    }

    #[test]
    fn test_symmetry_breaking_cost_of_volumetric_strain_is_zero() {
        // a uniform dilation preserves cubic symmetry entirely
        let f = Matrix3::identity() * 1.02;
        let cost = symmetry_breaking_strain_cost(&f, &cubic_rotations());
        assert!(cost < TOL);
        assert!(isotropic_strain_cost(&f) > 1e-5);
    }

    #[test]
    fn test_symmetry_breaking_cost_of_uniaxial_strain() {
        // B = diag(0.02, 0, 0); invariant part under the cubic group is
        // (tr B / 3) I; the cost is (1/3) |B - B_inv|^2
        let f = Matrix3::from_diagonal(&nalgebra::Vector3::new(1.02, 1.0, 1.0));
        let e = 0.02 / 3.0;
        let expected = ((0.02 - e) * (0.02 - e) + 2.0 * e * e) / 3.0;
        let cost = symmetry_breaking_strain_cost(&f, &cubic_rotations());
        assert!((cost - expected).abs() < 1e-9);
    }

    #[test]
    fn test_empty_group_treats_all_strain_as_preserving() {
        let f = Matrix3::identity() * 1.05;
        assert!(symmetry_breaking_strain_cost(&f, &[]) < TOL);
    }
}
