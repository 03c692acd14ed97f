#[cfg(test)]
mod _tests_lattice {
    use super::super::lattice::Lattice;
    use crate::error::MappingError;
    use nalgebra::{Matrix3, Vector3};

    const TOL: f64 = 1e-10;

    // Helper function to create a simple cubic lattice
    fn create_simple_cubic(a: f64) -> Matrix3<f64> {
        Matrix3::new(a, 0.0, 0.0, 0.0, a, 0.0, 0.0, 0.0, a)
    }

    // Helper function to create an FCC lattice
    fn create_fcc(a: f64) -> Matrix3<f64> {
        Matrix3::new(
            0.0,
            a / 2.0,
            a / 2.0,
            a / 2.0,
            0.0,
            a / 2.0,
            a / 2.0,
            a / 2.0,
            0.0,
        )
    }

    #[test]
    fn test_new_simple_cubic() {
        let lattice = Lattice::new(create_simple_cubic(2.0), TOL).unwrap();
        assert!((lattice.volume - 8.0).abs() < TOL);

        let frac = Vector3::new(0.5, 0.25, 0.0);
        let cart = lattice.frac_to_cart(frac);
        assert!((cart - Vector3::new(1.0, 0.5, 0.0)).norm() < TOL);
        assert!((lattice.cart_to_frac(cart) - frac).norm() < TOL);
    }

    #[test]
    fn test_singular_basis_rejected() {
        let singular = Matrix3::new(1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0);
        assert!(matches!(
            Lattice::new(singular, TOL),
            Err(MappingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        assert!(matches!(
            Lattice::new(create_simple_cubic(1.0), -1.0),
            Err(MappingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_inner_voronoi_radius_cubic() {
        // nearest neighbor at distance a, so the inscribed sphere has radius a/2
        let lattice = Lattice::new(create_simple_cubic(2.0), TOL).unwrap();
        assert!((lattice.inner_voronoi_radius() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_inner_voronoi_radius_fcc() {
        // nearest neighbor at a/sqrt(2)
        let a = 4.0;
        let lattice = Lattice::new(create_fcc(a), TOL).unwrap();
        let expected = a / 2.0_f64.sqrt() / 2.0;
        assert!((lattice.inner_voronoi_radius() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_max_voronoi_measure_inside_cell() {
        let lattice = Lattice::new(create_simple_cubic(1.0), TOL).unwrap();
        let (measure, _) = lattice.max_voronoi_measure(&Vector3::new(0.2, 0.1, 0.0));
        assert!(measure < 1.0);
    }

    #[test]
    fn test_voronoi_reduce_wraps_into_cell() {
        let lattice = Lattice::new(create_simple_cubic(1.0), TOL).unwrap();
        let v = Vector3::new(0.7, -0.6, 1.2);
        let reduced = lattice.voronoi_reduce(&v).unwrap();
        let (measure, _) = lattice.max_voronoi_measure(&reduced);
        assert!(measure <= 1.0 + TOL);
        // difference is a lattice translation
        let diff = lattice.cart_to_frac(v - reduced);
        for x in diff.iter() {
            assert!((x - x.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_voronoi_reduce_skewed_basis() {
        // strongly sheared basis: the naive rounding in the input frame is
        // not the minimum image, the Voronoi wrap must still find it
        let basis = Matrix3::new(1.0, 10.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        let lattice = Lattice::new(basis, TOL).unwrap();
        let v = Vector3::new(5.0, 0.4, 0.0);
        let reduced = lattice.voronoi_reduce(&v).unwrap();
        let (measure, _) = lattice.max_voronoi_measure(&reduced);
        assert!(measure <= 1.0 + TOL);
        assert!(reduced.norm() <= v.norm() + TOL);
    }

    #[test]
    fn test_make_superlattice() {
        let lattice = Lattice::new(create_simple_cubic(1.5), TOL).unwrap();
        let t = nalgebra::Matrix3::<i64>::new(2, 0, 0, 0, 1, 0, 0, 0, 1);
        let superlattice = lattice.make_superlattice(&t).unwrap();
        assert!((superlattice.volume - 2.0 * lattice.volume).abs() < TOL);

        let bad = nalgebra::Matrix3::<i64>::new(-1, 0, 0, 0, 1, 0, 0, 0, 1);
        assert!(lattice.make_superlattice(&bad).is_err());
    }
}
