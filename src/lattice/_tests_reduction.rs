#[cfg(test)]
mod _tests_reduction {
    use super::super::integer::{det_i64, is_unimodular, to_f64};
    use super::super::reduction::{lll_reduce, unimodular_matrices};
    use nalgebra::Matrix3;

    #[test]
    fn test_lll_reduce_identity_is_fixed() {
        let identity = Matrix3::identity();
        let (reduced, transform) = lll_reduce(&identity);
        assert!((reduced - identity).norm() < 1e-12);
        assert_eq!(transform, Matrix3::<i64>::identity());
    }

    #[test]
    fn test_lll_reduce_skewed_basis() {
        // columns (1,0,0), (4,1,0), (0,0,1)
        let basis = Matrix3::new(1.0, 4.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        let (reduced, transform) = lll_reduce(&basis);

        // transform is unimodular and reproduces the reduced basis
        assert!(is_unimodular(&transform));
        assert!((basis * to_f64(&transform) - reduced).norm() < 1e-12);

        // the reduced column lengths do not exceed the input's longest column
        let max_in = (0..3).map(|i| basis.column(i).norm()).fold(0.0, f64::max);
        for i in 0..3 {
            assert!(reduced.column(i).norm() <= max_in + 1e-12);
        }
        // the long skewed column has been shortened
        let max_out = (0..3).map(|i| reduced.column(i).norm()).fold(0.0, f64::max);
        assert!(max_out < max_in);
    }

    #[test]
    fn test_lll_preserves_volume() {
        let basis = Matrix3::new(2.0, 7.0, 1.0, 0.0, 1.0, 5.0, 0.0, 0.0, 3.0);
        let (reduced, transform) = lll_reduce(&basis);
        assert!((reduced.determinant().abs() - basis.determinant().abs()).abs() < 1e-9);
        assert_eq!(det_i64(&transform).abs(), 1);
    }

    #[test]
    fn test_unimodular_matrices_range_one() {
        let all = unimodular_matrices(1);
        assert!(!all.is_empty());
        assert!(all.iter().all(|m| det_i64(m).abs() == 1));
        assert!(all.contains(&Matrix3::<i64>::identity()));
        // both determinant signs occur
        assert!(all.iter().any(|m| det_i64(m) == 1));
        assert!(all.iter().any(|m| det_i64(m) == -1));
    }

    #[test]
    fn test_unimodular_matrices_deterministic_order() {
        let first = unimodular_matrices(1);
        let second = unimodular_matrices(1);
        assert_eq!(first, second);
    }
}
