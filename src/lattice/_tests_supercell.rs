#[cfg(test)]
mod _tests_supercell {
    use super::super::supercell::SiteIndexConverter;
    use nalgebra::{Matrix3, Vector3};

    #[test]
    fn test_diagonal_supercell_counts() {
        let t = Matrix3::<i64>::new(2, 0, 0, 0, 3, 0, 0, 0, 1);
        let converter = SiteIndexConverter::new(t, 2).unwrap();
        assert_eq!(converter.n_unitcells(), 6);
        assert_eq!(converter.total_sites(), 12);
    }

    #[test]
    fn test_round_trip_all_sites() {
        let t = Matrix3::<i64>::new(2, 1, 0, 0, 2, 0, 1, 0, 2);
        let converter = SiteIndexConverter::new(t, 3).unwrap();
        for l in 0..converter.total_sites() {
            let (b, ijk) = converter.unitcell_coord(l);
            assert_eq!(converter.linear_index(b, &ijk), l);
        }
    }

    #[test]
    fn test_wrap_is_periodic_under_supercell_translations() {
        let t = Matrix3::<i64>::new(2, 0, 0, 0, 2, 0, 0, 0, 2);
        let converter = SiteIndexConverter::new(t, 1).unwrap();
        let cell = Vector3::new(1i64, 0, 1);
        for n in [
            Vector3::new(1i64, 0, 0),
            Vector3::new(0i64, -1, 0),
            Vector3::new(2i64, 1, -1),
        ] {
            let shifted = cell + t * n;
            assert_eq!(
                converter.linear_index(0, &cell),
                converter.linear_index(0, &shifted)
            );
        }
    }

    #[test]
    fn test_non_positive_determinant_rejected() {
        let t = Matrix3::<i64>::new(1, 0, 0, 0, -1, 0, 0, 0, 1);
        assert!(SiteIndexConverter::new(t, 1).is_err());
    }
}
