#[cfg(test)]
mod _tests_basic_structure {
    use super::super::basic_structure::{is_vacancy, BasicStructure};
    use crate::lattice::Lattice;
    use nalgebra::{Matrix3, Matrix3xX, Vector3};

    const TOL: f64 = 1e-10;

    fn cubic(a: f64) -> Lattice {
        Lattice::new(Matrix3::new(a, 0.0, 0.0, 0.0, a, 0.0, 0.0, 0.0, a), TOL).unwrap()
    }

    #[test]
    fn test_vacancy_labels() {
        assert!(is_vacancy("Va"));
        assert!(is_vacancy("VA"));
        assert!(is_vacancy("va"));
        assert!(!is_vacancy("V"));
        assert!(!is_vacancy("Zr"));
    }

    #[test]
    fn test_from_fractional() {
        let frac = Matrix3xX::from_columns(&[Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.0)]);
        let prim = BasicStructure::from_fractional(
            cubic(2.0),
            frac,
            vec![vec!["A".to_string()], vec!["A".to_string(), "Va".to_string()]],
        )
        .unwrap();
        assert_eq!(prim.n_site(), 2);
        let cart = prim.site_coordinate_cart.column(1);
        assert!((Vector3::new(1.0, 1.0, 0.0) - cart).norm() < TOL);
        assert!(prim.max_possible_vacancies());
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let frac = Matrix3xX::from_columns(&[Vector3::new(0.0, 0.0, 0.0)]);
        assert!(BasicStructure::from_fractional(
            cubic(1.0),
            frac,
            vec![vec!["A".to_string()], vec!["B".to_string()]],
        )
        .is_err());
    }

    #[test]
    fn test_empty_occupant_list_rejected() {
        let frac = Matrix3xX::from_columns(&[Vector3::new(0.0, 0.0, 0.0)]);
        assert!(BasicStructure::from_fractional(cubic(1.0), frac, vec![vec![]]).is_err());
    }
}
