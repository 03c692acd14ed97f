#[cfg(test)]
mod _tests_murty {
    use super::super::murty::{k_best_assignments, AssignmentEnumerator};
    use crate::error::MappingError;
    use nalgebra::DMatrix;

    const INF: f64 = 1e20;
    const TOL: f64 = 1e-9;

    fn example_matrix() -> DMatrix<f64> {
        DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 3.0, 6.0, 9.0])
    }

    #[test]
    fn test_enumerates_all_assignments_in_order() {
        // the six permutation costs of the example matrix, sorted
        let expected = [10.0, 11.0, 11.0, 13.0, 13.0, 14.0];
        let emissions =
            k_best_assignments(&example_matrix(), INF, f64::INFINITY, TOL, 10).unwrap();
        assert_eq!(emissions.len(), 6);
        for (emission, expected_cost) in emissions.iter().zip(expected) {
            assert!((emission.0 - expected_cost).abs() < TOL);
        }
    }

    #[test]
    fn test_emissions_are_pairwise_distinct() {
        let emissions =
            k_best_assignments(&example_matrix(), INF, f64::INFINITY, TOL, 10).unwrap();
        for (i, a) in emissions.iter().enumerate() {
            for b in emissions.iter().skip(i + 1) {
                assert_ne!(a.1, b.1);
            }
        }
    }

    #[test]
    fn test_k_limits_emissions() {
        let emissions = k_best_assignments(&example_matrix(), INF, f64::INFINITY, TOL, 3).unwrap();
        assert_eq!(emissions.len(), 3);
        assert!((emissions[0].0 - 10.0).abs() < TOL);
    }

    #[test]
    fn test_max_cost_ceiling_stops_enumeration() {
        let emissions = k_best_assignments(&example_matrix(), INF, 11.5, TOL, 10).unwrap();
        assert_eq!(emissions.len(), 3);
        assert!(emissions.iter().all(|(cost, _)| *cost <= 11.5 + TOL));
    }

    #[test]
    fn test_infeasible_root() {
        let cost = DMatrix::from_row_slice(2, 2, &[INF, INF, 0.0, 0.0]);
        assert!(matches!(
            AssignmentEnumerator::new(cost, INF, f64::INFINITY, TOL),
            Err(MappingError::NoAssignmentsUnderBound)
        ));
    }

    #[test]
    fn test_root_over_ceiling() {
        let cost = DMatrix::from_row_slice(1, 1, &[5.0]);
        assert!(matches!(
            AssignmentEnumerator::new(cost, INF, 1.0, TOL),
            Err(MappingError::NoAssignmentsUnderBound)
        ));
    }

    #[test]
    fn test_monotone_with_forbidden_entries() {
        let cost = DMatrix::from_row_slice(3, 3, &[0.1, INF, 5.0, INF, 0.2, 4.0, 3.0, 2.0, 0.3]);
        let emissions = k_best_assignments(&cost, INF, f64::INFINITY, TOL, 10).unwrap();
        assert!(!emissions.is_empty());
        for window in emissions.windows(2) {
            assert!(window[0].0 <= window[1].0 + TOL);
        }
        // no emission uses a forbidden cell
        for (_, assignment) in &emissions {
            for (row, &col) in assignment.iter().enumerate() {
                assert!(cost[(row, col)] < INF);
            }
        }
    }
}
