// Optimal linear assignment on a square cost matrix.
//
// Shortest augmenting path with row/column potentials, O(N^3). Entries
// greater than or equal to the `infinity` sentinel mark forbidden pairs;
// the solver is deterministic, breaking cost ties by the lowest column
// index.

use nalgebra::DMatrix;

use crate::error::{MappingError, Result};

/// An optimal assignment: total cost plus `assignment[row] = col`.
#[derive(Debug, Clone)]
pub struct AssignmentSolution {
    pub cost: f64,
    pub assignment: Vec<usize>,
}

/// Solve the linear assignment problem for a square cost matrix.
///
/// Returns `InfeasibleAssignment` when every perfect matching includes a
/// forbidden (>= `infinity`) entry. `tol` classifies equal reduced costs;
/// among ties the lowest column index wins.
pub fn solve_assignment(
    cost_matrix: &DMatrix<f64>,
    infinity: f64,
    tol: f64,
) -> Result<AssignmentSolution> {
    let n = cost_matrix.nrows();
    if n == 0 || cost_matrix.ncols() != n {
        return Err(MappingError::InvalidInput(format!(
            "assignment cost matrix must be square and non-empty, got {}x{}",
            cost_matrix.nrows(),
            cost_matrix.ncols()
        )));
    }

    // keep the working costs finite so potential arithmetic stays well-defined
    let sentinel = if infinity.is_finite() { infinity } else { 1e300 };
    let entry = |row: usize, col: usize| -> f64 {
        let c = cost_matrix[(row, col)];
        if c >= infinity {
            sentinel
        } else {
            c
        }
    };

    // 1-based arrays; column 0 is the virtual start of each augmenting path
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut matched_row = vec![0usize; n + 1]; // matched_row[col] = row, 0 = free
    let mut way = vec![0usize; n + 1];

    for row in 1..=n {
        matched_row[0] = row;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = matched_row[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = entry(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < minv[j] - tol {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta - tol {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[matched_row[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if matched_row[j0] == 0 {
                break;
            }
        }

        // flip the augmenting path
        loop {
            let j1 = way[j0];
            matched_row[j0] = matched_row[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for col in 1..=n {
        assignment[matched_row[col] - 1] = col - 1;
    }

    let mut cost = 0.0;
    for (row, &col) in assignment.iter().enumerate() {
        if cost_matrix[(row, col)] >= infinity {
            return Err(MappingError::InfeasibleAssignment);
        }
        cost += cost_matrix[(row, col)];
    }
    Ok(AssignmentSolution { cost, assignment })
}
