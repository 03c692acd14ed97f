// k-best assignment enumeration by Murty partitioning.
//
// Each heap node is a subproblem constrained by forced and forbidden
// (row, col) pairs; popping the best node emits its optimal assignment and
// partitions it, in row-index order, into child subproblems whose solution
// sets are disjoint. Emitted costs are therefore monotone non-decreasing
// and free of duplicates.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use nalgebra::DMatrix;

use crate::error::{MappingError, Result};
use crate::mapping::hungarian::solve_assignment;

#[derive(Debug, Clone)]
struct Node {
    cost: f64,
    assignment: Vec<usize>,
    forced: Vec<(usize, usize)>,
    forbidden: Vec<(usize, usize)>,
    seq: usize,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Enumerates assignments of a square cost matrix in ascending cost order,
/// up to a caller-supplied ceiling.
pub struct AssignmentEnumerator {
    cost_matrix: DMatrix<f64>,
    infinity: f64,
    max_cost: f64,
    tol: f64,
    heap: BinaryHeap<Reverse<Node>>,
    next_seq: usize,
}

impl AssignmentEnumerator {
    /// Solve the root subproblem and prepare enumeration.
    ///
    /// Fails with `NoAssignmentsUnderBound` when no finite-cost assignment
    /// exists or the best one already exceeds `max_cost`.
    pub fn new(cost_matrix: DMatrix<f64>, infinity: f64, max_cost: f64, tol: f64) -> Result<Self> {
        let mut enumerator = AssignmentEnumerator {
            cost_matrix,
            infinity,
            max_cost,
            tol,
            heap: BinaryHeap::new(),
            next_seq: 0,
        };
        match enumerator.solve_subproblem(Vec::new(), Vec::new()) {
            Some(root) if root.cost <= max_cost + tol => {
                enumerator.heap.push(Reverse(root));
                Ok(enumerator)
            }
            _ => Err(MappingError::NoAssignmentsUnderBound),
        }
    }

    /// The next-cheapest assignment, or `None` when the enumeration is
    /// exhausted (including by the cost ceiling).
    pub fn next_assignment(&mut self) -> Option<(f64, Vec<usize>)> {
        let Reverse(node) = self.heap.pop()?;

        // partition: child i forbids the i-th free row's pair and forces all
        // earlier free rows to their popped pairs
        let mut forced_prefix = node.forced.clone();
        for row in 0..self.cost_matrix.nrows() {
            if node.forced.iter().any(|&(r, _)| r == row) {
                continue;
            }
            let pair = (row, node.assignment[row]);
            let mut forbidden = node.forbidden.clone();
            forbidden.push(pair);
            if let Some(child) = self.solve_subproblem(forced_prefix.clone(), forbidden) {
                if child.cost <= self.max_cost + self.tol {
                    self.heap.push(Reverse(child));
                }
            }
            forced_prefix.push(pair);
        }

        Some((node.cost, node.assignment))
    }

    fn solve_subproblem(
        &mut self,
        forced: Vec<(usize, usize)>,
        forbidden: Vec<(usize, usize)>,
    ) -> Option<Node> {
        let mut restricted = self.cost_matrix.clone();
        for &(row, col) in &forbidden {
            restricted[(row, col)] = self.infinity;
        }
        // a forced pair leaves its cell as the row's only finite entry
        for &(row, col) in &forced {
            for other in 0..restricted.ncols() {
                if other != col {
                    restricted[(row, other)] = self.infinity;
                }
            }
        }
        let solution = solve_assignment(&restricted, self.infinity, self.tol).ok()?;
        let node = Node {
            cost: solution.cost,
            assignment: solution.assignment,
            forced,
            forbidden,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        Some(node)
    }
}

/// Convenience wrapper: the `k` cheapest assignments under `max_cost`.
pub fn k_best_assignments(
    cost_matrix: &DMatrix<f64>,
    infinity: f64,
    max_cost: f64,
    tol: f64,
    k: usize,
) -> Result<Vec<(f64, Vec<usize>)>> {
    let mut enumerator = AssignmentEnumerator::new(cost_matrix.clone(), infinity, max_cost, tol)?;
    let mut out = Vec::new();
    while out.len() < k {
        match enumerator.next_assignment() {
            Some(emission) => out.push(emission),
            None => break,
        }
    }
    Ok(out)
}
