use thiserror::Error;

/// Root error type for all structure-mapping failures.
#[derive(Error, Debug)]
pub enum MappingError {
    /// Invalid query input (bad lattice, count mismatch, bad bounds).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Every perfect matching of the assignment problem includes a
    /// forbidden (infinite-cost) pair.
    #[error("assignment problem is infeasible")]
    InfeasibleAssignment,

    /// The best assignment exceeds the requested cost ceiling.
    #[error("no assignments under the cost bound")]
    NoAssignmentsUnderBound,

    /// Some atom has no allowed site anywhere in the prim, so no
    /// assignment exists for any translation.
    #[error("atom type {0:?} is not allowed on any prim site")]
    AtomRowAllForbidden(String),

    /// A bounded numerical iteration failed to converge (pathological
    /// tolerance settings).
    #[error("numerical tolerance error: {0}")]
    NumericalTolerance(String),
}

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, MappingError>;
