//! Internal failure modes of the dense linear-algebra kernels.
//!
//! These are distinct from [`crate::TerminationStatus`]: they are raised by
//! low-level routines (in-place Cholesky, triangular solves) and are folded
//! into a termination code by [`crate::engine::GIEngine::init`] before ever
//! reaching a caller. No public function returns [`SolverError`] directly.

use derive_more::{Display, Error};

#[derive(Debug, Display, Error, PartialEq, Eq, Clone, Copy)]
pub enum SolverError {
    #[display("matrix is not numerically positive definite")]
    NotPositiveDefinite,

    #[display("dimension mismatch between G, a, C, and the bounds")]
    DimensionMismatch,

    #[display("lower bound exceeds upper bound")]
    InconsistentBounds,

    #[display("reconciled active set exceeds the number of variables")]
    Overconstrained,
}
