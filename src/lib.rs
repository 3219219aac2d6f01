//! A dense convex quadratic-programming engine built around the
//! Goldfarb–Idnani dual active-set method: minimizes `0.5 xᵀGx + aᵀx`
//! subject to `bl ≤ Cᵀx ≤ bu` and `xl ≤ x ≤ xu`, for strictly
//! positive-definite `G`.
//!
//! The public surface is [`GIEngine`]: preallocate with
//! [`GIEngine::new_engine`], configure with [`GIEngine::set_options`], and
//! call [`GIEngine::solve`] once per problem instance, reusing the same
//! engine (and its internal workspaces) across instances of matching
//! dimensions. [`GIEngine::reset_active_set`] clears any warm-start memory.

pub mod active_set;
pub mod constraint;
pub mod driver;
pub mod engine;
pub mod error;
pub mod linalg;
pub mod log;
pub mod options;
pub mod workspace;

#[cfg(test)]
mod tests;

pub use active_set::ActivationStatus;
pub use driver::TerminationStatus;
pub use engine::GIEngine;
pub use error::SolverError;
pub use log::LogFlags;
pub use options::{GFactorization, SolverOptions};
