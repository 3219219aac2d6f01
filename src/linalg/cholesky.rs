//! Dense in-place Cholesky and the triangular solves built on top of it.
//!
//! This is the dense counterpart of the sparse Cholesky factorizations
//! elsewhere in this crate family: rather than going through a symbolic
//! analysis / fill-reducing permutation, `G` is small and dense, so the
//! factor is computed directly over its storage, column by column.
//!
//! ## Example
//! ```
//! use faer::Mat;
//! use gi_qp::linalg::cholesky::cholesky_in_place;
//!
//! let mut g = Mat::from_fn(2, 2, |i, j| if i == j { 4.0 } else { -2.0 });
//! cholesky_in_place(g.as_mut()).unwrap();
//! // g's lower triangle now holds L, with L * L^T == the original G.
//! ```

use faer::{MatMut, MatRef};
use problemo::Problem;

use crate::error::SolverError;

/// Factors the lower triangle of `g` in place as `L`, with `L Lᵀ = G`.
/// The strict upper triangle is left untouched by the caller's convention
/// (mirroring Eigen's `llt_inplace`): only the lower triangle is meaningful
/// afterwards.
pub fn cholesky_in_place(mut g: MatMut<'_, f64>) -> Result<(), Problem> {
    let n = g.nrows();
    debug_assert_eq!(n, g.ncols());

    for j in 0..n {
        let mut diag = g[(j, j)];
        for k in 0..j {
            diag -= g[(j, k)] * g[(j, k)];
        }
        if diag <= 0.0 {
            return Err(SolverError::NotPositiveDefinite.into());
        }
        let ljj = diag.sqrt();
        g[(j, j)] = ljj;

        for i in (j + 1)..n {
            let mut s = g[(i, j)];
            for k in 0..j {
                s -= g[(i, k)] * g[(j, k)];
            }
            g[(i, j)] = s / ljj;
        }
    }

    Ok(())
}

/// Solves `L X = X` in place by forward substitution, `L` lower triangular.
pub fn solve_lower_in_place(l: MatRef<'_, f64>, mut x: MatMut<'_, f64>) {
    let n = l.nrows();
    debug_assert_eq!(n, l.ncols());
    debug_assert_eq!(n, x.nrows());

    for col in 0..x.ncols() {
        for i in 0..n {
            let mut s = x[(i, col)];
            for k in 0..i {
                s -= l[(i, k)] * x[(k, col)];
            }
            x[(i, col)] = s / l[(i, i)];
        }
    }
}

/// Solves `Lᵀ X = X` in place by backward substitution, `L` lower triangular.
pub fn solve_lower_transpose_in_place(l: MatRef<'_, f64>, mut x: MatMut<'_, f64>) {
    let n = l.nrows();
    debug_assert_eq!(n, l.ncols());
    debug_assert_eq!(n, x.nrows());

    for col in 0..x.ncols() {
        for i in (0..n).rev() {
            let mut s = x[(i, col)];
            for k in (i + 1)..n {
                s -= l[(k, i)] * x[(k, col)];
            }
            x[(i, col)] = s / l[(i, i)];
        }
    }
}

/// Builds `j = L⁻ᵀ` by solving `Lᵀ J = I` in place over `j` (which must
/// already hold the identity).
pub fn invert_lower_transpose_into(l: MatRef<'_, f64>, j: MatMut<'_, f64>) {
    solve_lower_transpose_in_place(l, j);
}
