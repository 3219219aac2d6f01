//! `SelectedConstraint` / `ConstraintNormal` (component C).
//!
//! Abstracts the difference between a general constraint (a column of `C`)
//! and a bound (a column of the identity) behind a uniform `n⁺ᵀv` / `Mᵀn⁺`
//! interface, folding the sign convention (§4.2) in at the call site so the
//! rest of the engine never special-cases bounds.

use faer::{ColMut, ColRef, MatRef};

use crate::active_set::ActivationStatus;

/// A `(global index, activation status)` pair with no reference to problem data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedConstraint {
    index: usize,
    status: ActivationStatus,
}

impl SelectedConstraint {
    pub fn new(index: usize, status: ActivationStatus) -> Self {
        Self { index, status }
    }

    pub fn inactive() -> Self {
        Self {
            index: usize::MAX,
            status: ActivationStatus::Inactive,
        }
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn status(self) -> ActivationStatus {
        self.status
    }
}

/// Binds a [`SelectedConstraint`] to the constraint matrix `C`, exposing
/// `nᵀv` and `Mᵀn⁺` with the sign convention folded in.
pub struct ConstraintNormal<'a> {
    c: MatRef<'a, f64>,
    p: usize,
    status: ActivationStatus,
}

impl<'a> ConstraintNormal<'a> {
    pub fn new(c: MatRef<'a, f64>, sc: SelectedConstraint) -> Self {
        Self {
            c,
            p: sc.index(),
            status: sc.status(),
        }
    }

    pub fn index(&self) -> usize {
        self.p
    }

    /// Index of the constraint seen as a bound, i.e. `index() - C.ncols()`.
    pub fn bnd_index(&self) -> usize {
        debug_assert!(self.status.is_bound());
        self.p - self.c.ncols()
    }

    pub fn status(&self) -> ActivationStatus {
        self.status
    }

    /// `nᵀ v`.
    pub fn dot(&self, v: ColRef<'_, f64>) -> f64 {
        match self.status {
            ActivationStatus::Equality | ActivationStatus::Lower => {
                column_dot(self.c, self.p, v)
            }
            ActivationStatus::Upper => -column_dot(self.c, self.p, v),
            ActivationStatus::LowerBound | ActivationStatus::Fixed => v[self.bnd_index()],
            ActivationStatus::UpperBound => -v[self.bnd_index()],
            ActivationStatus::Inactive => unreachable!("dot on an inactive selection"),
        }
    }

    /// `out = Mᵀ · n`.
    pub fn premultiply_by_mt(&self, mut out: ColMut<'_, f64>, m: MatRef<'_, f64>) {
        match self.status {
            ActivationStatus::Equality | ActivationStatus::Lower => {
                for j in 0..m.ncols() {
                    out[j] = column_dot(m, j, self.c.col(self.p));
                }
            }
            ActivationStatus::Upper => {
                for j in 0..m.ncols() {
                    out[j] = -column_dot(m, j, self.c.col(self.p));
                }
            }
            ActivationStatus::LowerBound | ActivationStatus::Fixed => {
                let i = self.bnd_index();
                for j in 0..m.ncols() {
                    out[j] = m[(i, j)];
                }
            }
            ActivationStatus::UpperBound => {
                let i = self.bnd_index();
                for j in 0..m.ncols() {
                    out[j] = -m[(i, j)];
                }
            }
            ActivationStatus::Inactive => unreachable!("premultiply on an inactive selection"),
        }
    }
}

/// `C[:, col]ᵀ v`, summed by explicit index rather than a faer reduction
/// helper so the sign conventions above stay simple to read.
fn column_dot(c: MatRef<'_, f64>, col: usize, v: ColRef<'_, f64>) -> f64 {
    let mut acc = 0.0;
    for i in 0..c.nrows() {
        acc += c[(i, col)] * v[i];
    }
    acc
}
