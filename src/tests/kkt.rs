//! KKT-residual checker, the test-only collaborator behind the property
//! checks of §8.1: stationarity, primal feasibility, and complementarity
//! with multiplier sign. Not part of the public API — callers of
//! [`crate::GIEngine`] never see this module.

use faer::{ColRef, MatRef};

use crate::active_set::ActivationStatus;

/// `‖G x + a + C u_general + u_bound‖∞`, normalized per §8.1 against `‖u‖∞`.
pub fn stationarity_residual(
    g: MatRef<'_, f64>,
    a: ColRef<'_, f64>,
    c: MatRef<'_, f64>,
    x: ColRef<'_, f64>,
    multipliers: &[f64],
    m: usize,
) -> f64 {
    let n = g.nrows();
    let mut r = vec![0.0; n];
    for i in 0..n {
        let mut acc = a[i];
        for j in 0..n {
            acc += g[(i, j)] * x[j];
        }
        r[i] = acc;
    }
    for p in 0..m {
        let u = multipliers[p];
        if u != 0.0 {
            for i in 0..n {
                r[i] += u * c[(i, p)];
            }
        }
    }
    for (i, &u) in multipliers[m..].iter().enumerate() {
        r[i] += u;
    }
    let u_inf = multipliers.iter().fold(0.0f64, |acc, &v| acc.max(v.abs()));
    let residual_inf = r.iter().fold(0.0f64, |acc, &v| acc.max(v.abs()));
    residual_inf / (1.0 + u_inf)
}

/// Max normalized violation of `bl ≤ Cᵀx ≤ bu` and `xl ≤ x ≤ xu`.
#[allow(clippy::too_many_arguments)]
pub fn primal_feasibility_residual(
    c: MatRef<'_, f64>,
    x: ColRef<'_, f64>,
    bl: ColRef<'_, f64>,
    bu: ColRef<'_, f64>,
    xl: ColRef<'_, f64>,
    xu: ColRef<'_, f64>,
) -> f64 {
    let n = c.nrows();
    let m = c.ncols();
    let x_inf = (0..n).fold(0.0f64, |acc, i| acc.max(x[i].abs()));

    let mut worst = 0.0f64;
    for p in 0..m {
        let mut cx = 0.0;
        for i in 0..n {
            cx += c[(i, p)] * x[i];
        }
        worst = worst.max((bl[p] - cx).max(0.0)).max((cx - bu[p]).max(0.0));
    }
    for i in 0..xl.nrows() {
        worst = worst
            .max((xl[i] - x[i]).max(0.0))
            .max((x[i] - xu[i]).max(0.0));
    }
    worst / (1.0 + x_inf)
}

/// Checks §8.1's multiplier-sign rule for every general constraint and bound.
pub fn complementarity_holds(
    active_status: &[ActivationStatus],
    multipliers: &[f64],
    tol: f64,
) -> bool {
    active_status
        .iter()
        .zip(multipliers.iter())
        .all(|(&status, &u)| match status {
            ActivationStatus::Inactive => u.abs() <= tol,
            ActivationStatus::Lower | ActivationStatus::LowerBound => u <= tol,
            ActivationStatus::Upper | ActivationStatus::UpperBound => u >= -tol,
            ActivationStatus::Equality | ActivationStatus::Fixed => true,
        })
}
