//! `GIEngine`: the concrete Goldfarb–Idnani realization of [`DualEngine`].
//!
//! Owns every persistent buffer the dual iteration touches across a solve —
//! the `J` accumulator, the `R` factor, the active set, the primal/dual
//! iterates — sized once by [`GIEngine::resize`] and reused by every
//! subsequent [`GIEngine::solve`] call without reallocating, in the same
//! spirit as `InteriorPointMethod`'s per-call scratch reuse.

use faer::prelude::{Reborrow, ReborrowMut};
use faer::{Col, ColRef, Mat, MatMut, MatRef};

use crate::active_set::{ActivationStatus, ActiveSet};
use crate::constraint::{ConstraintNormal, SelectedConstraint};
use crate::driver::{run_dual_driver, DualEngine, TerminationStatus};
use crate::linalg::cholesky::{cholesky_in_place, invert_lower_transpose_into, solve_lower_in_place};
use crate::linalg::givens::GivensRotation;
use crate::linalg::householder::householder_qr_in_place;
use crate::log::{log_init, LogFlags};
use crate::options::{GFactorization, SolverOptions};
use crate::workspace::Workspace;

const FEASIBILITY_TOLERANCE: f64 = 1e-12;
const MULTIPLIER_FLOOR: f64 = 1e-14;

/// A dense Goldfarb–Idnani active-set QP engine.
///
/// Dimensions are fixed by the most recent [`GIEngine::resize`]; `solve`
/// reuses the same buffers across calls as long as they match.
pub struct GIEngine {
    n: usize,
    m: usize,
    use_bounds: bool,

    active_set: ActiveSet,
    saved_status: Option<Vec<ActivationStatus>>,

    j: Workspace,
    r: Workspace,
    active_normals: Workspace,
    b_act: Vec<f64>,

    x: Vec<f64>,
    u: Vec<f64>,
    z: Vec<f64>,
    r_step: Vec<f64>,
    d: Vec<f64>,
    alpha: Vec<f64>,

    f: f64,
    iterations: u32,
    multipliers_cache: Option<Vec<f64>>,

    options: SolverOptions,
}

impl GIEngine {
    pub fn new_engine(n: usize, m: usize, use_bounds: bool) -> Self {
        let mut engine = Self {
            n: 0,
            m: 0,
            use_bounds: false,
            active_set: ActiveSet::new(0, 0),
            saved_status: None,
            j: Workspace::default(),
            r: Workspace::default(),
            active_normals: Workspace::default(),
            b_act: Vec::new(),
            x: Vec::new(),
            u: Vec::new(),
            z: Vec::new(),
            r_step: Vec::new(),
            d: Vec::new(),
            alpha: Vec::new(),
            f: 0.0,
            iterations: 0,
            multipliers_cache: None,
            options: SolverOptions::default(),
        };
        engine.resize(n, m, use_bounds);
        engine
    }

    /// Reallocates workspaces sized for `n` variables and `m` general
    /// constraints, with bounds tracked iff `use_bounds`. Idempotent when
    /// called again with the same dimensions.
    pub fn resize(&mut self, n: usize, m: usize, use_bounds: bool) {
        let bnd = if use_bounds { n } else { 0 };

        self.n = n;
        self.m = m;
        self.use_bounds = use_bounds;
        self.active_set.resize(m, bnd);
        self.saved_status = None;

        self.j.resize(n * n);
        self.r.resize(n * n);
        self.active_normals.resize(n * n);

        self.b_act = vec![0.0; n];
        self.x = vec![0.0; n];
        self.u = Vec::with_capacity(n + 1);
        self.z = vec![0.0; n];
        self.r_step = vec![0.0; n];
        self.d = vec![0.0; n];
        self.alpha = vec![0.0; n];

        self.f = 0.0;
        self.iterations = 0;
        self.multipliers_cache = None;
    }

    pub fn set_options(&mut self, options: SolverOptions) {
        self.options = options;
    }

    pub fn reset_active_set(&mut self) {
        self.saved_status = None;
        self.active_set.reset();
    }

    /// Solves a single QP instance. `c` carries one constraint normal per
    /// column. `xl`/`xu` may be length `0` (no bounds tracked) or `n`.
    #[allow(non_snake_case, clippy::too_many_arguments)]
    pub fn solve(
        &mut self,
        mut G: MatMut<'_, f64>,
        a: ColRef<'_, f64>,
        C: MatRef<'_, f64>,
        bl: ColRef<'_, f64>,
        bu: ColRef<'_, f64>,
        xl: ColRef<'_, f64>,
        xu: ColRef<'_, f64>,
    ) -> TerminationStatus {
        let n = self.n;
        let m = self.m;
        debug_assert_eq!(G.nrows(), n);
        debug_assert_eq!(G.ncols(), n);
        debug_assert_eq!(a.nrows(), n);
        debug_assert_eq!(C.nrows(), n);
        debug_assert_eq!(C.ncols(), m);
        debug_assert_eq!(bl.nrows(), m);
        debug_assert_eq!(bu.nrows(), m);
        for i in 0..m {
            debug_assert!(bl[i] <= bu[i], "bl[{i}] > bu[{i}]");
        }
        if self.use_bounds {
            debug_assert_eq!(xl.nrows(), n);
            debug_assert_eq!(xu.nrows(), n);
            for i in 0..n {
                debug_assert!(xl[i] <= xu[i], "xl[{i}] > xu[{i}]");
            }
        }

        self.multipliers_cache = None;
        self.iterations = 0;

        let options = self.options.clone();
        let status = {
            let mut session = GISession {
                engine: &mut *self,
                g: G.rb_mut(),
                a,
                c: C,
                bl,
                bu,
                xl,
                xu,
                options: options.clone(),
            };
            run_dual_driver(&mut session, &options)
        };
        if status == TerminationStatus::Success {
            self.saved_status = Some(self.active_set.activation_status_vector().to_vec());
        }
        status
    }

    pub fn solution(&self) -> ColRef<'_, f64> {
        faer::col::from_slice(&self.x)
    }

    pub fn objective_value(&self) -> f64 {
        self.f
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn active_set(&self) -> &[ActivationStatus] {
        self.active_set.activation_status_vector()
    }

    /// Expands the compact, always-non-negative `u` into a full-length,
    /// signed multiplier vector, caching the result until the next `solve`.
    pub fn multipliers(&mut self) -> &[f64] {
        if self.multipliers_cache.is_none() {
            let total = self.m + self.active_set.nb_bnd();
            let mut expanded = vec![0.0; total];
            for k in 0..self.active_set.active_len() {
                let p = self.active_set.active_index(k);
                let status = self.status_for_global(p);
                let signed = match status {
                    ActivationStatus::Lower | ActivationStatus::LowerBound => -self.u[k],
                    ActivationStatus::Upper | ActivationStatus::UpperBound => self.u[k],
                    ActivationStatus::Equality | ActivationStatus::Fixed => self.u[k],
                    ActivationStatus::Inactive => 0.0,
                };
                expanded[p] = signed;
            }
            self.multipliers_cache = Some(expanded);
        }
        self.multipliers_cache.as_deref().unwrap()
    }

    fn status_for_global(&self, p: usize) -> ActivationStatus {
        if p < self.m {
            self.active_set.activation_status(p)
        } else {
            self.active_set.activation_status_bnd(p - self.m)
        }
    }
}

/// A short-lived borrow of `GIEngine`'s buffers plus the problem data for a
/// single [`GIEngine::solve`] call, implementing [`DualEngine`] against them.
#[allow(non_snake_case)]
struct GISession<'e, 'a> {
    engine: &'e mut GIEngine,
    g: MatMut<'a, f64>,
    a: ColRef<'a, f64>,
    c: MatRef<'a, f64>,
    bl: ColRef<'a, f64>,
    bu: ColRef<'a, f64>,
    xl: ColRef<'a, f64>,
    xu: ColRef<'a, f64>,
    options: SolverOptions,
}

impl GISession<'_, '_> {
    fn n(&self) -> usize {
        self.engine.n
    }

    fn m(&self) -> usize {
        self.engine.m
    }

    /// Builds `J` from whichever form of the Cholesky factor the caller
    /// supplied (or that step 2 just computed), per `gFactorization`.
    fn seed_j_from_g(&mut self) -> Result<(), TerminationStatus> {
        let n = self.n();
        match self.options.g_factorization() {
            GFactorization::None => {
                if let Err(_problem) = cholesky_in_place(self.g.rb_mut()) {
                    return Err(TerminationStatus::NonPosHessian);
                }
                let mut j = self.engine.j.as_matrix_mut(n, n, n);
                set_identity(j.rb_mut());
                invert_lower_transpose_into(self.g.rb(), j.rb_mut());
            }
            GFactorization::L => {
                let mut j = self.engine.j.as_matrix_mut(n, n, n);
                set_identity(j.rb_mut());
                invert_lower_transpose_into(self.g.rb(), j.rb_mut());
            }
            GFactorization::LInv => {
                // G holds L^-1; J = (L^-1)^T.
                let mut j = self.engine.j.as_matrix_mut(n, n, n);
                for col in 0..n {
                    for row in 0..n {
                        j[(row, col)] = self.g[(col, row)];
                    }
                }
            }
            GFactorization::LTInv | GFactorization::LTInvQ => {
                // G already holds L^-T (optionally with Q folded in).
                let mut j = self.engine.j.as_matrix_mut(n, n, n);
                for col in 0..n {
                    for row in 0..n {
                        j[(row, col)] = self.g[(row, col)];
                    }
                }
            }
        }
        Ok(())
    }

    /// Builds `N` (signed active normals) and `b_act` for the current active set.
    fn build_active_normals(&mut self) {
        let n = self.n();
        let q = self.engine.active_set.active_len();
        let mut normals = self.engine.active_normals.as_matrix_mut(n, q.max(1), n);

        for k in 0..q {
            let p = self.engine.active_set.active_index(k);
            let status = self.status_for_global(p);

            for row in 0..n {
                normals[(row, k)] = 0.0;
            }
            match status {
                ActivationStatus::Equality | ActivationStatus::Lower => {
                    for row in 0..n {
                        normals[(row, k)] = self.c[(row, p)];
                    }
                    self.engine.b_act[k] = self.bl[p];
                }
                ActivationStatus::Upper => {
                    for row in 0..n {
                        normals[(row, k)] = -self.c[(row, p)];
                    }
                    self.engine.b_act[k] = -self.bu[p];
                }
                ActivationStatus::LowerBound | ActivationStatus::Fixed => {
                    let i = p - self.m();
                    normals[(i, k)] = 1.0;
                    self.engine.b_act[k] = self.xl[i];
                }
                ActivationStatus::UpperBound => {
                    let i = p - self.m();
                    normals[(i, k)] = -1.0;
                    self.engine.b_act[k] = -self.xu[i];
                }
                ActivationStatus::Inactive => unreachable!(),
            }
        }
    }

    /// Builds `R` (and applies `Q` to `J`) from `N`, unless the caller has
    /// already supplied a consistent `R`/`J` pair.
    fn build_r_and_j(&mut self) {
        let n = self.n();
        let q = self.engine.active_set.active_len();
        if q == 0 {
            return;
        }

        if self.options.r_is_given()
            && self.options.equality_first()
            && self.options.g_factorization() == GFactorization::LTInvQ
        {
            // Caller asserts J already equals L^-T Q for this exact active
            // set and R is valid from a previous call; nothing to rebuild.
            return;
        }

        // B = L^-1 N, computed in place over a copy of N.
        {
            let mut b = self.engine.active_normals.as_matrix_mut(n, q, n);
            match self.options.g_factorization() {
                GFactorization::None | GFactorization::L => {
                    solve_lower_in_place(self.g.rb(), b.rb_mut());
                }
                GFactorization::LInv => {
                    right_multiply_in_place(self.g.rb(), b.rb_mut());
                }
                GFactorization::LTInv | GFactorization::LTInvQ => {
                    right_multiply_transpose_in_place(self.g.rb(), b.rb_mut());
                }
            }
        }

        let seq = {
            let b = self.engine.active_normals.as_matrix_mut(n, q, n);
            householder_qr_in_place(b)
        };

        // Copy R out of B's upper triangle, zeroing the strict lower part.
        {
            let b = self.engine.active_normals.as_matrix(n, q, n);
            let mut r = self.engine.r.as_matrix_mut(n, n, n);
            for col in 0..q {
                for row in 0..q {
                    r[(row, col)] = if row <= col { b[(row, col)] } else { 0.0 };
                }
            }
        }

        let mut j = self.engine.j.as_matrix_mut(n, n, n);
        seq.apply_to_right(j.rb_mut());
    }

    /// Computes `x`, `u`, `f` for the current active set (step 4 of init).
    fn compute_primal_dual_point(&mut self) {
        let n = self.n();
        let q = self.engine.active_set.active_len();

        let j = self.engine.j.as_matrix(n, n, n);
        for row in 0..n {
            let mut acc = 0.0;
            for col in 0..n {
                acc += j[(col, row)] * self.a[col];
            }
            self.engine.alpha[row] = acc;
        }

        let r = self.engine.r.as_matrix(n, n, n);

        // beta = R^-T b_act, forward substitution (R^T is lower triangular).
        let mut beta = vec![0.0; q];
        for i in 0..q {
            let mut s = self.engine.b_act[i];
            for k in 0..i {
                s -= r[(k, i)] * beta[k];
            }
            beta[i] = s / r[(i, i)];
        }

        // u = R^-1 (alpha1 + beta), back substitution.
        self.engine.u.clear();
        self.engine.u.resize(q, 0.0);
        for i in (0..q).rev() {
            let mut s = self.engine.alpha[i] + beta[i];
            for k in (i + 1)..q {
                s -= r[(i, k)] * self.engine.u[k];
            }
            self.engine.u[i] = s / r[(i, i)];
        }

        // x = J1 beta - J2 alpha2.
        for row in 0..n {
            let mut acc = 0.0;
            for k in 0..q {
                acc += j[(row, k)] * beta[k];
            }
            for k in q..n {
                acc -= j[(row, k)] * self.engine.alpha[k];
            }
            self.engine.x[row] = acc;
        }

        let mut f = 0.0;
        for i in 0..q {
            f += beta[i] * (0.5 * beta[i] + self.engine.alpha[i]);
        }
        let mut alpha2_sq = 0.0;
        for i in q..n {
            alpha2_sq += self.engine.alpha[i] * self.engine.alpha[i];
        }
        self.engine.f = f - 0.5 * alpha2_sq;
    }

    fn status_for_global(&self, p: usize) -> ActivationStatus {
        if p < self.m() {
            self.engine.active_set.activation_status(p)
        } else {
            self.engine.active_set.activation_status_bnd(p - self.m())
        }
    }

    /// §4.5: folds a saved activation-status vector from a previous solve
    /// into the active set built from the current equalities/fixed bounds.
    /// Invalid or stale entries are dropped with a warning rather than
    /// failing the solve; equalities/fixed are never taken from `saved`.
    fn reconcile_warm_start(&mut self) {
        let n = self.n();
        let m = self.m();
        let big_bnd = self.options.big_bnd();

        let Some(saved) = self.engine.saved_status.clone() else {
            return;
        };
        let mut added = Vec::new();

        for (p, &status) in saved.iter().enumerate() {
            if matches!(
                status,
                ActivationStatus::Inactive | ActivationStatus::Equality | ActivationStatus::Fixed
            ) {
                continue;
            }
            if self.status_for_global(p) != ActivationStatus::Inactive {
                continue;
            }

            let is_general = p < m;
            let class_ok = (is_general && status.is_general())
                || (!is_general && status.is_bound() && status != ActivationStatus::Fixed);
            if !class_ok {
                tracing::warn!(
                    target: "gi_qp::init",
                    index = p,
                    ?status,
                    "warm-start entry's status class doesn't match its index class; ignoring"
                );
                continue;
            }

            let side_finite = if is_general {
                match status {
                    ActivationStatus::Lower => self.bl[p].abs() < big_bnd,
                    ActivationStatus::Upper => self.bu[p].abs() < big_bnd,
                    _ => false,
                }
            } else {
                let i = p - m;
                match status {
                    ActivationStatus::LowerBound => self.xl[i].abs() < big_bnd,
                    ActivationStatus::UpperBound => self.xu[i].abs() < big_bnd,
                    _ => false,
                }
            };
            if !side_finite {
                tracing::warn!(
                    target: "gi_qp::init",
                    index = p,
                    ?status,
                    "warm-start entry references a non-finite bound; ignoring"
                );
                continue;
            }

            self.engine.active_set.activate(p, status);
            added.push(p);
        }

        while self.engine.active_set.active_len() > n {
            let Some(p) = added.pop() else { break };
            let pos = (0..self.engine.active_set.active_len())
                .find(|&k| self.engine.active_set.active_index(k) == p)
                .expect("just-added warm-start entry must be in the active list");
            self.engine.active_set.deactivate(pos);
        }
    }

    fn dot_x(&self, sc: SelectedConstraint) -> f64 {
        let cn = ConstraintNormal::new(self.c, sc);
        cn.dot(faer::col::from_slice(&self.engine.x))
    }
}

fn set_identity(mut m: MatMut<'_, f64>) {
    let n = m.nrows();
    for col in 0..n {
        for row in 0..n {
            m[(row, col)] = if row == col { 1.0 } else { 0.0 };
        }
    }
}

/// `b <- g * b` (used when `g` already holds `L^-1`).
fn right_multiply_in_place(g: MatRef<'_, f64>, mut b: MatMut<'_, f64>) {
    let n = g.nrows();
    let cols = b.ncols();
    let original: Mat<f64> = Mat::from_fn(n, cols, |i, j| b[(i, j)]);
    for col in 0..cols {
        for row in 0..n {
            let mut acc = 0.0;
            for k in 0..n {
                acc += g[(row, k)] * original[(k, col)];
            }
            b[(row, col)] = acc;
        }
    }
}

/// `b <- g^T * b` (used when `g` already holds `L^-T`, so `L^-1 = g^T`).
fn right_multiply_transpose_in_place(g: MatRef<'_, f64>, mut b: MatMut<'_, f64>) {
    let n = g.nrows();
    let cols = b.ncols();
    let original: Mat<f64> = Mat::from_fn(n, cols, |i, j| b[(i, j)]);
    for col in 0..cols {
        for row in 0..n {
            let mut acc = 0.0;
            for k in 0..n {
                acc += g[(k, row)] * original[(k, col)];
            }
            b[(row, col)] = acc;
        }
    }
}

impl DualEngine for GISession<'_, '_> {
    fn init(&mut self) -> TerminationStatus {
        let n = self.n();
        let m = self.m();

        log_init!(
            self.options.log_flags(),
            LogFlags::INPUT | LogFlags::NO_ITER,
            "init: n = {}, m = {}, warm_start = {}",
            n,
            m,
            self.options.warm_start()
        );

        self.engine.active_set.reset();
        for i in 0..m {
            if self.bl[i] == self.bu[i] {
                self.engine.active_set.activate(i, ActivationStatus::Equality);
            }
        }
        if self.engine.use_bounds {
            for i in 0..n {
                if self.xl[i] == self.xu[i] {
                    self.engine.active_set.activate(m + i, ActivationStatus::Fixed);
                }
            }
        }
        if self.engine.active_set.active_len() > n {
            log_init!(
                self.options.log_flags(),
                LogFlags::TERMINATION,
                "init: {} equality/fixed constraints exceed n = {}",
                self.engine.active_set.active_len(),
                n
            );
            return TerminationStatus::OverconstrainedProblem;
        }

        if self.options.warm_start() {
            self.reconcile_warm_start();
        }

        if let Err(status) = self.seed_j_from_g() {
            log_init!(self.options.log_flags(), LogFlags::TERMINATION, "init: Cholesky factorization failed");
            return status;
        }

        self.build_active_normals();
        self.build_r_and_j();
        self.compute_primal_dual_point();

        loop {
            let mut worst: Option<(usize, f64)> = None;
            for k in 0..self.engine.active_set.active_len() {
                let p = self.engine.active_set.active_index(k);
                let status = self.status_for_global(p);
                if status.is_permanent() {
                    continue;
                }
                let uk = self.engine.u[k];
                if uk < -MULTIPLIER_FLOOR && worst.map(|(_, w)| uk < w).unwrap_or(true) {
                    worst = Some((k, uk));
                }
            }
            match worst {
                Some((k, uk)) => {
                    log_init!(
                        self.options.log_flags(),
                        LogFlags::ACTIVE_SET_DETAILS,
                        "init cleanup: removing active slot {} with negative multiplier {}",
                        k,
                        uk
                    );
                    remove_constraint_raw(self.engine, k);
                    self.build_active_normals();
                    self.build_r_and_j();
                    self.compute_primal_dual_point();
                }
                None => break,
            }
        }

        log_init!(
            self.options.log_flags(),
            LogFlags::INIT,
            "init done: active_len = {}",
            self.engine.active_set.active_len()
        );
        TerminationStatus::Success
    }

    fn select_violated(&mut self) -> SelectedConstraint {
        let n = self.n();
        let m = self.m();
        let mut best = -FEASIBILITY_TOLERANCE;
        let mut best_sc = SelectedConstraint::inactive();

        for i in 0..m {
            if self.engine.active_set.is_active(i) {
                continue;
            }
            let cx = self.dot_general(i);
            let s_low = cx - self.bl[i];
            if s_low < best {
                best = s_low;
                best_sc = SelectedConstraint::new(i, ActivationStatus::Lower);
            }
            let s_up = self.bu[i] - cx;
            if s_up < best {
                best = s_up;
                best_sc = SelectedConstraint::new(i, ActivationStatus::Upper);
            }
        }

        if self.engine.use_bounds {
            for i in 0..n {
                if self.engine.active_set.is_active_bnd(i) {
                    continue;
                }
                let xi = self.engine.x[i];
                let s_low = xi - self.xl[i];
                if s_low < best {
                    best = s_low;
                    best_sc = SelectedConstraint::new(m + i, ActivationStatus::LowerBound);
                }
                let s_up = self.xu[i] - xi;
                if s_up < best {
                    best = s_up;
                    best_sc = SelectedConstraint::new(m + i, ActivationStatus::UpperBound);
                }
            }
        }

        best_sc
    }

    fn compute_step(&mut self, sc: SelectedConstraint) {
        let n = self.n();
        let q = self.engine.active_set.active_len();

        let j = self.engine.j.as_matrix(n, n, n);
        let cn = ConstraintNormal::new(self.c, sc);
        cn.premultiply_by_mt(faer::col::from_slice_mut(&mut self.engine.d), j);

        for row in 0..n {
            let mut acc = 0.0;
            for k in q..n {
                acc += j[(row, k)] * self.engine.d[k];
            }
            self.engine.z[row] = acc;
        }

        let r = self.engine.r.as_matrix(n, n, n);
        self.engine.r_step.iter_mut().for_each(|v| *v = 0.0);
        for i in (0..q).rev() {
            let mut s = self.engine.d[i];
            for k in (i + 1)..q {
                s -= r[(i, k)] * self.engine.r_step[k];
            }
            self.engine.r_step[i] = s / r[(i, i)];
        }

        self.engine.u.push(0.0);
        self.engine.iterations += 1;
    }

    fn active_len(&self) -> usize {
        self.engine.active_set.active_len()
    }

    fn u(&self, k: usize) -> f64 {
        self.engine.u[k]
    }

    fn r(&self, k: usize) -> f64 {
        self.engine.r_step[k]
    }

    fn activation_status_active(&self, k: usize) -> ActivationStatus {
        let p = self.engine.active_set.active_index(k);
        self.status_for_global(p)
    }

    fn step_norm(&self) -> f64 {
        self.engine.z.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    fn dot_step(&self, sc: SelectedConstraint) -> f64 {
        let cn = ConstraintNormal::new(self.c, sc);
        cn.dot(faer::col::from_slice(&self.engine.z))
    }

    fn primal_slack(&self, sc: SelectedConstraint) -> f64 {
        let binding = match sc.status() {
            ActivationStatus::Lower | ActivationStatus::Equality => self.bl[sc.index()],
            ActivationStatus::Upper => -self.bu[sc.index()],
            ActivationStatus::LowerBound | ActivationStatus::Fixed => {
                self.xl[sc.index() - self.m()]
            }
            ActivationStatus::UpperBound => -self.xu[sc.index() - self.m()],
            ActivationStatus::Inactive => unreachable!(),
        };
        binding - self.dot_x(sc)
    }

    fn advance_primal(&mut self, t: f64, nz: f64) {
        let q = self.engine.active_set.active_len();
        let u_q = self.engine.u[q];
        for i in 0..self.n() {
            self.engine.x[i] += t * self.engine.z[i];
        }
        self.engine.f += t * nz * (0.5 * t + u_q);
    }

    fn advance_duals(&mut self, t: f64) {
        let q = self.engine.active_set.active_len();
        for k in 0..q {
            self.engine.u[k] -= t * self.engine.r_step[k];
        }
        self.engine.u[q] += t;
    }

    fn add_constraint(&mut self, sc: SelectedConstraint) -> bool {
        let n = self.n();
        self.engine.active_set.activate(sc.index(), sc.status());
        let new_q = self.engine.active_set.active_len();

        let norm_d = self.engine.d.iter().map(|v| v * v).sum::<f64>().sqrt();

        {
            let j_buf = self.engine.j.raw_mut();
            for i in (new_q - 1..n.saturating_sub(1)).rev() {
                let g = GivensRotation::new(self.engine.d[i], self.engine.d[i + 1]);
                g.apply_pair(&mut self.engine.d, i, i + 1);
                g.apply_columns(j_buf, n, n, i, i + 1);
            }
        }

        let pivot = self.engine.d[new_q - 1];
        let mut r = self.engine.r.as_matrix_mut(n, n, n);
        for row in 0..new_q {
            r[(row, new_q - 1)] = self.engine.d[row];
        }

        // Also fold the candidate's trailing u slot: once activated it
        // becomes an ordinary active multiplier, nothing further to do here
        // since `advance_duals` already wrote `u[q]`.

        pivot.abs() >= self.options.dependency_tolerance() * norm_d.max(1.0)
    }

    fn remove_constraint(&mut self, l: usize) {
        remove_constraint_raw(self.engine, l);
    }
}

impl GISession<'_, '_> {
    fn dot_general(&self, i: usize) -> f64 {
        let mut acc = 0.0;
        for row in 0..self.n() {
            acc += self.c[(row, i)] * self.engine.x[row];
        }
        acc
    }
}

/// Shared by `DualEngine::remove_constraint` and the post-init cleanup loop
/// (which removes constraints before a `GISession` exists for the second
/// call), so it takes the engine directly rather than `&mut self`.
fn remove_constraint_raw(engine: &mut GIEngine, l: usize) {
    let n = engine.n;
    let q = engine.active_set.active_len();

    {
        let r_buf = engine.r.raw_mut();
        for col in l..q.saturating_sub(1) {
            let (src, dst) = ((col + 1) * n, col * n);
            for row in 0..n {
                r_buf[dst + row] = r_buf[src + row];
            }
        }
    }

    {
        let r_buf = engine.r.raw_mut();
        let j_buf = engine.j.raw_mut();

        for i in l..q.saturating_sub(1) {
            let g = GivensRotation::new(r_buf[i * n + i], r_buf[i * n + i + 1]);
            g.apply_rows(r_buf, n, q.saturating_sub(1), i, i + 1);
            g.apply_columns(j_buf, n, n, i, i + 1);
        }
    }

    engine.active_set.deactivate(l);
    // `u` mirrors the active list plus (transiently) a trailing candidate
    // slot; dropping entry `l` keeps that correspondence after the shift.
    engine.u.remove(l);
}
