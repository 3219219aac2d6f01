//! The generic dual active-set iteration (component D).
//!
//! [`run_dual_driver`] is parameterized over [`DualEngine`] rather than
//! dispatched through a trait object: the inner loop is O(n) per check and
//! runs up to `maxIter` times, so the cost of dynamic dispatch would be
//! measurable next to it. This mirrors how `InteriorPointMethod` is
//! parameterized over its linear-solver/active-set/merit/line-search
//! components rather than boxing them.

use derive_more::Display;

use crate::active_set::ActivationStatus;
use crate::constraint::SelectedConstraint;
use crate::log::{LogFlags, log_iter};
use crate::options::SolverOptions;

/// The outcome of a [`run_dual_driver`] call.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStatus {
    #[display("optimal solution found")]
    Success,
    #[display("problem data is inconsistent")]
    InconsistentInput,
    #[display("G is not strictly positive definite")]
    NonPosHessian,
    #[display("problem is infeasible")]
    Infeasible,
    #[display("maximum number of iterations reached")]
    MaxIterReached,
    #[display("a new active constraint is linearly dependent on the active set")]
    LinearDependencyDetected,
    #[display("too many equality/fixed constraints for the number of variables")]
    OverconstrainedProblem,
    #[display("unknown failure")]
    Unknown,
}

/// The five primitives a concrete engine supplies to the generic loop.
///
/// All indices into the "active" dimension (`k` in `u`/`r`/
/// `activation_status_active`) refer to the *current* active set, i.e.
/// positions `0..active_len()`, not including the pending candidate slot
/// that [`DualEngine::compute_step`] appends.
pub trait DualEngine {
    /// §4.4.1: builds the initial active set, factorization, and primal-dual point.
    fn init(&mut self) -> TerminationStatus;

    /// §4.4.2: the most-violated constraint, or an inactive tag if `x` is feasible.
    fn select_violated(&mut self) -> SelectedConstraint;

    /// §4.4.3: computes `z`/`r` for `sc` and appends a trailing zero slot to `u`.
    fn compute_step(&mut self, sc: SelectedConstraint);

    /// `q`, the number of active constraints before this iteration's add/drop.
    fn active_len(&self) -> usize;

    fn u(&self, k: usize) -> f64;
    fn r(&self, k: usize) -> f64;
    fn activation_status_active(&self, k: usize) -> ActivationStatus;

    /// `‖z‖₂` for the step computed by the last [`DualEngine::compute_step`].
    fn step_norm(&self) -> f64;

    /// `n⁺ᵀ z` for the step computed by the last [`DualEngine::compute_step`].
    fn dot_step(&self, sc: SelectedConstraint) -> f64;

    /// `b − n⁺ᵀ x`, the candidate's binding-side primal residual.
    fn primal_slack(&self, sc: SelectedConstraint) -> f64;

    /// `x += t·z`; `f += t · nz · (0.5·t + u[q])` using the candidate's
    /// current trailing multiplier (read internally, before the dual update).
    fn advance_primal(&mut self, t: f64, nz: f64);

    /// `u[0..q-1] -= t·r`; the trailing candidate slot `u[q] += t`.
    fn advance_duals(&mut self, t: f64);

    /// §4.4.4. Returns `false` if the new column is linearly dependent.
    fn add_constraint(&mut self, sc: SelectedConstraint) -> bool;

    /// §4.4.5.
    fn remove_constraint(&mut self, l: usize);
}

/// Runs the classical dual active-set loop (§4.3) against `engine`.
pub fn run_dual_driver<E: DualEngine>(engine: &mut E, options: &SolverOptions) -> TerminationStatus {
    let status = engine.init();
    if status != TerminationStatus::Success {
        return status;
    }

    let mut skip_step1 = false;
    let mut candidate = SelectedConstraint::inactive();
    let mut iterations: u32 = 0;

    loop {
        if iterations >= options.max_iter() {
            log_iter!(options.log_flags(), LogFlags::TERMINATION, "max_iter {} reached", options.max_iter());
            return TerminationStatus::MaxIterReached;
        }

        if !skip_step1 {
            candidate = engine.select_violated();
            if candidate.status() == ActivationStatus::Inactive {
                log_iter!(options.log_flags(), LogFlags::TERMINATION, "no violated constraint after {} iterations", iterations);
                return TerminationStatus::Success;
            }
        }

        log_iter!(
            options.log_flags(),
            LogFlags::ITERATION_BASIC_DETAILS,
            "iteration {}: candidate index {} status {:?}",
            iterations,
            candidate.index(),
            candidate.status()
        );

        engine.compute_step(candidate);
        iterations += 1;

        let q = engine.active_len();

        let mut t1 = f64::INFINITY;
        let mut blocking = None;
        for k in 0..q {
            let rk = engine.r(k);
            if rk <= 0.0 {
                continue;
            }
            if matches!(
                engine.activation_status_active(k),
                ActivationStatus::Equality | ActivationStatus::Fixed
            ) {
                continue;
            }
            let candidate_t1 = engine.u(k) / rk;
            if candidate_t1 < t1 {
                t1 = candidate_t1;
                blocking = Some(k);
            }
        }

        let nz = engine.dot_step(candidate);
        let t2 = if engine.step_norm() > options.zero_step_tolerance() {
            engine.primal_slack(candidate) / nz
        } else {
            f64::INFINITY
        };

        let t = t1.min(t2);

        log_iter!(
            options.log_flags(),
            LogFlags::ITERATION_ADVANCE_DETAILS,
            "iteration {}: t1 = {}, t2 = {}, t = {}",
            iterations,
            t1,
            t2,
            t
        );

        if t >= options.big_bnd() {
            log_iter!(options.log_flags(), LogFlags::TERMINATION, "step length {} unbounded, infeasible", t);
            return TerminationStatus::Infeasible;
        }

        if t2 >= options.big_bnd() {
            // No primal progress is possible: a pure dual blocking step.
            engine.advance_duals(t);
            let l = blocking.expect("finite t1 implies a blocking index");
            log_iter!(options.log_flags(), LogFlags::ACTIVE_SET, "dual step: removing active slot {}", l);
            engine.remove_constraint(l);
            skip_step1 = true;
        } else {
            engine.advance_primal(t, nz);
            engine.advance_duals(t);

            if t2 <= t1 {
                log_iter!(
                    options.log_flags(),
                    LogFlags::ACTIVE_SET,
                    "primal step: activating index {} status {:?}",
                    candidate.index(),
                    candidate.status()
                );
                if !engine.add_constraint(candidate) {
                    log_iter!(options.log_flags(), LogFlags::TERMINATION, "new constraint linearly dependent on active set");
                    return TerminationStatus::LinearDependencyDetected;
                }
                skip_step1 = false;
            } else {
                let l = blocking.expect("finite t1 implies a blocking index");
                log_iter!(options.log_flags(), LogFlags::ACTIVE_SET, "primal step also blocked: removing active slot {}", l);
                engine.remove_constraint(l);
                skip_step1 = true;
            }
        }
    }
}
