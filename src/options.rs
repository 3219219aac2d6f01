use crate::log::LogFlags;

/// Which form of `G`'s factorization the caller is providing in the `G` slot
/// passed to [`crate::solve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GFactorization {
    /// `G` is the original matrix; the engine computes its Cholesky factor.
    #[default]
    None,
    /// `G` already holds the lower-triangular Cholesky factor `L`.
    L,
    /// `G` already holds `L⁻¹`.
    LInv,
    /// `G` already holds `L⁻ᵀ`.
    LTInv,
    /// `G` already holds `L⁻ᵀ·Q` for the initial equality-only active set.
    LTInvQ,
}

/// Tunables for [`crate::GIEngine`].
///
/// A plain struct with fluent builder methods, not a dynamic registry: every
/// field here is read from the hot per-iteration loop, where a type-erased
/// lookup would cost more than the arithmetic it guards.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    max_iter: u32,
    big_bnd: f64,
    warm_start: bool,
    g_factorization: GFactorization,
    equality_first: bool,
    r_is_given: bool,
    log_flags: LogFlags,
    zero_step_tolerance: f64,
    dependency_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iter: 500,
            big_bnd: 1e100,
            warm_start: false,
            g_factorization: GFactorization::None,
            equality_first: false,
            r_is_given: false,
            log_flags: LogFlags::NONE,
            zero_step_tolerance: 1e-14,
            dependency_tolerance: 1e-10,
        }
    }
}

impl SolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iter(mut self, max_iter: u32) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_big_bnd(mut self, big_bnd: f64) -> Self {
        self.big_bnd = big_bnd;
        self
    }

    pub fn with_warm_start(mut self, warm_start: bool) -> Self {
        self.warm_start = warm_start;
        self
    }

    pub fn with_g_factorization(mut self, g_factorization: GFactorization) -> Self {
        self.g_factorization = g_factorization;
        self
    }

    pub fn with_equality_first(mut self, equality_first: bool) -> Self {
        self.equality_first = equality_first;
        self
    }

    pub fn with_r_is_given(mut self, r_is_given: bool) -> Self {
        self.r_is_given = r_is_given;
        self
    }

    pub fn with_log_flags(mut self, log_flags: LogFlags) -> Self {
        self.log_flags = log_flags;
        self
    }

    pub fn with_zero_step_tolerance(mut self, tol: f64) -> Self {
        self.zero_step_tolerance = tol;
        self
    }

    pub fn with_dependency_tolerance(mut self, tol: f64) -> Self {
        self.dependency_tolerance = tol;
        self
    }

    pub fn max_iter(&self) -> u32 {
        self.max_iter
    }

    pub fn big_bnd(&self) -> f64 {
        self.big_bnd
    }

    pub fn warm_start(&self) -> bool {
        self.warm_start
    }

    pub fn g_factorization(&self) -> GFactorization {
        self.g_factorization
    }

    pub fn equality_first(&self) -> bool {
        self.equality_first
    }

    pub fn r_is_given(&self) -> bool {
        self.r_is_given
    }

    pub fn log_flags(&self) -> LogFlags {
        self.log_flags
    }

    pub fn zero_step_tolerance(&self) -> f64 {
        self.zero_step_tolerance
    }

    pub fn dependency_tolerance(&self) -> f64 {
        self.dependency_tolerance
    }
}
