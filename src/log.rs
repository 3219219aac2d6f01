//! Observability contract (§6.3 of the design): a bitmask of record
//! categories, `tracing` as the sink, and a small set of helpers that check
//! the mask before consulting `tracing`'s own filters, so filtered-out
//! records never pay the formatting cost.

use bitflags::bitflags;

bitflags! {
    /// Filters which categories of solver records are emitted through `tracing`.
    ///
    /// Mirrors the reference solver's `LogFlags` enum bit-for-bit so that a
    /// caller porting a saved flag value preserves its meaning.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LogFlags: u32 {
        const NONE = 0;
        const INPUT = 1 << 0;
        const TERMINATION = 1 << 1;
        const ITERATION_BASIC_DETAILS = 1 << 2;
        const ITERATION_ADVANCE_DETAILS = 1 << 3;
        const ACTIVE_SET = 1 << 4;
        const ACTIVE_SET_DETAILS = 1 << 5;
        const INIT = 1 << 6;
        const MISC = 1 << 30;
        /// Marks records belonging to the static, pre-iteration header rather
        /// than a specific iteration.
        const NO_ITER = 1 << 31;
    }
}

impl LogFlags {
    #[inline]
    pub fn wants(self, category: LogFlags) -> bool {
        self.intersects(category)
    }
}

/// Emits `tracing::debug!` with `target = "gi_qp::init"` iff `flags` wants `category`.
macro_rules! log_init {
    ($flags:expr, $category:expr, $($arg:tt)*) => {
        if $crate::log::LogFlags::wants($flags, $category) {
            tracing::debug!(target: "gi_qp::init", $($arg)*);
        }
    };
}

/// Emits `tracing::trace!` with `target = "gi_qp::iter"` iff `flags` wants `category`.
macro_rules! log_iter {
    ($flags:expr, $category:expr, $($arg:tt)*) => {
        if $crate::log::LogFlags::wants($flags, $category) {
            tracing::trace!(target: "gi_qp::iter", $($arg)*);
        }
    };
}

pub(crate) use log_init;
pub(crate) use log_iter;
