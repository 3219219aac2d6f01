//! Active-set bookkeeping (component A).
//!
//! Tracks, for every general constraint and every bound, whether it is
//! currently enforced as an equality by the dual iteration, and maintains
//! the ordered list of active global indices alongside per-kind counts.

/// The activation status of a single constraint or bound.
///
/// `EQUALITY` and `LOWER`/`UPPER` apply only to general constraints
/// (global index `< nb_cstr`); `LOWER_BOUND`, `UPPER_BOUND`, and `FIXED`
/// apply only to bounds (global index `>= nb_cstr`). `EQUALITY` and `FIXED`
/// constraints are never removed once activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationStatus {
    Inactive,
    Lower,
    Upper,
    Equality,
    LowerBound,
    UpperBound,
    Fixed,
}

impl ActivationStatus {
    /// General-constraint statuses, as opposed to bound statuses.
    pub fn is_general(self) -> bool {
        matches!(self, Self::Lower | Self::Upper | Self::Equality)
    }

    pub fn is_bound(self) -> bool {
        matches!(self, Self::LowerBound | Self::UpperBound | Self::Fixed)
    }

    /// Equality/fixed constraints are never removed from the active set.
    pub fn is_permanent(self) -> bool {
        matches!(self, Self::Equality | Self::Fixed)
    }
}

/// Tracks the activation status of every constraint and bound, plus the
/// ordered list of currently active global indices.
///
/// The status vector is indexed over the global index space
/// `0..nb_cstr+nb_bnd`: indices `0..nb_cstr-1` are general constraints,
/// indices `nb_cstr..nb_cstr+nb_bnd-1` are the `i - nb_cstr`-th bound.
#[derive(Debug, Clone)]
pub struct ActiveSet {
    status: Vec<ActivationStatus>,
    active: Vec<usize>,

    nb_cstr: usize,
    nb_bnd: usize,

    nb_equality: usize,
    nb_lower_ineq: usize,
    nb_upper_ineq: usize,
    nb_lower_bnd: usize,
    nb_upper_bnd: usize,
    nb_fixed: usize,
}

impl ActiveSet {
    pub fn new(nb_cstr: usize, nb_bnd: usize) -> Self {
        let mut set = Self {
            status: Vec::new(),
            active: Vec::new(),
            nb_cstr: 0,
            nb_bnd: 0,
            nb_equality: 0,
            nb_lower_ineq: 0,
            nb_upper_ineq: 0,
            nb_lower_bnd: 0,
            nb_upper_bnd: 0,
            nb_fixed: 0,
        };
        set.resize(nb_cstr, nb_bnd);
        set
    }

    /// Reallocates the status vector for a new problem size and resets to
    /// all-inactive.
    pub fn resize(&mut self, nb_cstr: usize, nb_bnd: usize) {
        self.status
            .resize(nb_cstr + nb_bnd, ActivationStatus::Inactive);
        self.active.reserve(nb_cstr + nb_bnd);
        self.nb_cstr = nb_cstr;
        self.nb_bnd = nb_bnd;
        self.reset();
    }

    /// Clears all constraints and bounds to inactive.
    pub fn reset(&mut self) {
        self.status.fill(ActivationStatus::Inactive);
        self.active.clear();
        self.nb_equality = 0;
        self.nb_lower_ineq = 0;
        self.nb_upper_ineq = 0;
        self.nb_lower_bnd = 0;
        self.nb_upper_bnd = 0;
        self.nb_fixed = 0;
    }

    pub fn nb_cstr(&self) -> usize {
        self.nb_cstr
    }

    pub fn nb_bnd(&self) -> usize {
        self.nb_bnd
    }

    pub fn nb_all(&self) -> usize {
        self.nb_cstr + self.nb_bnd
    }

    pub fn nb_active_cstr(&self) -> usize {
        self.nb_equality + self.nb_lower_ineq + self.nb_upper_ineq + self.nb_active_bound()
    }

    pub fn nb_active_equality(&self) -> usize {
        self.nb_equality
    }

    pub fn nb_active_inequality(&self) -> usize {
        self.nb_lower_ineq + self.nb_upper_ineq
    }

    pub fn nb_active_lower_inequality(&self) -> usize {
        self.nb_lower_ineq
    }

    pub fn nb_active_upper_inequality(&self) -> usize {
        self.nb_upper_ineq
    }

    pub fn nb_active_bound(&self) -> usize {
        self.nb_lower_bnd + self.nb_upper_bnd + self.nb_fixed
    }

    pub fn nb_active_lower_bound(&self) -> usize {
        self.nb_lower_bnd
    }

    pub fn nb_active_upper_bound(&self) -> usize {
        self.nb_upper_bnd
    }

    pub fn nb_fixed_variable(&self) -> usize {
        self.nb_fixed
    }

    pub fn is_active(&self, cstr_idx: usize) -> bool {
        self.status[cstr_idx] != ActivationStatus::Inactive
    }

    pub fn is_active_bnd(&self, bnd_idx: usize) -> bool {
        self.status[self.nb_cstr + bnd_idx] != ActivationStatus::Inactive
    }

    pub fn activation_status(&self, cstr_idx: usize) -> ActivationStatus {
        self.status[cstr_idx]
    }

    pub fn activation_status_bnd(&self, bnd_idx: usize) -> ActivationStatus {
        self.status[self.nb_cstr + bnd_idx]
    }

    /// The full status vector, general constraints first, then bounds.
    pub fn activation_status_vector(&self) -> &[ActivationStatus] {
        &self.status
    }

    /// The global index of the `active_idx`-th active constraint.
    pub fn active_index(&self, active_idx: usize) -> usize {
        self.active[active_idx]
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Activates `cstr_idx` with the given status.
    ///
    /// Preconditions (checked by assertion, as this is a programming-error
    /// contract, not a runtime condition): `status[cstr_idx]` must currently
    /// be `Inactive`, `status` must not itself be `Inactive`, and `status`
    /// must be compatible with the class (general vs. bound) of `cstr_idx`.
    pub fn activate(&mut self, cstr_idx: usize, status: ActivationStatus) {
        debug_assert!(
            self.status[cstr_idx] == ActivationStatus::Inactive,
            "constraint {cstr_idx} is already active"
        );
        debug_assert!(
            status != ActivationStatus::Inactive,
            "activation status must not be Inactive"
        );
        debug_assert!(
            (cstr_idx < self.nb_cstr && status.is_general())
                || (cstr_idx >= self.nb_cstr && status.is_bound()),
            "activation status {status:?} is incompatible with index {cstr_idx}"
        );

        self.active.push(cstr_idx);
        self.status[cstr_idx] = status;

        match status {
            ActivationStatus::Lower => self.nb_lower_ineq += 1,
            ActivationStatus::Upper => self.nb_upper_ineq += 1,
            ActivationStatus::Equality => self.nb_equality += 1,
            ActivationStatus::LowerBound => self.nb_lower_bnd += 1,
            ActivationStatus::UpperBound => self.nb_upper_bnd += 1,
            ActivationStatus::Fixed => self.nb_fixed += 1,
            ActivationStatus::Inactive => unreachable!(),
        }
    }

    /// Deactivates the constraint currently at active position `active_idx`,
    /// shifting later active entries down by one.
    pub fn deactivate(&mut self, active_idx: usize) {
        let cstr_idx = self.active[active_idx];
        let status = self.status[cstr_idx];
        debug_assert!(
            !status.is_permanent(),
            "equality/fixed constraint {cstr_idx} cannot be deactivated"
        );

        self.active.remove(active_idx);
        self.status[cstr_idx] = ActivationStatus::Inactive;

        match status {
            ActivationStatus::Lower => self.nb_lower_ineq -= 1,
            ActivationStatus::Upper => self.nb_upper_ineq -= 1,
            ActivationStatus::Equality => self.nb_equality -= 1,
            ActivationStatus::LowerBound => self.nb_lower_bnd -= 1,
            ActivationStatus::UpperBound => self.nb_upper_bnd -= 1,
            ActivationStatus::Fixed => self.nb_fixed -= 1,
            ActivationStatus::Inactive => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_updates_counts_and_status() {
        let mut set = ActiveSet::new(3, 2);
        set.activate(0, ActivationStatus::Equality);
        set.activate(3, ActivationStatus::LowerBound);

        assert_eq!(set.nb_active_cstr(), 2);
        assert_eq!(set.nb_active_equality(), 1);
        assert_eq!(set.nb_active_lower_bound(), 1);
        assert!(set.is_active(0));
        assert!(set.is_active_bnd(0));
        assert_eq!(set.activation_status(0), ActivationStatus::Equality);
        assert_eq!(set.active_index(0), 0);
        assert_eq!(set.active_index(1), 3);
    }

    #[test]
    fn deactivate_shifts_and_decrements() {
        let mut set = ActiveSet::new(3, 0);
        set.activate(0, ActivationStatus::Lower);
        set.activate(1, ActivationStatus::Upper);
        set.activate(2, ActivationStatus::Lower);

        set.deactivate(0);

        assert_eq!(set.nb_active_cstr(), 2);
        assert!(!set.is_active(0));
        assert_eq!(set.active_index(0), 1);
        assert_eq!(set.active_index(1), 2);
    }

    #[test]
    fn reset_clears_everything() {
        let mut set = ActiveSet::new(2, 2);
        set.activate(0, ActivationStatus::Equality);
        set.activate(2, ActivationStatus::Fixed);
        set.reset();

        assert_eq!(set.nb_active_cstr(), 0);
        assert_eq!(set.active_len(), 0);
        assert!(!set.is_active(0));
        assert!(!set.is_active_bnd(0));
    }

    #[test]
    #[should_panic]
    fn activate_twice_panics() {
        let mut set = ActiveSet::new(1, 0);
        set.activate(0, ActivationStatus::Equality);
        set.activate(0, ActivationStatus::Lower);
    }
}
