//! Unblocked Householder QR, used once per solve to batch-factor the initial
//! active set's `B = L⁻¹N` block: `B = Q R` with `R` upper triangular and
//! `Q` accumulated only through its effect on `J` (`J <- J Q`), never formed
//! explicitly.
//!
//! This mirrors the one-shot, in-place QR used to seed the incremental
//! Givens updates that follow: after this runs once, `add_constraint` and
//! `remove_constraint` maintain `R` and `J` with the cheaper rotations in
//! [`crate::linalg::givens`].

use faer::MatMut;

/// Reflector `k` is `I - tau[k] * v v^T`, with `v[0..k]` implicitly zero,
/// `v[k] = 1`, and `v[k+1..]` stored in `house[k]`.
pub struct HouseholderSequence {
    tau: Vec<f64>,
    house: Vec<Vec<f64>>,
}

impl HouseholderSequence {
    pub fn len(&self) -> usize {
        self.tau.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tau.is_empty()
    }

    /// Applies the sequence from the right to an `n x n` buffer (`J <- J Q`),
    /// in reflector order, matching `Q = H_0 H_1 ... H_{q-1}`.
    pub fn apply_to_right(&self, mut j: MatMut<'_, f64>) {
        let n = j.nrows();
        debug_assert_eq!(n, j.ncols());

        for k in 0..self.tau.len() {
            let tau = self.tau[k];
            if tau == 0.0 {
                continue;
            }
            let v = &self.house[k];
            for r in 0..n {
                let mut dot = j[(r, k)];
                for (offset, &vi) in v.iter().enumerate() {
                    dot += j[(r, k + 1 + offset)] * vi;
                }
                let scale = tau * dot;
                j[(r, k)] -= scale;
                for (offset, &vi) in v.iter().enumerate() {
                    j[(r, k + 1 + offset)] -= scale * vi;
                }
            }
        }
    }
}

/// Factors `b` (`n x q`, `n >= q`) in place: the upper triangle of `b`
/// becomes `R`, and the reflectors needed to reconstruct `Q` are returned
/// separately (the strict lower triangle of `b` is left in an undefined
/// state, matching Eigen's in-place QR convention).
pub fn householder_qr_in_place(mut b: MatMut<'_, f64>) -> HouseholderSequence {
    let n = b.nrows();
    let q = b.ncols();
    debug_assert!(n >= q);

    let mut tau = Vec::with_capacity(q);
    let mut house = Vec::with_capacity(q);

    for k in 0..q {
        let mut norm_sq = 0.0;
        for r in k..n {
            norm_sq += b[(r, k)] * b[(r, k)];
        }
        let alpha = b[(k, k)];
        let norm = norm_sq.sqrt();

        if norm == 0.0 {
            tau.push(0.0);
            house.push(vec![0.0; n - k - 1]);
            continue;
        }

        let beta = if alpha >= 0.0 { -norm } else { norm };
        let tau_k = (beta - alpha) / beta;
        let inv_denom = 1.0 / (alpha - beta);

        let mut v = Vec::with_capacity(n - k - 1);
        for r in (k + 1)..n {
            v.push(b[(r, k)] * inv_denom);
        }

        b[(k, k)] = beta;
        for r in (k + 1)..n {
            b[(r, k)] = 0.0;
        }

        for c in (k + 1)..q {
            let mut dot = b[(k, c)];
            for (offset, &vi) in v.iter().enumerate() {
                dot += b[(k + 1 + offset, c)] * vi;
            }
            let scale = tau_k * dot;
            b[(k, c)] -= scale;
            for (offset, &vi) in v.iter().enumerate() {
                b[(k + 1 + offset, c)] -= scale * vi;
            }
        }

        tau.push(tau_k);
        house.push(v);
    }

    HouseholderSequence { tau, house }
}
