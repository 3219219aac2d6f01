//! Stride-aware scratch buffers (component B).
//!
//! A [`Workspace`] owns a single flat `Vec<f64>` and hands out vector or
//! matrix *views* over a prefix of it, with a caller-chosen leading
//! dimension for matrix views. This lets [`crate::engine::GIEngine`] reuse
//! the same backing storage across shrinking and growing active-set sizes
//! (e.g. `R` as a `q x q` view with leading dimension `n`) without
//! reallocating on every add/drop.

use faer::{ColMut, ColRef, MatMut, MatRef};

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    buf: Vec<f64>,
}

impl Workspace {
    pub fn new(len: usize) -> Self {
        Self { buf: vec![0.0; len] }
    }

    /// Grows the backing buffer to at least `len` elements, zero-filling the
    /// new tail. Never shrinks: existing views stay valid across resizes
    /// that don't require growth.
    pub fn resize(&mut self, len: usize) {
        if len > self.buf.len() {
            self.buf.resize(len, 0.0);
        }
    }

    pub fn set_zero(&mut self) {
        self.buf.fill(0.0);
    }

    pub fn as_vector(&self, len: usize) -> ColRef<'_, f64> {
        faer::col::from_slice(&self.buf[..len])
    }

    pub fn as_vector_mut(&mut self, len: usize) -> ColMut<'_, f64> {
        faer::col::from_slice_mut(&mut self.buf[..len])
    }

    /// A `rows x cols` view with leading dimension `ld` (`ld >= rows`),
    /// column-major over the shared buffer.
    pub fn as_matrix(&self, rows: usize, cols: usize, ld: usize) -> MatRef<'_, f64> {
        debug_assert!(ld >= rows);
        faer::mat::from_column_major_slice_with_stride(&self.buf[..ld * cols], rows, cols, ld)
    }

    pub fn as_matrix_mut(&mut self, rows: usize, cols: usize, ld: usize) -> MatMut<'_, f64> {
        debug_assert!(ld >= rows);
        faer::mat::from_column_major_slice_with_stride_mut(
            &mut self.buf[..ld * cols],
            rows,
            cols,
            ld,
        )
    }

    /// The raw backing buffer, column-major, for callers (e.g. the Givens
    /// sweeps in `add_constraint`/`remove_constraint`) that need to touch
    /// two columns or rows at once and so can't go through a single
    /// `MatMut` borrow.
    pub fn raw(&self) -> &[f64] {
        &self.buf
    }

    pub fn raw_mut(&mut self) -> &mut [f64] {
        &mut self.buf
    }
}
