//! LSP: least-squares projection.
//!
//! Solves a global linear system (typically a neighborhood/Laplacian system
//! with control-point constraint rows appended) for all point positions at
//! once, then pins the control rows to their known positions.

use super::{least_squares, validate_anchors};
use crate::error::{ProyectarError, Result};
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};

/// Least-squares projection.
///
/// The caller builds the system matrix `a` (r x n, r >= n) and right-hand
/// side `b` (r x k); this solves `argmin ||A X - b||` and overwrites the
/// control rows of the solution with their known positions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lsp {}

impl Lsp {
    /// Create an LSP solver.
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Solve the positioning system and pin control points.
    ///
    /// `a` is r x n (one column per point), `b` is r x k,
    /// `control_indices` selects the rows of the n x k solution that are
    /// replaced by `ys`.
    ///
    /// # Errors
    ///
    /// Returns an error on dimension mismatches, invalid control indices or
    /// a singular system.
    pub fn project(
        &self,
        a: &Matrix<f64>,
        b: &Matrix<f64>,
        control_indices: &[usize],
        ys: &Matrix<f64>,
    ) -> Result<Matrix<f64>> {
        if a.n_rows() != b.n_rows() {
            return Err(ProyectarError::DimensionMismatch {
                expected: format!("{} right-hand side rows", a.n_rows()),
                actual: format!("{}", b.n_rows()),
            });
        }
        validate_anchors(a.n_cols(), control_indices, ys, b.n_cols())?;

        let mut projection = least_squares(a, b, "LSP normal equations")?;

        for (row, &idx) in control_indices.iter().enumerate() {
            for c in 0..ys.n_cols() {
                projection.set(idx, c, ys.get(row, c));
            }
        }

        Ok(projection)
    }
}
