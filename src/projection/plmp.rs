//! PLMP: part-linear multidimensional projection.
//!
//! Fits a single linear projection matrix from the sample subset by least
//! squares, applies it to every point, then pins the sample rows to their
//! known positions.

use super::{least_squares, validate_anchors};
use crate::error::Result;
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};

/// Part-linear multidimensional projection.
///
/// # Examples
///
/// ```
/// use proyectar::prelude::*;
///
/// // 4 points in 2-D; the first three anchor an identity mapping.
/// let x = Matrix::from_vec(4, 2, vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0]).expect("matrix");
/// let ys = Matrix::from_vec(3, 2, vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).expect("matrix");
///
/// let projection = Plmp::new().project(&x, &[0, 1, 2], &ys).expect("valid inputs");
/// assert!((projection.get(3, 0) - 2.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plmp {}

impl Plmp {
    /// Create a PLMP projector.
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Project `x` (n x m) to `ys.n_cols()` dimensions using the sample
    /// rows at `sample_indices` with known positions `ys`.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid anchors or a singular sample system.
    pub fn project(
        &self,
        x: &Matrix<f64>,
        sample_indices: &[usize],
        ys: &Matrix<f64>,
    ) -> Result<Matrix<f64>> {
        validate_anchors(x.n_rows(), sample_indices, ys, ys.n_cols())?;

        let m = x.n_cols();
        let s = sample_indices.len();
        let mut xs_data = Vec::with_capacity(s * m);
        for &idx in sample_indices {
            for c in 0..m {
                xs_data.push(x.get(idx, c));
            }
        }
        let xs = Matrix::from_vec(s, m, xs_data).map_err(crate::error::ProyectarError::from)?;

        // P = argmin ||Xs P - Ys||
        let p = least_squares(&xs, ys, "PLMP normal equations")?;
        let mut projection = x.matmul(&p).map_err(crate::error::ProyectarError::from)?;

        // Sample rows keep their given positions exactly.
        for (row, &idx) in sample_indices.iter().enumerate() {
            for c in 0..ys.n_cols() {
                projection.set(idx, c, ys.get(row, c));
            }
        }

        Ok(projection)
    }
}
