//! Closed-form projectors.
//!
//! Unlike the iterative engines, these run one deterministic pass per point:
//! a subset of points (the sample / control points) with known 2-D positions
//! anchors a mapping that places everything else. They share the
//! coordinate-matrix / distance-matrix data model with the engines but keep
//! no iteration state and no convergence logic.

mod lamp;
mod lsp;
mod plmp;

pub use lamp::Lamp;
pub use lsp::Lsp;
pub use plmp::Plmp;

use crate::error::{ProyectarError, Result};
use crate::primitives::Matrix;

/// Checks an anchor set against the data it indexes into.
fn validate_anchors(
    n_rows: usize,
    sample_indices: &[usize],
    ys: &Matrix<f64>,
    out_cols: usize,
) -> Result<()> {
    if sample_indices.is_empty() {
        return Err(ProyectarError::invalid_hyperparameter(
            "sample_indices",
            "[]",
            "at least one sample point",
        ));
    }
    for &idx in sample_indices {
        if idx >= n_rows {
            return Err(ProyectarError::Other(format!(
                "sample index {idx} out of bounds (n={n_rows})"
            )));
        }
    }
    if ys.n_rows() != sample_indices.len() || ys.n_cols() != out_cols {
        return Err(ProyectarError::DimensionMismatch {
            expected: format!("{}x{out_cols} sample positions", sample_indices.len()),
            actual: format!("{}x{}", ys.n_rows(), ys.n_cols()),
        });
    }
    Ok(())
}

/// Solves the normal equations `(A^T A) X = A^T B` column by column.
///
/// Shared by LSP and PLMP, which both reduce to a dense least-squares fit.
fn least_squares(a: &Matrix<f64>, b: &Matrix<f64>, context: &str) -> Result<Matrix<f64>> {
    let at = a.transpose();
    let ata = at.matmul(a).map_err(ProyectarError::from)?;
    let atb = at.matmul(b).map_err(ProyectarError::from)?;

    let cols = atb.n_cols();
    let mut x = Matrix::zeros(ata.n_rows(), cols);
    for c in 0..cols {
        let rhs = atb.column(c);
        let solution = ata
            .cholesky_solve(&rhs)
            .map_err(|_| ProyectarError::SingularSystem {
                context: context.to_string(),
            })?;
        for r in 0..x.n_rows() {
            x.set(r, c, solution[r]);
        }
    }
    Ok(x)
}
