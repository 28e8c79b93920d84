//! LAMP: local affine multidimensional projection.
//!
//! For every point, a weighted orthogonal affine mapping is fitted from the
//! sample points' high-dimensional coordinates to their known 2-D positions,
//! and the point is pushed through its own mapping. Rows are independent, so
//! the per-point solves fan out across a thread pool.

use super::validate_anchors;
use crate::error::Result;
use crate::primitives::Matrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Local affine multidimensional projection.
///
/// # Examples
///
/// ```
/// use proyectar::prelude::*;
///
/// // 2-D data projected onto itself: the recovered mapping is the identity.
/// let x = Matrix::from_vec(4, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).expect("matrix");
/// let ys = Matrix::from_vec(3, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]).expect("matrix");
///
/// let projection = Lamp::new().project(&x, &[0, 1, 2], &ys).expect("valid inputs");
/// assert!((projection.get(3, 0) - 1.0).abs() < 1e-6);
/// assert!((projection.get(3, 1) - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lamp {}

impl Lamp {
    /// Create a LAMP projector.
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Project `x` (n x m) to 2-D using the sample rows at
    /// `sample_indices` with known 2-D positions `ys`.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid anchors or dimension mismatches.
    pub fn project(
        &self,
        x: &Matrix<f64>,
        sample_indices: &[usize],
        ys: &Matrix<f64>,
    ) -> Result<Matrix<f64>> {
        validate_anchors(x.n_rows(), sample_indices, ys, 2)?;

        let n = x.n_rows();
        let m = x.n_cols();
        let s = sample_indices.len();

        let xs: Vec<Vec<f64>> = sample_indices
            .iter()
            .map(|&idx| (0..m).map(|c| x.get(idx, c)).collect())
            .collect();

        let rows: Vec<[f64; 2]> = (0..n)
            .into_par_iter()
            .map(|i| {
                let point: Vec<f64> = (0..m).map(|c| x.get(i, c)).collect();
                project_point(&point, &xs, ys, s, m)
            })
            .collect();

        let mut projection = Matrix::zeros(n, 2);
        for (i, row) in rows.into_iter().enumerate() {
            projection.set(i, 0, row[0]);
            projection.set(i, 1, row[1]);
        }
        Ok(projection)
    }
}

/// Squared distance below which a point is treated as one of the samples.
const COINCIDENCE_EPS: f64 = 1e-12;

/// Fits and applies the local mapping for one point.
fn project_point(point: &[f64], xs: &[Vec<f64>], ys: &Matrix<f64>, s: usize, m: usize) -> [f64; 2] {
    // Inverse-squared-distance weights: nearby samples dominate the local
    // fit. A coincident sample would have infinite weight, so those points
    // snap straight to the sample's known position.
    let mut alphas = vec![0.0; s];
    let mut alphas_sum = 0.0;
    for (j, sample) in xs.iter().enumerate() {
        let mut acc = 0.0;
        for c in 0..m {
            let diff = sample[c] - point[c];
            acc += diff * diff;
        }
        if acc < COINCIDENCE_EPS {
            return [ys.get(j, 0), ys.get(j, 1)];
        }
        alphas[j] = 1.0 / acc;
        alphas_sum += alphas[j];
    }

    // Weighted centroids of the sample set in both spaces.
    let mut xtil = vec![0.0; m];
    let mut ytil = [0.0; 2];
    for j in 0..s {
        for c in 0..m {
            xtil[c] += alphas[j] * xs[j][c];
        }
        ytil[0] += alphas[j] * ys.get(j, 0);
        ytil[1] += alphas[j] * ys.get(j, 1);
    }
    for v in &mut xtil {
        *v /= alphas_sum;
    }
    ytil[0] /= alphas_sum;
    ytil[1] /= alphas_sum;

    // C = sum_j alpha_j * xhat_j^T yhat_j, an m x 2 system whose SVD gives
    // the orthogonal part of the local mapping.
    let mut c_mat = vec![[0.0; 2]; m];
    for j in 0..s {
        let w = alphas[j];
        let yhat = [ys.get(j, 0) - ytil[0], ys.get(j, 1) - ytil[1]];
        for c in 0..m {
            let xhat = xs[j][c] - xtil[c];
            c_mat[c][0] += w * xhat * yhat[0];
            c_mat[c][1] += w * xhat * yhat[1];
        }
    }

    let mapping = orthogonal_mapping(&c_mat);

    // projection = (point - xtil) * M + ytil
    let mut out = [ytil[0], ytil[1]];
    for c in 0..m {
        let centered = point[c] - xtil[c];
        out[0] += centered * mapping[c][0];
        out[1] += centered * mapping[c][1];
    }
    out
}

/// `M = U V^T` from the thin SVD of the m x 2 matrix `c`.
///
/// The right factor comes from the closed-form eigendecomposition of the
/// 2 x 2 Gram matrix `C^T C`; rank-deficient directions are dropped.
fn orthogonal_mapping(c: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let m = c.len();

    let mut g00 = 0.0;
    let mut g01 = 0.0;
    let mut g11 = 0.0;
    for row in c {
        g00 += row[0] * row[0];
        g01 += row[0] * row[1];
        g11 += row[1] * row[1];
    }

    let theta = 0.5 * (2.0 * g01).atan2(g00 - g11);
    let (sin_t, cos_t) = theta.sin_cos();
    let eigenvectors = [[cos_t, sin_t], [-sin_t, cos_t]];
    let eigenvalues = [
        g00 * cos_t * cos_t + 2.0 * g01 * cos_t * sin_t + g11 * sin_t * sin_t,
        g00 * sin_t * sin_t - 2.0 * g01 * cos_t * sin_t + g11 * cos_t * cos_t,
    ];

    let scale = g00.max(g11).max(1.0);
    let mut mapping = vec![[0.0; 2]; m];
    for (vec_k, &lambda) in eigenvectors.iter().zip(eigenvalues.iter()) {
        let sigma = lambda.max(0.0).sqrt();
        if sigma <= 1e-12 * scale.sqrt() {
            continue;
        }
        // u_k = C v_k / sigma; accumulate u_k v_k^T into M.
        for r in 0..m {
            let u = (c[r][0] * vec_k[0] + c[r][1] * vec_k[1]) / sigma;
            mapping[r][0] += u * vec_k[0];
            mapping[r][1] += u * vec_k[1];
        }
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_on_planar_data() {
        // Samples already live in the target plane with ys = xs: the local
        // mapping reduces to the identity for every point.
        let x = Matrix::from_vec(
            5,
            2,
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.3, 0.7],
        )
        .expect("matrix");
        let ys = Matrix::from_vec(3, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]).expect("matrix");

        let projection = Lamp::new().project(&x, &[0, 1, 2], &ys).expect("valid");
        assert_eq!(projection.shape(), (5, 2));
        for i in 0..5 {
            assert!(
                (projection.get(i, 0) - x.get(i, 0)).abs() < 1e-6,
                "row {i} x-coordinate"
            );
            assert!(
                (projection.get(i, 1) - x.get(i, 1)).abs() < 1e-6,
                "row {i} y-coordinate"
            );
        }
    }

    #[test]
    fn test_respects_rigid_rotation() {
        // ys are the samples rotated by 90 degrees; non-sample points should
        // follow the same rotation.
        let x = Matrix::from_vec(
            4,
            2,
            vec![1.0, 0.0, 0.0, 1.0, -1.0, 0.0, 0.5, 0.5],
        )
        .expect("matrix");
        // 90-degree rotation: (a, b) -> (-b, a)
        let ys = Matrix::from_vec(3, 2, vec![0.0, 1.0, -1.0, 0.0, 0.0, -1.0]).expect("matrix");

        let projection = Lamp::new().project(&x, &[0, 1, 2], &ys).expect("valid");
        assert!((projection.get(3, 0) - (-0.5)).abs() < 1e-6);
        assert!((projection.get(3, 1) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_high_dimensional_input() {
        // 3-D data lying on the z = 0 plane maps down to its first two
        // coordinates.
        let x = Matrix::from_vec(
            4,
            3,
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                0.6, 0.4, 0.0,
            ],
        )
        .expect("matrix");
        let ys = Matrix::from_vec(3, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]).expect("matrix");

        let projection = Lamp::new().project(&x, &[0, 1, 2], &ys).expect("valid");
        assert!((projection.get(3, 0) - 0.6).abs() < 1e-6);
        assert!((projection.get(3, 1) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_coincident_point_snaps_to_sample_position() {
        // A point equal to one of the samples takes that sample's known
        // position instead of dividing by a zero distance.
        let x = Matrix::from_vec(
            4,
            2,
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
        )
        .expect("matrix");
        let ys = Matrix::from_vec(3, 2, vec![0.0, 0.0, 7.0, 3.0, 0.0, 1.0]).expect("matrix");

        let projection = Lamp::new().project(&x, &[0, 1, 2], &ys).expect("valid");
        assert_eq!(projection.get(3, 0), 7.0);
        assert_eq!(projection.get(3, 1), 3.0);
        for i in 0..4 {
            assert!(projection.get(i, 0).is_finite());
            assert!(projection.get(i, 1).is_finite());
        }
    }

    #[test]
    fn test_rejects_wrong_ys_width() {
        let x = Matrix::zeros(4, 2);
        let ys = Matrix::zeros(2, 3);
        assert!(Lamp::new().project(&x, &[0, 1], &ys).is_err());
    }
}
