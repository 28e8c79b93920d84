//! t-SNE: neighbor-probability preserving embedding.
//!
//! Converts pairwise distances into a joint probability distribution P via
//! per-point kernel calibration, then runs gradient descent on the layout so
//! the Student-t affinities Q of the low-dimensional points match P. Uses
//! momentum, per-coordinate adaptive gains and an early-exaggeration phase.
//! Unlike Force Scheme there is no tolerance-based early exit: the run
//! always consumes the full iteration budget.

mod calibration;

use crate::error::{ProyectarError, Result};
use crate::primitives::Matrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const PROBABILITY_FLOOR: f64 = 1e-12;

/// t-SNE projection engine.
///
/// # Examples
///
/// ```
/// use proyectar::prelude::*;
///
/// let x = Matrix::from_vec(
///     6,
///     3,
///     vec![
///         0.0, 0.0, 0.0,
///         0.1, 0.0, 0.1,
///         0.0, 0.1, 0.0,
///         5.0, 5.0, 5.0,
///         5.1, 5.0, 5.1,
///         5.0, 5.1, 5.0,
///     ],
/// )
/// .expect("matrix");
/// let y0 = Matrix::from_vec(
///     6,
///     2,
///     vec![
///         0.01, -0.02, -0.01, 0.02, 0.02, 0.01,
///         -0.02, -0.01, 0.01, 0.02, -0.01, -0.02,
///     ],
/// )
/// .expect("matrix");
///
/// let tsne = Tsne::new().with_perplexity(2.0).with_n_iter(50);
/// let y = tsne.project(&x, &y0).expect("valid inputs");
/// assert_eq!(y.shape(), (6, 2));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tsne {
    /// Target effective neighborhood size.
    perplexity: f64,
    /// Output dimensionality (usually 2).
    n_components: usize,
    /// Gradient descent iterations; always run in full.
    n_iter: usize,
    /// Gradient step size.
    eta: f64,
    /// Momentum used before the switch iteration.
    initial_momentum: f64,
    /// Momentum used from the switch iteration on.
    final_momentum: f64,
    /// Factor applied to P during the early phase.
    early_exaggeration: f64,
    /// Additive/multiplicative gain adaptation fraction.
    gain_fraction: f64,
    /// Iteration at which momentum switches to its final value.
    momentum_switch_iter: usize,
    /// Iteration at which the exaggeration factor is removed from P.
    exaggeration_end_iter: usize,
    /// Bisection step budget per calibrated point.
    max_bisection_tries: usize,
    /// Entropy tolerance for the bisection.
    bisection_tol: f64,
    /// Lower clamp for the adaptive gains.
    min_gain: f64,
    /// Interpret the input as a precomputed pairwise distance matrix.
    input_is_distance: bool,
}

impl Default for Tsne {
    fn default() -> Self {
        Self::new()
    }
}

impl Tsne {
    /// Create a t-SNE engine with default parameters.
    ///
    /// Default: perplexity=30, n_components=2, n_iter=1000, eta=500,
    /// momentum 0.5 -> 0.8 at iteration 20, early exaggeration 4.0
    /// removed at iteration 100.
    #[must_use]
    pub fn new() -> Self {
        Self {
            perplexity: 30.0,
            n_components: 2,
            n_iter: 1000,
            eta: 500.0,
            initial_momentum: 0.5,
            final_momentum: 0.8,
            early_exaggeration: 4.0,
            gain_fraction: 0.2,
            momentum_switch_iter: 20,
            exaggeration_end_iter: 100,
            max_bisection_tries: 50,
            bisection_tol: 1e-5,
            min_gain: 0.01,
            input_is_distance: false,
        }
    }

    /// Set perplexity (balance between local and global structure).
    ///
    /// Typical range: 5-50. Higher perplexity considers more neighbors.
    #[must_use]
    pub fn with_perplexity(mut self, perplexity: f64) -> Self {
        self.perplexity = perplexity;
        self
    }

    /// Set output dimensionality.
    #[must_use]
    pub fn with_n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    /// Set the gradient descent iteration budget.
    #[must_use]
    pub fn with_n_iter(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    /// Set the gradient step size.
    #[must_use]
    pub fn with_eta(mut self, eta: f64) -> Self {
        self.eta = eta;
        self
    }

    /// Set the momentum schedule.
    #[must_use]
    pub fn with_momentum(mut self, initial: f64, final_: f64, switch_iter: usize) -> Self {
        self.initial_momentum = initial;
        self.final_momentum = final_;
        self.momentum_switch_iter = switch_iter;
        self
    }

    /// Set the early-exaggeration factor and the iteration that ends it.
    #[must_use]
    pub fn with_early_exaggeration(mut self, factor: f64, end_iter: usize) -> Self {
        self.early_exaggeration = factor;
        self.exaggeration_end_iter = end_iter;
        self
    }

    /// Set the gain-adaptation fraction.
    #[must_use]
    pub fn with_gain_fraction(mut self, gain_fraction: f64) -> Self {
        self.gain_fraction = gain_fraction;
        self
    }

    /// Set the per-point bisection budget and tolerance.
    #[must_use]
    pub fn with_bisection(mut self, max_tries: usize, tol: f64) -> Self {
        self.max_bisection_tries = max_tries;
        self.bisection_tol = tol;
        self
    }

    /// Treat the input matrix as precomputed pairwise distances rather than
    /// raw feature vectors.
    #[must_use]
    pub fn with_distance_input(mut self, input_is_distance: bool) -> Self {
        self.input_is_distance = input_is_distance;
        self
    }

    /// Get output dimensionality.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Project `x` starting from the caller-supplied layout `y0` (n x k).
    ///
    /// `x` is either an n x m feature matrix or, with
    /// [`with_distance_input`](Self::with_distance_input), an n x n pairwise
    /// distance matrix. Returns the final layout after `n_iter` iterations.
    ///
    /// # Errors
    ///
    /// Returns an error on dimension mismatches or invalid hyperparameters.
    /// Validation runs before any mutation.
    pub fn project(&self, x: &Matrix<f64>, y0: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.validate(x, y0)?;

        let n = x.n_rows();
        let k = self.n_components;

        let dist_sq = self.input_squared_distances(x);
        let mut p = self.joint_probabilities(&dist_sq, n);

        let mut y: Vec<f64> = y0.as_slice().to_vec();
        let mut velocity = vec![0.0; n * k];
        let mut gains = vec![1.0; n * k];
        let mut q_kernel = vec![0.0; n * n];
        let mut gradient = vec![0.0; n * k];

        for iter in 0..self.n_iter {
            let q = self.low_dim_affinities(&y, n, &mut q_kernel);
            self.kl_gradient(&y, &p, &q, &q_kernel, n, &mut gradient);

            let momentum = if iter < self.momentum_switch_iter {
                self.initial_momentum
            } else {
                self.final_momentum
            };

            for i in 0..n * k {
                // Gain grows additively while the gradient sign disagrees
                // with the previous step, shrinks multiplicatively when it
                // agrees.
                let g = if (gradient[i] > 0.0) != (velocity[i] > 0.0) {
                    gains[i] + self.gain_fraction
                } else {
                    gains[i] * (1.0 - self.gain_fraction)
                };
                gains[i] = g.max(self.min_gain);

                velocity[i] = momentum * velocity[i] - self.eta * (gains[i] * gradient[i]);
                y[i] += velocity[i];
            }

            recenter(&mut y, n, k);

            if iter == self.exaggeration_end_iter {
                for entry in &mut p {
                    *entry /= self.early_exaggeration;
                }
            }
        }

        Matrix::from_vec(n, k, y).map_err(Into::into)
    }

    fn validate(&self, x: &Matrix<f64>, y0: &Matrix<f64>) -> Result<()> {
        let n = x.n_rows();

        if self.perplexity <= 0.0 || !self.perplexity.is_finite() {
            return Err(ProyectarError::invalid_hyperparameter(
                "perplexity",
                self.perplexity,
                "> 0",
            ));
        }
        if self.n_components == 0 {
            return Err(ProyectarError::invalid_hyperparameter(
                "n_components",
                self.n_components,
                ">= 1",
            ));
        }
        if self.eta <= 0.0 || !self.eta.is_finite() {
            return Err(ProyectarError::invalid_hyperparameter(
                "eta", self.eta, "> 0",
            ));
        }
        if !(0.0..1.0).contains(&self.gain_fraction) {
            return Err(ProyectarError::invalid_hyperparameter(
                "gain_fraction",
                self.gain_fraction,
                "in [0, 1)",
            ));
        }
        if self.early_exaggeration <= 0.0 {
            return Err(ProyectarError::invalid_hyperparameter(
                "early_exaggeration",
                self.early_exaggeration,
                "> 0",
            ));
        }
        if self.input_is_distance && x.n_cols() != n {
            return Err(ProyectarError::DimensionMismatch {
                expected: format!("{n}x{n} distance matrix"),
                actual: format!("{}x{}", n, x.n_cols()),
            });
        }
        if y0.shape() != (n, self.n_components) {
            return Err(ProyectarError::DimensionMismatch {
                expected: format!("{n}x{} initial layout", self.n_components),
                actual: format!("{}x{}", y0.n_rows(), y0.n_cols()),
            });
        }

        Ok(())
    }

    /// Squared pairwise distances of the input, n x n row-major.
    fn input_squared_distances(&self, x: &Matrix<f64>) -> Vec<f64> {
        let n = x.n_rows();
        let m = x.n_cols();
        let mut dist_sq = vec![0.0; n * n];

        if self.input_is_distance {
            for i in 0..n {
                for j in 0..n {
                    let d = x.get(i, j);
                    dist_sq[i * n + j] = d * d;
                }
            }
        } else {
            for i in 0..n {
                for j in (i + 1)..n {
                    let mut acc = 0.0;
                    for c in 0..m {
                        let diff = x.get(i, c) - x.get(j, c);
                        acc += diff * diff;
                    }
                    dist_sq[i * n + j] = acc;
                    dist_sq[j * n + i] = acc;
                }
            }
        }

        dist_sq
    }

    /// Calibrated conditional probabilities, one row per point.
    ///
    /// Rows are independent, so calibration fans out across a thread pool
    /// with each task writing only its own row.
    fn conditional_probabilities(&self, dist_sq: &[f64], n: usize) -> Vec<f64> {
        let target_entropy = self.perplexity.ln();

        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                let row = &dist_sq[i * n..(i + 1) * n];
                calibration::calibrate_row(
                    row,
                    i,
                    target_entropy,
                    self.bisection_tol,
                    self.max_bisection_tries,
                )
                .probabilities
            })
            .collect();

        let mut p = vec![0.0; n * n];
        for (i, row) in rows.into_iter().enumerate() {
            p[i * n..(i + 1) * n].copy_from_slice(&row);
        }
        p
    }

    /// Symmetrized, normalized and exaggerated joint distribution P.
    fn joint_probabilities(&self, dist_sq: &[f64], n: usize) -> Vec<f64> {
        let conditional = self.conditional_probabilities(dist_sq, n);

        let mut p = vec![0.0; n * n];
        let mut total = 0.0;
        for i in 0..n {
            for j in 0..n {
                let v = conditional[i * n + j] + conditional[j * n + i];
                p[i * n + j] = v;
                total += v;
            }
        }

        for entry in &mut p {
            *entry = (*entry / total * self.early_exaggeration).max(PROBABILITY_FLOOR);
        }
        p
    }

    /// Student-t affinities Q of the current layout. `kernel` receives the
    /// unnormalized weights `1 / (1 + dist^2)`, needed again by the gradient.
    fn low_dim_affinities(&self, y: &[f64], n: usize, kernel: &mut [f64]) -> Vec<f64> {
        let k = self.n_components;
        let mut total = 0.0;

        for i in 0..n {
            kernel[i * n + i] = 0.0;
            for j in (i + 1)..n {
                let mut dist_sq = 0.0;
                for c in 0..k {
                    let diff = y[i * k + c] - y[j * k + c];
                    dist_sq += diff * diff;
                }
                let w = 1.0 / (1.0 + dist_sq);
                kernel[i * n + j] = w;
                kernel[j * n + i] = w;
                total += 2.0 * w;
            }
        }

        let mut q = vec![0.0; n * n];
        if total > 0.0 {
            for idx in 0..n * n {
                q[idx] = (kernel[idx] / total).max(PROBABILITY_FLOOR);
            }
        }
        q
    }

    /// KL-divergence gradient: attract under-represented neighbors, repel
    /// over-represented ones, weighted by the Student-t kernel.
    fn kl_gradient(
        &self,
        y: &[f64],
        p: &[f64],
        q: &[f64],
        kernel: &[f64],
        n: usize,
        gradient: &mut [f64],
    ) {
        let k = self.n_components;
        gradient.fill(0.0);

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let factor = (p[i * n + j] - q[i * n + j]) * kernel[i * n + j];
                for c in 0..k {
                    gradient[i * k + c] += factor * (y[i * k + c] - y[j * k + c]);
                }
            }
        }
    }
}

/// Subtracts the column-wise mean so the layout carries no net translation.
fn recenter(y: &mut [f64], n: usize, k: usize) {
    if n == 0 {
        return;
    }
    for c in 0..k {
        let mut mean = 0.0;
        for i in 0..n {
            mean += y[i * k + c];
        }
        mean /= n as f64;
        for i in 0..n {
            y[i * k + c] -= mean;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cluster_data() -> Matrix<f64> {
        Matrix::from_vec(
            6,
            3,
            vec![
                0.0, 0.0, 0.0, //
                0.1, 0.0, 0.1, //
                0.0, 0.1, 0.0, //
                5.0, 5.0, 5.0, //
                5.1, 5.0, 5.1, //
                5.0, 5.1, 5.0,
            ],
        )
        .expect("matrix")
    }

    fn small_init(n: usize, k: usize) -> Matrix<f64> {
        // Deterministic, small, not symmetric around any axis.
        let data: Vec<f64> = (0..n * k)
            .map(|i| ((i * 37 + 11) % 17) as f64 * 1e-3 - 8e-3)
            .collect();
        Matrix::from_vec(n, k, data).expect("matrix")
    }

    #[test]
    fn test_joint_probabilities_symmetric_and_sum_to_one() {
        let tsne = Tsne::new().with_perplexity(2.0);
        let x = two_cluster_data();
        let n = x.n_rows();
        let dist_sq = tsne.input_squared_distances(&x);
        let p = tsne.joint_probabilities(&dist_sq, n);

        // Undo the exaggeration factor before checking normalization.
        let total: f64 = p.iter().map(|v| v / tsne.early_exaggeration).sum();
        assert!(
            (total - 1.0).abs() < 1e-6,
            "P should sum to 1 before exaggeration, got {total}"
        );

        for i in 0..n {
            for j in 0..n {
                assert!(
                    (p[i * n + j] - p[j * n + i]).abs() < 1e-12,
                    "P must be symmetric"
                );
                assert!(p[i * n + j] >= PROBABILITY_FLOOR);
            }
        }
    }

    #[test]
    fn test_low_dim_affinities_normalized_and_floored() {
        let tsne = Tsne::new();
        let n = 4;
        let y = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let mut kernel = vec![0.0; n * n];
        let q = tsne.low_dim_affinities(&y, n, &mut kernel);

        let off_diag_sum: f64 = (0..n * n)
            .filter(|idx| idx / n != idx % n)
            .map(|idx| q[idx])
            .sum();
        assert!((off_diag_sum - 1.0).abs() < 1e-9);
        for idx in 0..n * n {
            assert!(q[idx] >= 0.0);
            if idx / n != idx % n {
                assert!(q[idx] >= PROBABILITY_FLOOR);
            }
        }
    }

    #[test]
    fn test_project_output_shape_and_finite() {
        let x = two_cluster_data();
        let y0 = small_init(6, 2);
        let tsne = Tsne::new().with_perplexity(2.0).with_n_iter(30);
        let y = tsne.project(&x, &y0).expect("valid inputs");

        assert_eq!(y.shape(), (6, 2));
        for &v in y.as_slice() {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_project_is_recentered() {
        let x = two_cluster_data();
        let y0 = small_init(6, 2);
        let tsne = Tsne::new().with_perplexity(2.0).with_n_iter(25);
        let y = tsne.project(&x, &y0).expect("valid inputs");

        for c in 0..2 {
            let mean: f64 = (0..6).map(|i| y.get(i, c)).sum::<f64>() / 6.0;
            assert!(mean.abs() < 1e-9, "column {c} mean {mean} should be ~0");
        }
    }

    #[test]
    fn test_distance_input_matches_feature_input() {
        let x = two_cluster_data();
        let n = x.n_rows();

        // Euclidean distances of the same data.
        let mut d = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                let mut acc = 0.0;
                for c in 0..x.n_cols() {
                    let diff = x.get(i, c) - x.get(j, c);
                    acc += diff * diff;
                }
                d.set(i, j, acc.sqrt());
            }
        }

        let y0 = small_init(n, 2);
        let from_features = Tsne::new()
            .with_perplexity(2.0)
            .with_n_iter(20)
            .project(&x, &y0)
            .expect("valid inputs");
        let from_distances = Tsne::new()
            .with_perplexity(2.0)
            .with_n_iter(20)
            .with_distance_input(true)
            .project(&d, &y0)
            .expect("valid inputs");

        for i in 0..n {
            for c in 0..2 {
                assert!(
                    (from_features.get(i, c) - from_distances.get(i, c)).abs() < 1e-6,
                    "feature and distance inputs should agree"
                );
            }
        }
    }

    #[test]
    fn test_separates_two_clusters() {
        let x = two_cluster_data();
        let y0 = small_init(6, 2);
        let tsne = Tsne::new()
            .with_perplexity(2.0)
            .with_n_iter(300)
            .with_eta(100.0);
        let y = tsne.project(&x, &y0).expect("valid inputs");

        // Mean within-cluster distance should be well below the
        // between-cluster distance of the embedded points.
        let dist = |a: usize, b: usize| -> f64 {
            let dx = y.get(a, 0) - y.get(b, 0);
            let dy = y.get(a, 1) - y.get(b, 1);
            (dx * dx + dy * dy).sqrt()
        };
        let within = (dist(0, 1) + dist(1, 2) + dist(3, 4) + dist(4, 5)) / 4.0;
        let between = (dist(0, 3) + dist(1, 4) + dist(2, 5)) / 3.0;
        assert!(
            between > within,
            "clusters should separate: between={between}, within={within}"
        );
    }

    #[test]
    fn test_exaggeration_removed_once() {
        // With the phase end inside the budget, P is rescaled exactly once;
        // the run must stay finite and keep its shape.
        let x = two_cluster_data();
        let y0 = small_init(6, 2);
        let tsne = Tsne::new()
            .with_perplexity(2.0)
            .with_n_iter(120)
            .with_early_exaggeration(4.0, 100);
        let y = tsne.project(&x, &y0).expect("valid inputs");
        for &v in y.as_slice() {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_rejects_bad_perplexity() {
        let x = two_cluster_data();
        let y0 = small_init(6, 2);
        let result = Tsne::new().with_perplexity(0.0).project(&x, &y0);
        assert!(matches!(
            result,
            Err(ProyectarError::InvalidHyperparameter { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_components() {
        let x = two_cluster_data();
        let y0 = small_init(6, 2);
        let result = Tsne::new().with_n_components(0).project(&x, &y0);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_mismatched_init_layout() {
        let x = two_cluster_data();
        let y0 = small_init(5, 2);
        let result = Tsne::new().with_perplexity(2.0).project(&x, &y0);
        assert!(matches!(
            result,
            Err(ProyectarError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_non_square_distance_input() {
        let x = two_cluster_data(); // 6x3, not 6x6
        let y0 = small_init(6, 2);
        let result = Tsne::new()
            .with_perplexity(2.0)
            .with_distance_input(true)
            .project(&x, &y0);
        assert!(result.is_err());
    }

    #[test]
    fn test_three_component_embedding() {
        let x = two_cluster_data();
        let y0 = small_init(6, 3);
        let tsne = Tsne::new()
            .with_perplexity(2.0)
            .with_n_components(3)
            .with_n_iter(15);
        let y = tsne.project(&x, &y0).expect("valid inputs");
        assert_eq!(y.shape(), (6, 3));
    }

    #[test]
    fn test_zero_iterations_returns_initial_layout() {
        let x = two_cluster_data();
        let y0 = small_init(6, 2);
        let y = Tsne::new()
            .with_perplexity(2.0)
            .with_n_iter(0)
            .project(&x, &y0)
            .expect("valid inputs");
        assert_eq!(y, y0);
    }
}
