//! Force Scheme: stress-majorization projection.
//!
//! Iteratively relaxes a 2-D layout so realized pairwise distances approach
//! a target dissimilarity matrix. Each outer iteration walks every ordered
//! pair of distinct points in a fresh random order and moves the second
//! point of the pair directly along the line connecting it to the first,
//! proportionally to the distance error.

use crate::error::{ProyectarError, Result};
use crate::numeric::hypot2;
use crate::primitives::Matrix;
use crate::scheduler::VisitOrder;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Force Scheme stress-majorization engine.
///
/// # Algorithm
///
/// 1. Draw a fresh random permutation of point indices (outer order)
/// 2. For each point `a`, draw another fresh permutation (inner order)
/// 3. Move every other point `b` toward satisfying `target(a, b)`
/// 4. Stop when the summed |delta| stabilizes within `tolerance`,
///    or after `max_iter` iterations
///
/// # Examples
///
/// ```
/// use proyectar::prelude::*;
///
/// // Two points 1.0 apart that should be 2.0 apart.
/// let y0 = Matrix::from_vec(2, 2, vec![0.0, 0.0, 1.0, 0.0]).expect("matrix");
/// let d = Matrix::from_vec(2, 2, vec![0.0, 2.0, 2.0, 0.0]).expect("matrix");
///
/// let fs = ForceScheme::new().with_random_state(42);
/// let y = fs.project(&y0, &d).expect("valid inputs");
/// assert_eq!(y.shape(), (2, 2));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceScheme {
    /// Maximum number of outer iterations.
    max_iter: usize,
    /// Early-termination threshold on the change of the delta sum.
    tolerance: f64,
    /// Lower clamp for inter-point distances in denominators.
    epsilon: f64,
    /// Damping divisor applied to every displacement (must be > 0).
    fraction: f64,
    /// Random seed for the visit order.
    random_state: Option<u64>,
}

/// Convergence diagnostics from a Force Scheme run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceSchemeReport {
    /// Final 2-D layout.
    pub embedding: Matrix<f64>,
    /// Accumulated |delta| of the last completed outer iteration.
    pub delta_sum: f64,
    /// Number of outer iterations actually run.
    pub n_iter: usize,
    /// True when the run stopped on `tolerance` rather than `max_iter`.
    pub converged: bool,
}

impl Default for ForceScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceScheme {
    /// Create a Force Scheme engine with default parameters.
    ///
    /// Default: max_iter=50, tolerance=1e-3, epsilon=1e-5, fraction=8.0
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_iter: 50,
            tolerance: 1e-3,
            epsilon: 1e-5,
            fraction: 8.0,
            random_state: None,
        }
    }

    /// Set the maximum number of outer iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the early-termination tolerance on the delta-sum change.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the minimum distance used in denominators.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the damping divisor (larger values move points more slowly).
    #[must_use]
    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = fraction;
        self
    }

    /// Set random seed for reproducible visit orders.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Project `y0` against the target dissimilarity matrix `d`.
    ///
    /// `y0` is the caller-supplied initial 2-D layout (n x 2); `d` is the
    /// symmetric n x n target distance matrix. Returns the final layout.
    ///
    /// # Errors
    ///
    /// Returns an error on dimension mismatches, an asymmetric or negative
    /// target matrix, or non-positive `fraction`/`epsilon`. Validation runs
    /// before any mutation.
    pub fn project(&self, y0: &Matrix<f64>, d: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.project_with_report(y0, d).map(|r| r.embedding)
    }

    /// Like [`project`](Self::project), but also returns convergence
    /// diagnostics (final delta sum, iterations run).
    ///
    /// # Errors
    ///
    /// Same contract as [`project`](Self::project).
    pub fn project_with_report(&self, y0: &Matrix<f64>, d: &Matrix<f64>) -> Result<ForceSchemeReport> {
        self.validate(y0, d)?;

        let n = y0.n_rows();
        let mut y = y0.clone();
        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut outer = VisitOrder::new(n);
        let mut inner = VisitOrder::new(n);

        let mut prev_delta_sum = f64::INFINITY;
        let mut delta_sum = 0.0;
        let mut n_iter = 0;
        let mut converged = false;

        for _ in 0..self.max_iter {
            delta_sum = 0.0;

            outer.reshuffle(&mut rng);
            for &a in outer.indices() {
                inner.reshuffle(&mut rng);
                for &b in inner.indices() {
                    if a == b {
                        continue;
                    }

                    let dx = y.get(b, 0) - y.get(a, 0);
                    let dy = y.get(b, 1) - y.get(a, 1);
                    let dist = hypot2(dx, dy).max(self.epsilon);

                    let delta = (d.get(a, b) - dist) / self.fraction;
                    delta_sum += delta.abs();

                    y.set(b, 0, y.get(b, 0) + delta * (dx / dist));
                    y.set(b, 1, y.get(b, 1) + delta * (dy / dist));
                }
            }

            n_iter += 1;
            if (prev_delta_sum - delta_sum).abs() < self.tolerance {
                converged = true;
                break;
            }
            prev_delta_sum = delta_sum;
        }

        Ok(ForceSchemeReport {
            embedding: y,
            delta_sum,
            n_iter,
            converged,
        })
    }

    fn validate(&self, y0: &Matrix<f64>, d: &Matrix<f64>) -> Result<()> {
        let n = y0.n_rows();

        if y0.n_cols() != 2 {
            return Err(ProyectarError::DimensionMismatch {
                expected: format!("{n}x2 layout"),
                actual: format!("{}x{}", n, y0.n_cols()),
            });
        }
        if d.shape() != (n, n) {
            return Err(ProyectarError::DimensionMismatch {
                expected: format!("{n}x{n} distance matrix"),
                actual: format!("{}x{}", d.n_rows(), d.n_cols()),
            });
        }
        if self.fraction <= 0.0 || !self.fraction.is_finite() {
            return Err(ProyectarError::invalid_hyperparameter(
                "fraction",
                self.fraction,
                "> 0",
            ));
        }
        if self.epsilon <= 0.0 || !self.epsilon.is_finite() {
            return Err(ProyectarError::invalid_hyperparameter(
                "epsilon",
                self.epsilon,
                "> 0",
            ));
        }
        if self.tolerance < 0.0 {
            return Err(ProyectarError::invalid_hyperparameter(
                "tolerance",
                self.tolerance,
                ">= 0",
            ));
        }

        // Off-diagonal entries must form a symmetric, non-negative
        // dissimilarity; the diagonal is never read.
        for i in 0..n {
            for j in (i + 1)..n {
                let dij = d.get(i, j);
                let dji = d.get(j, i);
                if dij < 0.0 || dji < 0.0 {
                    return Err(ProyectarError::invalid_hyperparameter(
                        "target_distances",
                        format!("d[{i}][{j}] = {}", dij.min(dji)),
                        "non-negative entries",
                    ));
                }
                if (dij - dji).abs() > 1e-9 * dij.abs().max(dji.abs()).max(1.0) {
                    return Err(ProyectarError::DimensionMismatch {
                        expected: "symmetric distance matrix".to_string(),
                        actual: format!("d[{i}][{j}] = {dij}, d[{j}][{i}] = {dji}"),
                    });
                }
            }
        }

        Ok(())
    }
}
