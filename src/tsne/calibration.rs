//! Per-point kernel-width calibration.
//!
//! For each input row the Gaussian kernel precision `beta` is searched by
//! bisection until the entropy of the induced conditional distribution
//! matches `ln(perplexity)`. The search never fails: exhausting the try
//! budget returns the best width found so far.

/// Outcome of calibrating one row.
#[derive(Debug, Clone)]
pub(crate) struct CalibratedRow {
    /// Kernel precision `beta = 1 / (2 * sigma^2)`.
    pub beta: f64,
    /// Normalized conditional probabilities, zero at `self_index`.
    pub probabilities: Vec<f64>,
    /// Bisection steps actually taken.
    pub tries: usize,
}

/// Calibrates the kernel width for one row of squared distances.
///
/// `dist_sq` holds squared distances from this point to every point
/// (including itself at `self_index`, which is ignored). The returned row
/// is normalized over the non-self entries.
pub(crate) fn calibrate_row(
    dist_sq: &[f64],
    self_index: usize,
    target_entropy: f64,
    tol: f64,
    max_tries: usize,
) -> CalibratedRow {
    let mut probabilities = vec![0.0; dist_sq.len()];

    let mut beta_min = f64::NEG_INFINITY;
    let mut beta_max = f64::INFINITY;
    let mut beta = 1.0;

    let mut entropy = row_entropy(dist_sq, self_index, beta, &mut probabilities);
    let mut diff = entropy - target_entropy;
    let mut tries = 0;

    // Best evaluation so far; the final bisection step can land in a region
    // where the kernel underflows, so the row handed back is always the one
    // whose entropy came closest to the target.
    let mut best = CalibratedRow {
        beta,
        probabilities: probabilities.clone(),
        tries,
    };
    let mut best_diff = diff.abs();

    while diff.abs() > tol && tries < max_tries {
        if diff > 0.0 {
            // Distribution too spread out: sharpen the kernel.
            beta_min = beta;
            beta = if beta_max.is_infinite() {
                beta * 2.0
            } else {
                (beta + beta_max) / 2.0
            };
        } else {
            beta_max = beta;
            beta = if beta_min.is_infinite() {
                beta / 2.0
            } else {
                (beta + beta_min) / 2.0
            };
        }

        entropy = row_entropy(dist_sq, self_index, beta, &mut probabilities);
        diff = entropy - target_entropy;
        tries += 1;

        if diff.abs() < best_diff {
            best_diff = diff.abs();
            best.beta = beta;
            best.probabilities.copy_from_slice(&probabilities);
            best.tries = tries;
        }
    }

    best.tries = tries;
    best
}

/// Shannon entropy of the kernel-weighted distribution for a given `beta`,
/// filling `out` with the normalized probabilities as a side effect.
///
/// Uses the shifted-exponential form `h = ln(sum) + beta * E[d]` which
/// avoids computing `p * ln(p)` term by term.
fn row_entropy(dist_sq: &[f64], self_index: usize, beta: f64, out: &mut [f64]) -> f64 {
    let mut sum = 0.0;
    let mut weighted = 0.0;

    for (j, &d) in dist_sq.iter().enumerate() {
        if j == self_index {
            out[j] = 0.0;
            continue;
        }
        let p = (-beta * d).exp();
        out[j] = p;
        sum += p;
        weighted += d * p;
    }

    if sum <= 0.0 {
        // Kernel collapsed (beta far too large); report zero entropy so the
        // bisection lowers beta on the next step.
        for p in out.iter_mut() {
            *p = 0.0;
        }
        return 0.0;
    }

    for p in out.iter_mut() {
        *p /= sum;
    }

    sum.ln() + beta * weighted / sum
}
