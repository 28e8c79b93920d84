//! Overflow-safe distance computations.
//!
//! The iterative engines clamp and divide by inter-point distances every
//! inner step, so the norm must stay accurate for coordinates far outside
//! the range where naive squaring overflows or underflows.

/// Euclidean norm of the 2-vector `(dx, dy)`, safe against overflow and
/// underflow of the intermediate squares.
///
/// Follows IEEE semantics: NaN inputs propagate, a true infinite input
/// saturates to `f64::INFINITY`, and coincident points yield exactly 0.
///
/// # Examples
///
/// ```
/// use proyectar::numeric::hypot2;
///
/// assert!((hypot2(3.0, 4.0) - 5.0).abs() < 1e-12);
/// assert!(hypot2(1e150, 1e150).is_finite());
/// ```
#[must_use]
pub fn hypot2(dx: f64, dy: f64) -> f64 {
    let a = dx.abs();
    let b = dy.abs();

    if a.is_infinite() || b.is_infinite() {
        return f64::INFINITY;
    }
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }

    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if hi == 0.0 {
        return 0.0;
    }

    // Scale by the larger component so the ratio square cannot overflow.
    let r = lo / hi;
    hi * (1.0 + r * r).sqrt()
}
