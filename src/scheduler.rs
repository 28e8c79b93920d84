//! Randomized visit scheduling for the iterative engines.
//!
//! Force Scheme walks every ordered pair of points each iteration; a fixed
//! visit order introduces systematic directional drift in the layout, so a
//! fresh uniform permutation is drawn for every outer pass and again for
//! every inner pass.

use rand::Rng;

/// Shuffles `indices` in place with the Fisher-Yates algorithm.
///
/// Exactly `n - 1` exchanges, linear time, no allocation. Every permutation
/// is equally likely given an unbiased `Rng`.
pub fn shuffle_in_place<R: Rng + ?Sized>(indices: &mut [usize], rng: &mut R) {
    let n = indices.len();
    for i in 0..n.saturating_sub(1) {
        let j = rng.gen_range(i..n);
        indices.swap(i, j);
    }
}

/// An owned index sequence over `[0, n)` that can be re-randomized cheaply.
///
/// # Examples
///
/// ```
/// use proyectar::scheduler::VisitOrder;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut order = VisitOrder::new(5);
/// order.reshuffle(&mut rng);
/// let mut seen: Vec<usize> = order.indices().to_vec();
/// seen.sort_unstable();
/// assert_eq!(seen, vec![0, 1, 2, 3, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct VisitOrder {
    indices: Vec<usize>,
}

impl VisitOrder {
    /// Creates the identity order over `[0, n)`.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            indices: (0..n).collect(),
        }
    }

    /// Draws a fresh uniform permutation in place.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        shuffle_in_place(&mut self.indices, rng);
    }

    /// Current visit order.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of scheduled indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true for an empty schedule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
