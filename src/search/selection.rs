//! Parent selection over a preference-ordered population.
//!
//! After survival the population is ordered best first, so selection works
//! on positions alone: position 0 is the most preferred individual.
//!
//! # References
//!
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use rand::Rng;

/// Selection strategy for choosing parents.
///
/// # Examples
///
/// ```
/// use u_mosa::search::Selection;
///
/// // Linear rank selection, best individual weighted 1.7x the average
/// let sel = Selection::Rank { bias: 1.7 };
///
/// // Tournament with size 3
/// let sel = Selection::Tournament(3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    /// Linear ranking on preference position.
    ///
    /// Position `i` of `n` gets weight `bias - 2·i·(bias - 1)/(n - 1)`:
    /// the best individual is `bias` times as likely as the average one and
    /// the worst `2 - bias` times. `bias` is clamped to `[1, 2]`.
    ///
    /// # Complexity
    /// O(n) per selection
    Rank { bias: f64 },

    /// Tournament selection: draw `k` positions at random, keep the best.
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Rank { bias: 1.7 }
    }
}

impl Selection {
    /// Selects a parent position from a population of `len` individuals
    /// ordered best first.
    ///
    /// # Panics
    ///
    /// Panics if `len < 2`.
    pub fn select<R: Rng>(&self, len: usize, rng: &mut R) -> usize {
        assert!(len >= 2, "selection requires at least 2 individuals, got {len}");

        match *self {
            Selection::Rank { bias } => rank(len, bias, rng),
            Selection::Tournament(k) => tournament(len, k, rng),
        }
    }
}

fn tournament<R: Rng>(len: usize, k: usize, rng: &mut R) -> usize {
    let mut best = rng.random_range(0..len);
    for _ in 1..k.max(1) {
        best = best.min(rng.random_range(0..len));
    }
    best
}

fn rank<R: Rng>(len: usize, bias: f64, rng: &mut R) -> usize {
    let bias = bias.clamp(1.0, 2.0);
    let step = 2.0 * (bias - 1.0) / (len - 1) as f64;

    // Weights sum to `len`.
    let threshold = rng.random_range(0.0..len as f64);
    let mut cumulative = 0.0;
    for i in 0..len {
        cumulative += bias - step * i as f64;
        if cumulative > threshold {
            return i;
        }
    }

    len - 1 // floating-point fallback
}
