//! Rank-biased parent selection.
//!
//! Parents are drawn from the fitness-sorted survivor range of the previous
//! generation by index, with a power-law bias toward index 0 (the fittest
//! stack): `index = floor(max * u^exponent)` for uniform `u` in `[0, 1)` and
//! `exponent > 1`. Compared with tournament or roulette selection this keeps
//! selection pressure gentle and costs O(1) per draw.

use rand::Rng;

/// Power-law index sampler over a ranked range `[0, max)`.
///
/// Lower indices — fitter stacks — are drawn more often; how much more is
/// controlled by the exponent.
#[derive(Debug, Clone, Copy)]
pub struct RankBias {
    exponent: f64,
}

impl RankBias {
    /// Creates a sampler with the given bias exponent (`> 1`).
    pub fn new(exponent: f64) -> Self {
        Self { exponent }
    }

    /// Draws one biased index from `[0, max)`.
    ///
    /// # Panics
    /// Panics if `max` is 0.
    pub fn pick<R: Rng>(&self, max: usize, rng: &mut R) -> usize {
        assert!(max > 0, "cannot select from an empty range");
        let u: f64 = rng.random_range(0.0..1.0);
        // u < 1 guarantees the result stays below max.
        (max as f64 * u.powf(self.exponent)) as usize
    }

    /// Draws a pair of distinct biased indices from `[0, max)`.
    ///
    /// The second index is redrawn until it differs from the first, so a
    /// stack is never bred with itself.
    ///
    /// # Panics
    /// Panics if `max < 2`.
    pub fn pick_pair<R: Rng>(&self, max: usize, rng: &mut R) -> (usize, usize) {
        assert!(max >= 2, "need at least 2 candidates to pick a pair");
        let first = self.pick(max, rng);
        let mut second = self.pick(max, rng);
        while second == first {
            second = self.pick(max, rng);
        }
        (first, second)
    }
}
