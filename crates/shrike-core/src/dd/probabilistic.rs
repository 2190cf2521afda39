//! Probabilistic delta debugging.
//!
//! # Model
//!
//! Every item carries a probability `p` of being essential to the property.
//! An item is *settled* once `p` reaches 1.
//!
//! # Round
//!
//! 1. Order the unsettled items by ascending `p`; ties are broken by a
//!    shuffle from the seeded RNG.
//! 2. Pick the prefix of length `k` that maximizes the expected number of
//!    deleted items, `k · Π(1 − p_i)`.
//! 3. Test deleting the prefix. On success the prefix is gone. On failure
//!    each prefix probability becomes `p / (1 − Π(1 − p_i))`; a one-item
//!    prefix settles its item.
//!
//! Rounds repeat until every remaining item is settled. A final sweep then
//! retries every single removal until none succeeds, which yields the same
//! 1-minimality postcondition as [`crate::dd::DdMin`] even when an item was
//! settled against a larger set than the one finally returned.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use crate::dd::{DdAlgorithm, DdResult, accepts, result_from};
use crate::error::DdError;
use crate::outcome::PropertyTester;

/// Default prior probability that an item is essential.
pub const DEFAULT_INITIAL_PROBABILITY: f64 = 0.1;

/// Smallest and largest accepted prior.
const MIN_PROBABILITY: f64 = 1e-6;
const MAX_PROBABILITY: f64 = 1.0 - 1e-6;

/// Randomized delta debugging with per-item essentiality estimates.
#[derive(Debug, Clone)]
pub struct ProbabilisticDd {
    initial_probability: f64,
    final_sweep: bool,
    rng: StdRng,
}

impl ProbabilisticDd {
    /// Create a minimizer with the given prior, seeded from OS entropy.
    ///
    /// The prior is clamped into the open interval (0, 1).
    #[must_use]
    pub fn new(initial_probability: f64) -> Self {
        Self {
            initial_probability: initial_probability.clamp(MIN_PROBABILITY, MAX_PROBABILITY),
            final_sweep: true,
            rng: StdRng::from_entropy(),
        }
    }

    /// Make tie-breaking reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Enable or disable the closing single-removal sweep.
    #[must_use]
    pub const fn with_final_sweep(mut self, enabled: bool) -> Self {
        self.final_sweep = enabled;
        self
    }

    #[must_use]
    pub const fn initial_probability(&self) -> f64 {
        self.initial_probability
    }
}

impl Default for ProbabilisticDd {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_PROBABILITY)
    }
}

impl<C, T: Clone> DdAlgorithm<C, T> for ProbabilisticDd {
    #[instrument(name = "probabilistic_dd", skip_all, fields(items = items.len()))]
    fn minimize(
        &mut self,
        ctx: &mut C,
        items: Vec<T>,
        tester: &mut dyn PropertyTester<C, T>,
    ) -> Result<DdResult<T>, DdError> {
        let mut probability = vec![self.initial_probability; items.len()];
        let mut alive: Vec<usize> = (0..items.len()).collect();
        let mut rounds = 0usize;

        loop {
            let mut candidates: Vec<usize> = alive
                .iter()
                .copied()
                .filter(|&idx| probability[idx] < 1.0)
                .collect();
            if candidates.is_empty() {
                break;
            }
            rounds += 1;

            candidates.shuffle(&mut self.rng);
            // Stable sort: the shuffle decides between equal probabilities.
            candidates.sort_by(|&a, &b| probability[a].total_cmp(&probability[b]));
            let selected = &candidates[..best_prefix(&candidates, &probability)];

            let keep = without(&alive, selected);
            if accepts(ctx, tester, &items, &keep)? {
                debug!(
                    removed = selected.len(),
                    remaining = keep.len(),
                    "probabilistic dd reduced"
                );
                alive = keep;
            } else {
                raise_probabilities(&mut probability, selected);
            }
        }

        if self.final_sweep {
            alive = sweep(ctx, tester, &items, alive)?;
        }

        debug!(rounds, retained = alive.len(), "probabilistic dd converged");
        Ok(result_from(&items, &alive))
    }
}

/// Length of the prefix maximizing `k · Π(1 − p_i)`; at least 1.
#[allow(clippy::cast_precision_loss)]
fn best_prefix(sorted: &[usize], probability: &[f64]) -> usize {
    let mut survival = 1.0;
    let mut best_len = 1;
    let mut best_gain = f64::NEG_INFINITY;

    for (idx, &item) in sorted.iter().enumerate() {
        survival *= 1.0 - probability[item];
        let len = idx + 1;
        let gain = len as f64 * survival;
        if gain > best_gain {
            best_gain = gain;
            best_len = len;
        }
    }
    best_len
}

fn raise_probabilities(probability: &mut [f64], selected: &[usize]) {
    if let [only] = selected {
        probability[*only] = 1.0;
        return;
    }

    let survival: f64 = selected.iter().map(|&idx| 1.0 - probability[idx]).product();
    let failure = 1.0 - survival;
    for &idx in selected {
        probability[idx] = (probability[idx] / failure).min(1.0);
    }
}

/// Retry every single removal until a full pass removes nothing.
fn sweep<C, T: Clone>(
    ctx: &mut C,
    tester: &mut dyn PropertyTester<C, T>,
    items: &[T],
    mut alive: Vec<usize>,
) -> Result<Vec<usize>, DdError> {
    loop {
        let mut progressed = false;
        let mut cursor = 0;
        while cursor < alive.len() {
            let keep = without(&alive, &alive[cursor..=cursor]);
            if accepts(ctx, tester, items, &keep)? {
                alive = keep;
                progressed = true;
            } else {
                cursor += 1;
            }
        }
        if !progressed {
            return Ok(alive);
        }
    }
}

fn without(alive: &[usize], removed: &[usize]) -> Vec<usize> {
    alive
        .iter()
        .copied()
        .filter(|idx| !removed.contains(idx))
        .collect()
}
