//! Classic ddmin (1-minimality).
//!
//! # Algorithm
//!
//! Start at granularity `n = 2` and split the working set into chunks of
//! `ceil(len / n)` consecutive items (the last chunk takes the remainder).
//!
//! 1. Test keeping each chunk alone, in chunk order.
//! 2. With more than two chunks, test each complement, in chunk order.
//!    (With exactly two chunks the complements are the chunks themselves.)
//! 3. The first accepted candidate becomes the working set and `n` resets
//!    to 2.
//! 4. Otherwise, if `n` already equals the working-set size the set is
//!    1-minimal and the run ends; else `n = min(2n, len)`.
//!
//! Sets with at most one item are returned without testing.

use tracing::{debug, instrument};

use crate::dd::{DdAlgorithm, DdResult, accepts, result_from};
use crate::error::DdError;
use crate::outcome::PropertyTester;

/// Deterministic ddmin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DdMin;

impl DdMin {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<C, T: Clone> DdAlgorithm<C, T> for DdMin {
    #[instrument(name = "ddmin", skip_all, fields(items = items.len()))]
    fn minimize(
        &mut self,
        ctx: &mut C,
        items: Vec<T>,
        tester: &mut dyn PropertyTester<C, T>,
    ) -> Result<DdResult<T>, DdError> {
        let mut current: Vec<usize> = (0..items.len()).collect();
        let mut granularity = 2usize;

        while current.len() > 1 {
            let chunks = partition(&current, granularity);

            if let Some(reduced) = reduce(ctx, tester, &items, &chunks)? {
                debug!(
                    from = current.len(),
                    to = reduced.len(),
                    granularity,
                    "ddmin reduced"
                );
                current = reduced;
                granularity = 2;
                continue;
            }

            if granularity >= current.len() {
                break;
            }
            granularity = (granularity * 2).min(current.len());
        }

        Ok(result_from(&items, &current))
    }
}

/// Split `current` into at most `granularity` contiguous chunks.
fn partition(current: &[usize], granularity: usize) -> Vec<Vec<usize>> {
    let chunk_len = current.len().div_ceil(granularity).max(1);
    current.chunks(chunk_len).map(<[usize]>::to_vec).collect()
}

/// Try every chunk, then every complement; return the first accepted
/// candidate.
fn reduce<C, T: Clone>(
    ctx: &mut C,
    tester: &mut dyn PropertyTester<C, T>,
    items: &[T],
    chunks: &[Vec<usize>],
) -> Result<Option<Vec<usize>>, DdError> {
    for chunk in chunks {
        if accepts(ctx, tester, items, chunk)? {
            return Ok(Some(chunk.clone()));
        }
    }

    if chunks.len() > 2 {
        for skip in 0..chunks.len() {
            let complement: Vec<usize> = chunks
                .iter()
                .enumerate()
                .filter(|&(idx, _)| idx != skip)
                .flat_map(|(_, chunk)| chunk.iter().copied())
                .collect();
            if accepts(ctx, tester, items, &complement)? {
                return Ok(Some(complement));
            }
        }
    }

    Ok(None)
}
