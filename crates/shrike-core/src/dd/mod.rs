//! Linear delta debugging algorithms.
//!
//! # Overview
//!
//! Every algorithm implements [`DdAlgorithm`]: it receives the caller's
//! context, the items to minimize and a [`PropertyTester`], and returns the
//! split of the input into retained and deleted items.
//!
//! ```text
//! LoggingDd            counts outcomes, logs before/after/ratio
//!   └─ ZeroTestDd      re-tests the empty set once after convergence
//!        └─ DdMin | ProbabilisticDd
//! ```
//!
//! Decorators hold their inner algorithm by value and implement the same
//! trait, so `Box<dyn DdAlgorithm<C, T>>` can carry any composition.
//!
//! ## Tester calling convention
//!
//! Algorithms address items by their position in the input list. For each
//! candidate the tester sees the retained items and every other input item
//! as deleted, both in input order. Tester errors abort the run as
//! [`DdError::Tester`]; `Unknown` outcomes are treated as rejections.

pub mod ddmin;
pub mod logging;
pub mod probabilistic;
pub mod zero;

pub use ddmin::DdMin;
pub use logging::{DdStats, LoggingDd};
pub use probabilistic::ProbabilisticDd;
pub use zero::ZeroTestDd;

use tracing::{trace, warn};

use crate::error::DdError;
use crate::outcome::{PropertyOutcome, PropertyTester};

/// A delta debugging algorithm over a flat list of items.
pub trait DdAlgorithm<C, T> {
    /// Minimize `items` while `tester` keeps reporting
    /// [`PropertyOutcome::Present`].
    ///
    /// # Errors
    ///
    /// Returns [`DdError::Tester`] as soon as the tester fails.
    fn minimize(
        &mut self,
        ctx: &mut C,
        items: Vec<T>,
        tester: &mut dyn PropertyTester<C, T>,
    ) -> Result<DdResult<T>, DdError>;
}

impl<C, T, D> DdAlgorithm<C, T> for Box<D>
where
    D: DdAlgorithm<C, T> + ?Sized,
{
    fn minimize(
        &mut self,
        ctx: &mut C,
        items: Vec<T>,
        tester: &mut dyn PropertyTester<C, T>,
    ) -> Result<DdResult<T>, DdError> {
        (**self).minimize(ctx, items, tester)
    }
}

impl<C, T, D> DdAlgorithm<C, T> for &mut D
where
    D: DdAlgorithm<C, T> + ?Sized,
{
    fn minimize(
        &mut self,
        ctx: &mut C,
        items: Vec<T>,
        tester: &mut dyn PropertyTester<C, T>,
    ) -> Result<DdResult<T>, DdError> {
        (**self).minimize(ctx, items, tester)
    }
}

/// Split of a minimized input. Both halves keep the input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdResult<T> {
    pub retained: Vec<T>,
    pub deleted: Vec<T>,
}

impl<T> DdResult<T> {
    /// A result that keeps every item.
    #[must_use]
    pub const fn keep_all(items: Vec<T>) -> Self {
        Self {
            retained: items,
            deleted: Vec::new(),
        }
    }

    /// Total number of items the run started from.
    #[must_use]
    pub const fn input_len(&self) -> usize {
        self.retained.len() + self.deleted.len()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Split `items` into (retained, deleted) according to the kept positions.
pub(crate) fn split<T: Clone>(items: &[T], keep: &[usize]) -> (Vec<T>, Vec<T>) {
    let mut kept = vec![false; items.len()];
    for &idx in keep {
        kept[idx] = true;
    }

    let mut retained = Vec::with_capacity(keep.len());
    let mut deleted = Vec::with_capacity(items.len().saturating_sub(keep.len()));
    for (item, keep) in items.iter().zip(kept) {
        if keep {
            retained.push(item.clone());
        } else {
            deleted.push(item.clone());
        }
    }
    (retained, deleted)
}

pub(crate) fn result_from<T: Clone>(items: &[T], keep: &[usize]) -> DdResult<T> {
    let (retained, deleted) = split(items, keep);
    DdResult { retained, deleted }
}

/// Ask the tester about keeping only the positions in `keep`.
///
/// Returns `true` only for [`PropertyOutcome::Present`].
pub(crate) fn accepts<C, T: Clone>(
    ctx: &mut C,
    tester: &mut dyn PropertyTester<C, T>,
    items: &[T],
    keep: &[usize],
) -> Result<bool, DdError> {
    let (retained, deleted) = split(items, keep);
    let outcome = tester
        .test(ctx, &retained, &deleted)
        .map_err(DdError::Tester)?;

    trace!(retained = retained.len(), deleted = deleted.len(), %outcome, "property test");
    if outcome == PropertyOutcome::Unknown {
        warn!(
            retained = retained.len(),
            "property tester could not decide; treating candidate as rejected"
        );
    }
    Ok(outcome.is_present())
}
