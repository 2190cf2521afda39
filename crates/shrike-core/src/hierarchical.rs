//! Hierarchical delta debugging driver.
//!
//! # Overview
//!
//! Hierarchical DD minimizes a structured input one level at a time. A
//! [`HddGenerator`] owns the structure: it produces the first level, lends
//! the property tester that interprets a level's items, and derives the
//! next level from each minimized one. [`HierarchicalDd`] only drives the
//! loop:
//!
//! ```text
//! first_level ──► minimize ──► next_level ──► minimize ──► … ──► None
//!      │                                                          │
//!      └── None ───────────────────────────────────────────► done ◄┘
//! ```
//!
//! Levels run strictly in sequence. Between two levels the driver checks
//! its [`CancellationToken`]; a raised token ends the run with
//! [`DdError::Cancelled`] once the current level is done.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, instrument};

use crate::dd::{DdAlgorithm, DdResult};
use crate::error::DdError;
use crate::outcome::PropertyTester;

/// Items that make up one hierarchical round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HddLevel<T> {
    pub items: Vec<T>,
}

impl<T> HddLevel<T> {
    #[must_use]
    pub const fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> From<Vec<T>> for HddLevel<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

/// Source of levels for [`HierarchicalDd`].
pub trait HddGenerator<C, T> {
    /// The level to minimize first, or `None` when there is nothing to do.
    ///
    /// # Errors
    ///
    /// Propagates tester failures if the generator needs to query the
    /// input before producing a level.
    fn first_level(&mut self, ctx: &mut C) -> Result<Option<HddLevel<T>>, DdError>;

    /// The level following `minimized`, or `None` to finish.
    ///
    /// # Errors
    ///
    /// As for [`HddGenerator::first_level`].
    fn next_level(
        &mut self,
        ctx: &mut C,
        minimized: &DdResult<T>,
    ) -> Result<Option<HddLevel<T>>, DdError>;

    /// The tester that evaluates candidates of the current level.
    fn level_tester(&mut self) -> &mut dyn PropertyTester<C, T>;
}

/// Shared flag for stopping a hierarchical run between levels.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Runs a linear algorithm over the levels of an [`HddGenerator`].
#[derive(Debug, Clone, Default)]
pub struct HierarchicalDd<A> {
    algorithm: A,
    cancellation: Option<CancellationToken>,
}

impl<A> HierarchicalDd<A> {
    #[must_use]
    pub const fn new(algorithm: A) -> Self {
        Self {
            algorithm,
            cancellation: None,
        }
    }

    /// Stop at the next level boundary once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    #[must_use]
    pub const fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Minimize every level the generator produces.
    ///
    /// Returns the per-level results in the order the levels ran.
    ///
    /// # Errors
    ///
    /// Returns [`DdError::Tester`] when a level tester fails and
    /// [`DdError::Cancelled`] when the token is raised between levels.
    #[instrument(name = "hdd", skip_all)]
    pub fn minimize<C, T, G>(
        &mut self,
        ctx: &mut C,
        generator: &mut G,
    ) -> Result<Vec<DdResult<T>>, DdError>
    where
        A: DdAlgorithm<C, T>,
        G: HddGenerator<C, T> + ?Sized,
    {
        let mut results = Vec::new();
        let mut level = generator.first_level(ctx)?;

        while let Some(current) = level {
            if !results.is_empty() {
                self.yield_point(results.len())?;
            }

            debug!(
                level = results.len(),
                items = current.len(),
                "minimizing level"
            );
            let result = self
                .algorithm
                .minimize(ctx, current.items, generator.level_tester())?;
            debug!(
                level = results.len(),
                retained = result.retained.len(),
                deleted = result.deleted.len(),
                "level minimized"
            );

            level = generator.next_level(ctx, &result)?;
            results.push(result);
        }

        debug!(levels = results.len(), "hierarchical dd finished");
        Ok(results)
    }

    fn yield_point(&self, levels: usize) -> Result<(), DdError> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => {
                debug!(levels, "hierarchical dd cancelled");
                Err(DdError::Cancelled { levels })
            }
            _ => Ok(()),
        }
    }
}
