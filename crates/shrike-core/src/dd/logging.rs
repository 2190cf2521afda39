//! Statistics decorator.
//!
//! [`LoggingDd`] forwards to its inner algorithm unchanged while counting
//! every property test by outcome. After each run it emits one `info!`
//! summary with the before/after sizes and the reduction ratio. Counters
//! accumulate across runs so a hierarchical driver reports totals.

use serde::Serialize;
use tracing::info;

use crate::dd::{DdAlgorithm, DdResult};
use crate::error::DdError;
use crate::outcome::{PropertyOutcome, PropertyTester};

/// Cumulative counters collected by [`LoggingDd`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DdStats {
    /// Completed `minimize` calls.
    pub runs: usize,
    /// Property tests issued, errors included.
    pub tests: usize,
    pub present: usize,
    pub not_present: usize,
    pub unknown: usize,
    /// Tests that failed with an error.
    pub failed: usize,
    /// Sum of input sizes over completed runs.
    pub items_before: usize,
    /// Sum of retained sizes over completed runs.
    pub items_after: usize,
}

impl DdStats {
    /// Fraction of input items removed, in `[0, 1]`. Zero when nothing was
    /// minimized yet.
    #[must_use]
    pub fn reduction_ratio(&self) -> f64 {
        ratio(self.items_before, self.items_after)
    }

    const fn record(&mut self, outcome: &anyhow::Result<PropertyOutcome>) {
        self.tests += 1;
        match outcome {
            Ok(PropertyOutcome::Present) => self.present += 1,
            Ok(PropertyOutcome::NotPresent) => self.not_present += 1,
            Ok(PropertyOutcome::Unknown) => self.unknown += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Decorator that records [`DdStats`] and logs a summary per run.
#[derive(Debug, Clone)]
pub struct LoggingDd<A> {
    inner: A,
    label: String,
    stats: DdStats,
}

impl<A> LoggingDd<A> {
    #[must_use]
    pub fn new(inner: A) -> Self {
        Self::labelled(inner, "dd")
    }

    /// Tag every summary line with `label`.
    #[must_use]
    pub fn labelled(inner: A, label: impl Into<String>) -> Self {
        Self {
            inner,
            label: label.into(),
            stats: DdStats::default(),
        }
    }

    #[must_use]
    pub const fn stats(&self) -> &DdStats {
        &self.stats
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn reset(&mut self) {
        self.stats = DdStats::default();
    }

    #[must_use]
    pub fn into_inner(self) -> A {
        self.inner
    }
}

struct CountingTester<'t, C, T> {
    inner: &'t mut dyn PropertyTester<C, T>,
    stats: &'t mut DdStats,
}

impl<C, T> PropertyTester<C, T> for CountingTester<'_, C, T> {
    fn test(
        &mut self,
        ctx: &mut C,
        retained: &[T],
        deleted: &[T],
    ) -> anyhow::Result<PropertyOutcome> {
        let outcome = self.inner.test(ctx, retained, deleted);
        self.stats.record(&outcome);
        outcome
    }
}

impl<C, T, A> DdAlgorithm<C, T> for LoggingDd<A>
where
    A: DdAlgorithm<C, T>,
{
    fn minimize(
        &mut self,
        ctx: &mut C,
        items: Vec<T>,
        tester: &mut dyn PropertyTester<C, T>,
    ) -> Result<DdResult<T>, DdError> {
        let before = items.len();
        let tests_before = self.stats.tests;

        let mut counting = CountingTester {
            inner: tester,
            stats: &mut self.stats,
        };
        let result = self.inner.minimize(ctx, items, &mut counting)?;

        self.stats.runs += 1;
        self.stats.items_before += before;
        self.stats.items_after += result.retained.len();

        info!(
            label = %self.label,
            before,
            after = result.retained.len(),
            tests = self.stats.tests - tests_before,
            ratio = format_args!("{:.3}", ratio(before, result.retained.len())),
            "delta debugging finished"
        );
        Ok(result)
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(before: usize, after: usize) -> f64 {
    if before == 0 {
        0.0
    } else {
        1.0 - after as f64 / before as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dd::{DdMin, ZeroTestDd};

    fn requires_two(_: &mut (), retained: &[u32], _: &[u32]) -> anyhow::Result<PropertyOutcome> {
        Ok(if retained.contains(&2) {
            PropertyOutcome::Present
        } else if retained.is_empty() {
            PropertyOutcome::Unknown
        } else {
            PropertyOutcome::NotPresent
        })
    }

    #[test]
    fn result_is_unchanged() {
        let mut plain_tester = requires_two;
        let plain = DdMin
            .minimize(&mut (), vec![1u32, 2, 3, 4], &mut plain_tester)
            .expect("minimize");

        let mut logged_tester = requires_two;
        let mut logged = LoggingDd::new(DdMin);
        let result = logged
            .minimize(&mut (), vec![1u32, 2, 3, 4], &mut logged_tester)
            .expect("minimize");

        assert_eq!(result, plain);
    }

    #[test]
    fn counts_outcomes_and_sizes() {
        let mut tester = requires_two;
        let mut logged = LoggingDd::labelled(ZeroTestDd::new(DdMin), "unit");
        let result = logged
            .minimize(&mut (), vec![1u32, 2, 3, 4], &mut tester)
            .expect("minimize");
        assert_eq!(result.retained, vec![2]);

        let stats = *logged.stats();
        assert_eq!(stats.runs, 1);
        assert_eq!(
            stats.tests,
            stats.present + stats.not_present + stats.unknown
        );
        assert_eq!(stats.unknown, 1, "zero test answered Unknown");
        assert_eq!(stats.items_before, 4);
        assert_eq!(stats.items_after, 1);
        assert!((stats.reduction_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn failed_runs_count_tests_but_not_runs() {
        let mut tester = |_: &mut (), _: &[u32], _: &[u32]| -> anyhow::Result<PropertyOutcome> {
            anyhow::bail!("linker crashed")
        };
        let mut logged = LoggingDd::new(DdMin);
        let err = logged
            .minimize(&mut (), vec![1u32, 2, 3], &mut tester)
            .expect_err("tester fails");

        assert!(matches!(err, DdError::Tester(_)));
        assert_eq!(logged.stats().runs, 0);
        assert_eq!(logged.stats().failed, 1);
    }

    #[test]
    fn stats_serialize_to_json() {
        let stats = DdStats {
            runs: 2,
            tests: 10,
            present: 3,
            not_present: 7,
            items_before: 20,
            items_after: 5,
            ..DdStats::default()
        };
        let json = serde_json::to_value(stats).expect("serialize");
        assert_eq!(json["runs"], 2);
        assert_eq!(json["not_present"], 7);
        assert_eq!(json["items_after"], 5);
    }

    #[test]
    fn empty_stats_have_zero_ratio() {
        assert!(DdStats::default().reduction_ratio().abs() < f64::EPSILON);
    }
}
