//! Memoizing decorator for property testers.

use tracing::trace;

use crate::cache::trie::TrieCache;
use crate::outcome::{GraphCut, GraphPropertyTester, PropertyOutcome, PropertyTester};

/// Wraps a tester and memoizes its outcomes by retained set.
///
/// Works for both [`PropertyTester`] and [`GraphPropertyTester`]. Only
/// decisive outcomes are stored: tester errors and `Unknown` results are
/// passed through and asked again next time.
#[derive(Debug)]
pub struct CachingTester<P, K> {
    inner: P,
    cache: TrieCache<K, PropertyOutcome>,
    hits: usize,
    misses: usize,
}

impl<P, K: Ord + Clone> CachingTester<P, K> {
    #[must_use]
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: TrieCache::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Number of tests answered from the cache.
    #[must_use]
    pub const fn hits(&self) -> usize {
        self.hits
    }

    /// Number of tests forwarded to the wrapped tester.
    #[must_use]
    pub const fn misses(&self) -> usize {
        self.misses
    }

    #[must_use]
    pub const fn cache(&self) -> &TrieCache<K, PropertyOutcome> {
        &self.cache
    }

    #[must_use]
    pub fn into_inner(self) -> P {
        self.inner
    }

    fn lookup(&mut self, key: &[K]) -> Option<PropertyOutcome> {
        let cached = self.cache.get(key).copied();
        if let Some(outcome) = cached {
            self.hits += 1;
            trace!(size = key.len(), %outcome, "property cache hit");
        } else {
            self.misses += 1;
        }
        cached
    }

    fn remember(&mut self, key: &[K], outcome: PropertyOutcome) {
        if outcome != PropertyOutcome::Unknown {
            self.cache.insert(key, outcome);
        }
    }
}

impl<C, T, P> PropertyTester<C, T> for CachingTester<P, T>
where
    T: Ord + Clone,
    P: PropertyTester<C, T>,
{
    fn test(
        &mut self,
        ctx: &mut C,
        retained: &[T],
        deleted: &[T],
    ) -> anyhow::Result<PropertyOutcome> {
        if let Some(outcome) = self.lookup(retained) {
            return Ok(outcome);
        }
        let outcome = self.inner.test(ctx, retained, deleted)?;
        self.remember(retained, outcome);
        Ok(outcome)
    }
}

impl<C, V, P> GraphPropertyTester<C, V> for CachingTester<P, V>
where
    V: Ord + Clone,
    P: GraphPropertyTester<C, V>,
{
    fn test(
        &mut self,
        ctx: &mut C,
        retained: &GraphCut<V>,
        deleted: &GraphCut<V>,
    ) -> anyhow::Result<PropertyOutcome> {
        if let Some(outcome) = self.lookup(retained.as_slice()) {
            return Ok(outcome);
        }
        let outcome = self.inner.test(ctx, retained, deleted)?;
        self.remember(retained.as_slice(), outcome);
        Ok(outcome)
    }
}
