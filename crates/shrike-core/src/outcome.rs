//! Property test outcomes, tester traits and graph cuts.
//!
//! A property tester is the oracle of the whole engine: given a candidate
//! reduction it answers whether the failure still reproduces. Testers are
//! user code, so they report their own failures through `anyhow` and the
//! engine wraps them into [`crate::DdError::Tester`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PropertyOutcome
// ---------------------------------------------------------------------------

/// Result of a single property test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyOutcome {
    /// The property still holds; the candidate reduction is accepted.
    Present,
    /// The property was lost; the candidate reduction is rejected.
    NotPresent,
    /// The tester could not decide. Rejected like `NotPresent`, but kept
    /// apart so flaky testers can be detected.
    Unknown,
}

impl PropertyOutcome {
    /// Return `true` only for [`PropertyOutcome::Present`].
    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }
}

impl fmt::Display for PropertyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Present => "present",
            Self::NotPresent => "not-present",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Tester traits
// ---------------------------------------------------------------------------

/// Oracle for linear delta debugging.
///
/// `retained` is the candidate that would survive the reduction and
/// `deleted` is every other item of the list being minimized. Both slices
/// keep the input order.
pub trait PropertyTester<C, T> {
    /// Evaluate the property on one candidate.
    ///
    /// # Errors
    ///
    /// Returns an error when the tester itself fails (I/O, build tooling,
    /// ...). This is never the same thing as [`PropertyOutcome::NotPresent`].
    fn test(
        &mut self,
        ctx: &mut C,
        retained: &[T],
        deleted: &[T],
    ) -> anyhow::Result<PropertyOutcome>;
}

impl<C, T, F> PropertyTester<C, T> for F
where
    F: FnMut(&mut C, &[T], &[T]) -> anyhow::Result<PropertyOutcome>,
{
    fn test(
        &mut self,
        ctx: &mut C,
        retained: &[T],
        deleted: &[T],
    ) -> anyhow::Result<PropertyOutcome> {
        self(ctx, retained, deleted)
    }
}

/// Oracle for graph delta debugging: evaluates a bipartition of the
/// original graph's vertices.
pub trait GraphPropertyTester<C, V> {
    /// Evaluate the property for the `retained`/`deleted` bipartition.
    ///
    /// # Errors
    ///
    /// Returns an error when the tester itself fails.
    fn test(
        &mut self,
        ctx: &mut C,
        retained: &GraphCut<V>,
        deleted: &GraphCut<V>,
    ) -> anyhow::Result<PropertyOutcome>;
}

impl<C, V, F> GraphPropertyTester<C, V> for F
where
    F: FnMut(&mut C, &GraphCut<V>, &GraphCut<V>) -> anyhow::Result<PropertyOutcome>,
{
    fn test(
        &mut self,
        ctx: &mut C,
        retained: &GraphCut<V>,
        deleted: &GraphCut<V>,
    ) -> anyhow::Result<PropertyOutcome> {
        self(ctx, retained, deleted)
    }
}

// ---------------------------------------------------------------------------
// GraphCut
// ---------------------------------------------------------------------------

/// One side of a vertex bipartition.
///
/// Complementarity of a retained/deleted pair is a property of how the
/// pair was produced, not something this type checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphCut<V> {
    vertices: Vec<V>,
}

impl<V> GraphCut<V> {
    #[must_use]
    pub const fn new(vertices: Vec<V>) -> Self {
        Self { vertices }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[V] {
        &self.vertices
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.vertices.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<V> {
        self.vertices
    }
}

impl<V: PartialEq> GraphCut<V> {
    /// Linear membership check.
    #[must_use]
    pub fn contains(&self, vertex: &V) -> bool {
        self.vertices.contains(vertex)
    }
}

impl<V> Default for GraphCut<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V> FromIterator<V> for GraphCut<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<V> IntoIterator for GraphCut<V> {
    type Item = V;
    type IntoIter = std::vec::IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.vertices.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a GraphCut<V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.vertices.iter()
    }
}
