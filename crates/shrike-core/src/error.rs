//! Engine error type.
//!
//! `NotPresent` and `Unknown` outcomes are not errors: they steer the
//! search. Errors here abort the running `minimize` call and reach the
//! caller untouched; retry policy belongs to the tester or its caller.

/// Errors that abort a minimization run.
#[derive(Debug, thiserror::Error)]
pub enum DdError {
    /// The property tester itself failed (as opposed to reporting that the
    /// property is absent).
    #[error("property tester failed: {0}")]
    Tester(#[source] anyhow::Error),

    /// A cancellation token was raised; observed at a yield point between
    /// hierarchical levels.
    #[error("minimization cancelled after {levels} level(s)")]
    Cancelled {
        /// Number of levels fully minimized before the cancellation.
        levels: usize,
    },
}

impl DdError {
    /// Stable code identifier (`D####`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Tester(_) => "D1001",
            Self::Cancelled { .. } => "D2001",
        }
    }

    /// Return `true` if the run was stopped by a cancellation token.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
