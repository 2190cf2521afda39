#![forbid(unsafe_code)]
//! shrike-core library.
//!
//! Delta debugging over flat item lists: [`dd::DdMin`] (1-minimality),
//! [`dd::ProbabilisticDd`], the zero-testing and statistics wrappers, the
//! [`hierarchical::HierarchicalDd`] level driver and the trie-backed
//! [`cache::CachingTester`].
//!
//! # Conventions
//!
//! - **Errors**: engine failures are [`error::DdError`]; property testers and
//!   config loading use `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//! - **Context**: every test receives the caller's `&mut C`; the engine never
//!   looks inside it.

pub mod cache;
pub mod config;
pub mod dd;
pub mod error;
pub mod hierarchical;
pub mod outcome;

pub use cache::{CachingTester, TrieCache};
pub use config::{
    AlgorithmKind, GraphConfig, Layering, ProbabilisticConfig, ReduceConfig, TraversalOrder,
    load_config, parse_config,
};
pub use dd::{DdAlgorithm, DdMin, DdResult, DdStats, LoggingDd, ProbabilisticDd, ZeroTestDd};
pub use error::DdError;
pub use hierarchical::{CancellationToken, HddGenerator, HddLevel, HierarchicalDd};
pub use outcome::{GraphCut, GraphPropertyTester, PropertyOutcome, PropertyTester};
