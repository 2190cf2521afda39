//! Reduction settings loaded from TOML.
//!
//! Every field has a default, so an absent file, an empty file and a file
//! naming a single option are all valid.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::dd::{DdAlgorithm, DdMin, LoggingDd, ProbabilisticDd, ZeroTestDd};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReduceConfig {
    #[serde(default)]
    pub algorithm: AlgorithmKind,
    #[serde(default = "default_true")]
    pub zero_test: bool,
    #[serde(default = "default_true")]
    pub log_statistics: bool,
    #[serde(default)]
    pub probabilistic: ProbabilisticConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmKind::default(),
            zero_test: default_true(),
            log_statistics: default_true(),
            probabilistic: ProbabilisticConfig::default(),
            graph: GraphConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    #[default]
    #[serde(rename = "ddmin")]
    DdMin,
    Probabilistic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilisticConfig {
    #[serde(default = "default_initial_probability")]
    pub initial_probability: f64,
    /// Fixed RNG seed; OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_true")]
    pub final_sweep: bool,
}

impl Default for ProbabilisticConfig {
    fn default() -> Self {
        Self {
            initial_probability: default_initial_probability(),
            seed: None,
            final_sweep: default_true(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub order: TraversalOrder,
    #[serde(default)]
    pub layering: Layering,
}

/// Direction in which graph DD peels the condensation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    /// Delete from the sinks inward; a vertex is only offered once all its
    /// successors are gone.
    #[default]
    SinksFirst,
    /// Delete from the sources outward, on the transposed condensation.
    SourcesFirst,
}

/// How graph DD groups components into levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layering {
    /// Components whose successors were all retained at earlier levels.
    #[default]
    Frontier,
    /// Components at the same longest-path distance from the sinks.
    Depth,
}

impl ReduceConfig {
    /// Compose the configured algorithm with its wrappers.
    ///
    /// The wrapping order is fixed: statistics outermost, then the zero
    /// test, then the base algorithm.
    #[must_use]
    pub fn build_algorithm<C, T: Clone + 'static>(&self) -> Box<dyn DdAlgorithm<C, T>>
    where
        C: 'static,
    {
        let base: Box<dyn DdAlgorithm<C, T>> = match self.algorithm {
            AlgorithmKind::DdMin => Box::new(DdMin::new()),
            AlgorithmKind::Probabilistic => Box::new(self.probabilistic.build()),
        };
        let zeroed: Box<dyn DdAlgorithm<C, T>> = if self.zero_test {
            Box::new(ZeroTestDd::new(base))
        } else {
            base
        };
        if self.log_statistics {
            Box::new(LoggingDd::labelled(zeroed, self.algorithm.label()))
        } else {
            zeroed
        }
    }

    fn validate(&self) -> Result<()> {
        let p = self.probabilistic.initial_probability;
        ensure!(
            p > 0.0 && p < 1.0,
            "probabilistic.initial_probability must lie strictly between 0 and 1, got {p}"
        );
        Ok(())
    }
}

impl AlgorithmKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DdMin => "ddmin",
            Self::Probabilistic => "probabilistic",
        }
    }
}

impl ProbabilisticConfig {
    #[must_use]
    pub fn build(&self) -> ProbabilisticDd {
        let dd = ProbabilisticDd::new(self.initial_probability).with_final_sweep(self.final_sweep);
        match self.seed {
            Some(seed) => dd.with_seed(seed),
            None => dd,
        }
    }
}

/// Load settings from `path`, or defaults if the file does not exist.
///
/// # Errors
///
/// Fails when the file cannot be read, is not valid TOML for
/// [`ReduceConfig`], or holds out-of-range values.
pub fn load_config(path: &Path) -> Result<ReduceConfig> {
    if !path.exists() {
        return Ok(ReduceConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse and validate settings from a TOML string.
///
/// # Errors
///
/// Fails on malformed TOML or out-of-range values.
pub fn parse_config(content: &str) -> Result<ReduceConfig> {
    let config = toml::from_str::<ReduceConfig>(content)?;
    config.validate()?;
    Ok(config)
}

const fn default_true() -> bool {
    true
}

const fn default_initial_probability() -> f64 {
    crate::dd::probabilistic::DEFAULT_INITIAL_PROBABILITY
}
