#![forbid(unsafe_code)]
//! shrike-graph library.
//!
//! Graph delta debugging on top of `shrike-core`: SCC condensation, an
//! iterative depth-first walker, longest-path layering, the layered
//! [`dd::GraphDd`] minimizer and dependency [`slicing`].
//!
//! # Conventions
//!
//! - **Graphs**: inputs are `petgraph::graph::DiGraph`; an edge `a → b`
//!   means `a` depends on `b`.
//! - **Errors**: minimization fails with `shrike_core::DdError`; slicing
//!   with [`slicing::SliceError`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod dd;
pub mod graph;
pub mod slicing;

pub use dd::{GraphDd, GraphDdResult, LayerGenerator, LayerToCutTester};
pub use graph::{
    CondensedGraph, CondensedVertex, DepthCounter, Depths, LayerCut, LayerToCutTransformer,
};
pub use slicing::{SliceError, SliceNode, SlicingGraph, slice};
