//! Graph plumbing for graph delta debugging.
//!
//! # Overview
//!
//! Graph DD never works on the caller's graph directly. The input is first
//! condensed ([`condense`]) so every strongly connected component becomes one
//! opaque item, which makes the remaining structure a DAG. On that DAG:
//!
//! - [`walker`] provides an iterative depth-first traversal with visitor
//!   hooks, used for reachability and slicing.
//! - [`depth`] computes longest-path depths and groups vertices into layers.
//! - [`layer_cut`] turns a proposed set of deleted components into a
//!   complete retained/deleted bipartition of the live subgraph.

pub mod condense;
pub mod depth;
pub mod layer_cut;
pub mod walker;

pub use condense::{CondensedGraph, CondensedVertex};
pub use depth::{DepthCounter, Depths};
pub use layer_cut::{LayerCut, LayerToCutTransformer};
pub use walker::{Adjacency, DepthFirstGraphWalker, DfsVisitor, DiGraphView};
