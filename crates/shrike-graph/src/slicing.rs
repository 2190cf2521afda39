//! Dependency slicing.
//!
//! Builds the dependency graph reachable from a set of roots by following
//! each node's declared successors. Every node in a slice has the kind of
//! the roots; reaching a node of another kind is an error rather than a
//! silent cut, since it means the declared dependencies cross a boundary the
//! caller did not expect.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, instrument};

use crate::graph::walker::{Adjacency, DepthFirstGraphWalker, DfsVisitor};

/// A node that can be sliced.
pub trait SliceNode: Clone + Eq + Hash + Debug {
    type Kind: Eq + Debug;

    fn kind(&self) -> Self::Kind;

    /// Nodes this node depends on.
    fn successors(&self) -> Vec<Self>;
}

#[derive(Debug, thiserror::Error)]
pub enum SliceError {
    #[error("slice roots have different kinds: {first} and {other}")]
    MultipleRoots { first: String, other: String },

    #[error("reached {node} of kind {found} from roots of kind {expected}")]
    AlienNode {
        node: String,
        expected: String,
        found: String,
    },
}

/// The reachable part of a dependency structure as a petgraph graph.
#[derive(Debug, Clone)]
pub struct SlicingGraph<N> {
    graph: DiGraph<N, ()>,
    index: HashMap<N, NodeIndex>,
}

impl<N: SliceNode> SlicingGraph<N> {
    fn empty() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    #[must_use]
    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Position of `node` in [`SlicingGraph::graph`].
    #[must_use]
    pub fn node_index(&self, node: &N) -> Option<NodeIndex> {
        self.index.get(node).copied()
    }

    /// Successors of `node` inside the slice, in index order.
    #[must_use]
    pub fn successors(&self, node: &N) -> Vec<&N> {
        let Some(idx) = self.node_index(node) else {
            return Vec::new();
        };
        let mut next: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        next.sort_unstable();
        next.dedup();
        next.into_iter().map(|n| &self.graph[n]).collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.graph.node_weights()
    }

    #[must_use]
    pub const fn graph(&self) -> &DiGraph<N, ()> {
        &self.graph
    }

    /// Hand over the graph, e.g. to minimize it with [`crate::GraphDd`].
    #[must_use]
    pub fn into_graph(self) -> DiGraph<N, ()> {
        self.graph
    }

    fn insert(&mut self, node: &N) -> NodeIndex {
        if let Some(&idx) = self.index.get(node) {
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(node.clone(), idx);
        idx
    }
}

/// Slice the dependency structure reachable from `roots`.
///
/// # Errors
///
/// [`SliceError::MultipleRoots`] when the roots disagree on their kind and
/// [`SliceError::AlienNode`] when a reached node has a different kind.
#[instrument(skip_all)]
pub fn slice<N: SliceNode>(
    roots: impl IntoIterator<Item = N>,
) -> Result<SlicingGraph<N>, SliceError> {
    let roots: Vec<N> = roots.into_iter().collect();
    let Some(first) = roots.first() else {
        return Ok(SlicingGraph::empty());
    };

    let kind = first.kind();
    if let Some(other) = roots.iter().find(|r| r.kind() != kind) {
        return Err(SliceError::MultipleRoots {
            first: format!("{kind:?}"),
            other: format!("{:?}", other.kind()),
        });
    }

    let builder = SliceBuilder {
        kind,
        slice: SlicingGraph::empty(),
    };
    let slice = DepthFirstGraphWalker::new().walk(&Declared(PhantomData), roots, builder)?;
    debug!(
        nodes = slice.node_count(),
        edges = slice.edge_count(),
        "slice built"
    );
    Ok(slice)
}

/// Adjacency through [`SliceNode::successors`].
struct Declared<N>(PhantomData<N>);

impl<N: SliceNode> Adjacency for Declared<N> {
    type Node = N;

    fn successors(&self, node: &N) -> Vec<N> {
        node.successors()
    }
}

struct SliceBuilder<N: SliceNode> {
    kind: N::Kind,
    slice: SlicingGraph<N>,
}

impl<N: SliceNode> DfsVisitor<N> for SliceBuilder<N> {
    type Output = SlicingGraph<N>;
    type Error = SliceError;

    fn visit_node(&mut self, node: &N) -> Result<(), SliceError> {
        let found = node.kind();
        if found != self.kind {
            return Err(SliceError::AlienNode {
                node: format!("{node:?}"),
                expected: format!("{:?}", self.kind),
                found: format!("{found:?}"),
            });
        }
        self.slice.insert(node);
        Ok(())
    }

    fn traverse_edge(&mut self, from: &N, to: &N) -> Result<(), SliceError> {
        let from = self.slice.insert(from);
        let to = self.slice.insert(to);
        self.slice.graph.update_edge(from, to, ());
        Ok(())
    }

    fn finish(self) -> SlicingGraph<N> {
        self.slice
    }
}
