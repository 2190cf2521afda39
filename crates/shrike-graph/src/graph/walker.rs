//! Iterative depth-first traversal with visitor hooks.
//!
//! # Overview
//!
//! [`DepthFirstGraphWalker`] walks any [`Adjacency`] from a list of start
//! nodes. Each start node that was not reached earlier opens a new
//! component. The walker reports, in order:
//!
//! - `start_component(root)` once per new component,
//! - `visit_node(node)` the first time a node is reached,
//! - `traverse_edge(from, to)` for every edge followed, including edges
//!   into nodes that were already visited.
//!
//! Every hook may fail with the visitor's error type, which stops the walk.
//! The traversal keeps an explicit stack, so deep graphs cannot overflow
//! the call stack.

use std::collections::HashSet;
use std::hash::Hash;

use fixedbitset::FixedBitSet;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

/// Anything that can enumerate the successors of a node.
pub trait Adjacency {
    type Node: Clone + Eq + Hash;

    /// Successors of `node` in traversal order.
    fn successors(&self, node: &Self::Node) -> Vec<Self::Node>;
}

/// Borrowed view of a petgraph [`DiGraph`], optionally reversed and
/// restricted to the vertices set in a mask.
#[derive(Debug)]
pub struct DiGraphView<'g, N, E> {
    graph: &'g DiGraph<N, E>,
    direction: Direction,
    mask: Option<&'g FixedBitSet>,
}

impl<'g, N, E> DiGraphView<'g, N, E> {
    /// Follow edges in their stored direction over every vertex.
    #[must_use]
    pub const fn new(graph: &'g DiGraph<N, E>) -> Self {
        Self {
            graph,
            direction: Direction::Outgoing,
            mask: None,
        }
    }

    /// Follow edges against their stored direction.
    #[must_use]
    pub const fn reversed(mut self) -> Self {
        self.direction = match self.direction {
            Direction::Outgoing => Direction::Incoming,
            Direction::Incoming => Direction::Outgoing,
        };
        self
    }

    /// Restrict the view to the induced subgraph on the vertices in `mask`.
    #[must_use]
    pub const fn masked(mut self, mask: &'g FixedBitSet) -> Self {
        self.mask = Some(mask);
        self
    }

    fn includes(&self, node: NodeIndex) -> bool {
        self.mask.is_none_or(|mask| mask.contains(node.index()))
    }
}

impl<N, E> Adjacency for DiGraphView<'_, N, E> {
    type Node = NodeIndex;

    fn successors(&self, node: &NodeIndex) -> Vec<NodeIndex> {
        if !self.includes(*node) {
            return Vec::new();
        }
        let mut next: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(*node, self.direction)
            .filter(|&n| self.includes(n))
            .collect();
        // petgraph yields neighbours newest-first; sort for a stable order.
        next.sort_unstable();
        next.dedup();
        next
    }
}

/// Callbacks for [`DepthFirstGraphWalker::walk`].
pub trait DfsVisitor<N> {
    type Output;
    type Error;

    /// A start node that no earlier component reached.
    ///
    /// # Errors
    ///
    /// Any visitor error ends the walk.
    fn start_component(&mut self, _root: &N) -> Result<(), Self::Error> {
        Ok(())
    }

    /// First visit of `node`.
    ///
    /// # Errors
    ///
    /// Any visitor error ends the walk.
    fn visit_node(&mut self, _node: &N) -> Result<(), Self::Error> {
        Ok(())
    }

    /// The walker followed the edge `from → to`.
    ///
    /// # Errors
    ///
    /// Any visitor error ends the walk.
    fn traverse_edge(&mut self, _from: &N, _to: &N) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Consume the visitor once the walk is complete.
    fn finish(self) -> Self::Output;
}

/// Depth-first walker; see the module docs for the hook order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthFirstGraphWalker;

impl DepthFirstGraphWalker {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Walk `graph` from `starts`, feeding `visitor`.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by a visitor hook.
    pub fn walk<G, V>(
        &self,
        graph: &G,
        starts: impl IntoIterator<Item = G::Node>,
        mut visitor: V,
    ) -> Result<V::Output, V::Error>
    where
        G: Adjacency + ?Sized,
        V: DfsVisitor<G::Node>,
    {
        let mut visited: HashSet<G::Node> = HashSet::new();

        for start in starts {
            if visited.contains(&start) {
                continue;
            }
            visitor.start_component(&start)?;
            visitor.visit_node(&start)?;
            visited.insert(start.clone());

            let successors = graph.successors(&start).into_iter();
            let mut stack = vec![(start, successors)];

            while let Some((node, successors)) = stack.last_mut() {
                let Some(next) = successors.next() else {
                    stack.pop();
                    continue;
                };
                visitor.traverse_edge(node, &next)?;
                if visited.insert(next.clone()) {
                    visitor.visit_node(&next)?;
                    let successors = graph.successors(&next).into_iter();
                    stack.push((next, successors));
                }
            }
        }

        Ok(visitor.finish())
    }
}
