//! SCC condensation of the input graph.
//!
//! # Overview
//!
//! [`CondensedGraph::from_graph`] collapses every strongly connected
//! component into one [`CondensedVertex`] using petgraph's
//! `condensation`. The result is a DAG with:
//!
//! - exactly one vertex per SCC,
//! - an edge `A → B` iff some original edge leaves `A` and enters `B`,
//! - no self loops and no parallel edges.
//!
//! A condensed vertex is identified by its [`NodeIndex`] in the condensation,
//! never by its member set.

use petgraph::Direction;
use petgraph::algo::{condensation, is_cyclic_directed};
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::instrument;

// ---------------------------------------------------------------------------
// CondensedVertex
// ---------------------------------------------------------------------------

/// One strongly connected component of the original graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondensedVertex {
    /// Original vertices in this component, sorted by index.
    pub members: Vec<NodeIndex>,
}

impl CondensedVertex {
    /// Return `true` if the component is a cycle of two or more vertices.
    #[must_use]
    pub const fn is_cycle(&self) -> bool {
        self.members.len() > 1
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CondensedGraph
// ---------------------------------------------------------------------------

/// The condensation DAG plus the mapping back to original vertices.
#[derive(Debug, Clone)]
pub struct CondensedGraph {
    dag: DiGraph<CondensedVertex, ()>,
    /// Component of each original vertex, indexed by original `NodeIndex`.
    component_of: Vec<NodeIndex>,
}

impl CondensedGraph {
    /// Condense `graph`. Vertex and edge weights are not needed.
    #[must_use]
    #[instrument(skip_all, fields(vertices = graph.node_count(), edges = graph.edge_count()))]
    pub fn from_graph<V, E>(graph: &DiGraph<V, E>) -> Self {
        let indexed: DiGraph<NodeIndex, ()> = graph.map(|idx, _| idx, |_, _| ());
        let condensed = condensation(indexed, /* make_acyclic */ true);
        let dag: DiGraph<CondensedVertex, ()> = condensed.map(
            |_, members| {
                let mut sorted = members.clone();
                sorted.sort_unstable();
                CondensedVertex { members: sorted }
            },
            |_, _| (),
        );

        let mut component_of = vec![NodeIndex::end(); graph.node_count()];
        for component in dag.node_indices() {
            for member in &dag[component].members {
                component_of[member.index()] = component;
            }
        }

        Self { dag, component_of }
    }

    /// The condensation DAG.
    #[must_use]
    pub const fn dag(&self) -> &DiGraph<CondensedVertex, ()> {
        &self.dag
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.dag.node_count()
    }

    /// Number of original vertices.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.component_of.len()
    }

    /// Component containing the original vertex `vertex`.
    #[must_use]
    pub fn component_of(&self, vertex: NodeIndex) -> Option<NodeIndex> {
        self.component_of.get(vertex.index()).copied()
    }

    /// Original vertices of `component`, sorted.
    #[must_use]
    pub fn expand(&self, component: NodeIndex) -> &[NodeIndex] {
        &self.dag[component].members
    }

    /// Original vertices of every component in `components`, sorted.
    #[must_use]
    pub fn expand_all(&self, components: impl IntoIterator<Item = NodeIndex>) -> Vec<NodeIndex> {
        let mut vertices: Vec<NodeIndex> = components
            .into_iter()
            .flat_map(|c| self.dag[c].members.iter().copied())
            .collect();
        vertices.sort_unstable();
        vertices
    }

    /// Components with no outgoing edge, sorted by index.
    #[must_use]
    pub fn sinks(&self) -> Vec<NodeIndex> {
        self.externals(Direction::Outgoing)
    }

    /// Components with no incoming edge, sorted by index.
    #[must_use]
    pub fn sources(&self) -> Vec<NodeIndex> {
        self.externals(Direction::Incoming)
    }

    /// Number of components with more than one member.
    #[must_use]
    pub fn cycle_count(&self) -> usize {
        self.dag.node_weights().filter(|c| c.is_cycle()).count()
    }

    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.dag)
    }

    /// The same condensation with every edge reversed.
    ///
    /// Component indices and members are unchanged, so sinks and sources
    /// swap roles.
    #[must_use]
    pub fn transposed(&self) -> Self {
        let mut dag = self.dag.clone();
        dag.reverse();
        Self {
            dag,
            component_of: self.component_of.clone(),
        }
    }

    fn externals(&self, direction: Direction) -> Vec<NodeIndex> {
        let mut found: Vec<NodeIndex> = self.dag.externals(direction).collect();
        found.sort_unstable();
        found
    }
}
