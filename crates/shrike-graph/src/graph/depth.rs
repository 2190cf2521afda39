//! Longest-path depths on a DAG.
//!
//! # Algorithm
//!
//! One pass in topological order: every vertex starts at depth 0 and pushes
//! `depth + 1` to each out-edge target, which keeps the maximum. Sources end
//! at depth 0; every other vertex ends one deeper than its deepest
//! predecessor. Vertices at equal depth form a layer, and no edge joins two
//! vertices of the same layer.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::instrument;

/// Depth of every vertex plus the vertices grouped by depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Depths {
    depth: Vec<usize>,
    layers: Vec<Vec<NodeIndex>>,
}

impl Depths {
    /// Depth of `node`, or `None` if it is not in the graph.
    #[must_use]
    pub fn depth(&self, node: NodeIndex) -> Option<usize> {
        self.depth.get(node.index()).copied()
    }

    /// Layer `d` holds the vertices at depth `d`, sorted by index.
    #[must_use]
    pub fn layers(&self) -> &[Vec<NodeIndex>] {
        &self.layers
    }

    /// Length of the longest path, in edges. `None` for an empty graph.
    #[must_use]
    pub const fn max_depth(&self) -> Option<usize> {
        self.layers.len().checked_sub(1)
    }

    #[must_use]
    pub fn into_layers(self) -> Vec<Vec<NodeIndex>> {
        self.layers
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DepthCounter;

impl DepthCounter {
    /// Compute depths for `graph`, or `None` if it contains a cycle.
    #[must_use]
    #[instrument(skip_all, fields(vertices = graph.node_count()))]
    pub fn count<N, E>(graph: &DiGraph<N, E>) -> Option<Depths> {
        let order = toposort(graph, None).ok()?;

        let mut depth = vec![0usize; graph.node_count()];
        for node in order {
            let next = depth[node.index()] + 1;
            for target in graph.neighbors(node) {
                let slot = &mut depth[target.index()];
                *slot = (*slot).max(next);
            }
        }

        let layer_count = depth.iter().max().map_or(0, |deepest| deepest + 1);
        let mut layers = vec![Vec::new(); layer_count];
        for node in graph.node_indices() {
            layers[depth[node.index()]].push(node);
        }

        Some(Depths { depth, layers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_graph(vertices: usize, edges: &[(usize, usize)]) -> DiGraph<(), ()> {
        let mut graph = DiGraph::new();
        for _ in 0..vertices {
            graph.add_node(());
        }
        for &(a, b) in edges {
            graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
        }
        graph
    }

    fn indices(layer: &[NodeIndex]) -> Vec<usize> {
        layer.iter().map(|n| n.index()).collect()
    }

    #[test]
    fn longest_path_wins() {
        // 0 → 1 → 2 → 3 and the shortcut 0 → 3
        let graph = build_graph(4, &[(0, 1), (1, 2), (2, 3), (0, 3)]);
        let depths = DepthCounter::count(&graph).expect("acyclic");

        assert_eq!(depths.depth(NodeIndex::new(3)), Some(3));
        assert_eq!(depths.max_depth(), Some(3));
        assert_eq!(depths.layers().len(), 4);
    }

    #[test]
    fn diamond_layers() {
        let graph = build_graph(5, &[(0, 1), (0, 2), (1, 3), (2, 3), (4, 3)]);
        let depths = DepthCounter::count(&graph).expect("acyclic");
        let layers: Vec<Vec<usize>> = depths.layers().iter().map(|l| indices(l)).collect();
        assert_eq!(layers, vec![vec![0, 4], vec![1, 2], vec![3]]);
    }

    #[test]
    fn cyclic_graph_has_no_depths() {
        let graph = build_graph(2, &[(0, 1), (1, 0)]);
        assert!(DepthCounter::count(&graph).is_none());
    }

    #[test]
    fn empty_graph_has_no_layers() {
        let depths = DepthCounter::count(&build_graph(0, &[])).expect("acyclic");
        assert!(depths.layers().is_empty());
        assert_eq!(depths.max_depth(), None);
    }
}
