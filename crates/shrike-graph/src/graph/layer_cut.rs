//! From deleted frontier components to a full bipartition.
//!
//! Deleting a component invalidates everything that depends on it, i.e.
//! every component with a path into it. [`LayerToCutTransformer`] computes
//! that backward closure inside the live subgraph and splits the live set
//! into what survives and what goes.

use std::convert::Infallible;

use fixedbitset::FixedBitSet;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::condense::CondensedVertex;
use crate::graph::walker::{DepthFirstGraphWalker, DfsVisitor, DiGraphView};

/// Live components split by a proposed deletion. Both sets are indexed by
/// component `NodeIndex` and are disjoint; their union is the live set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerCut {
    pub retained: FixedBitSet,
    pub deleted: FixedBitSet,
}

#[derive(Debug, Clone, Copy)]
pub struct LayerToCutTransformer<'g> {
    dag: &'g DiGraph<CondensedVertex, ()>,
}

impl<'g> LayerToCutTransformer<'g> {
    #[must_use]
    pub const fn new(dag: &'g DiGraph<CondensedVertex, ()>) -> Self {
        Self { dag }
    }

    /// Split `live` by deleting `deleted` and every live component that
    /// reaches one of them. Components outside `live` are ignored.
    #[must_use]
    pub fn transform(&self, live: &FixedBitSet, deleted: &[NodeIndex]) -> LayerCut {
        let view = DiGraphView::new(self.dag).reversed().masked(live);
        let starts = deleted.iter().copied().filter(|c| live.contains(c.index()));
        let reach = match DepthFirstGraphWalker::new().walk(
            &view,
            starts,
            Reach(FixedBitSet::with_capacity(self.dag.node_count())),
        ) {
            Ok(reach) => reach,
            Err(never) => match never {},
        };

        let mut retained = live.clone();
        retained.difference_with(&reach);
        LayerCut {
            retained,
            deleted: reach,
        }
    }
}

/// Collects every visited component.
struct Reach(FixedBitSet);

impl DfsVisitor<NodeIndex> for Reach {
    type Output = FixedBitSet;
    type Error = Infallible;

    fn visit_node(&mut self, node: &NodeIndex) -> Result<(), Infallible> {
        self.0.insert(node.index());
        Ok(())
    }

    fn finish(self) -> FixedBitSet {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: usize) -> DiGraph<CondensedVertex, ()> {
        let mut dag = DiGraph::new();
        for v in 0..len {
            dag.add_node(CondensedVertex {
                members: vec![NodeIndex::new(v)],
            });
        }
        for v in 1..len {
            dag.add_edge(NodeIndex::new(v - 1), NodeIndex::new(v), ());
        }
        dag
    }

    fn full(len: usize) -> FixedBitSet {
        let mut set = FixedBitSet::with_capacity(len);
        set.insert_range(..);
        set
    }

    fn ones(set: &FixedBitSet) -> Vec<usize> {
        set.ones().collect()
    }

    #[test]
    fn deleting_a_vertex_deletes_its_ancestors() {
        // 0 → 1 → 2 → 3 → 4
        let dag = chain(5);
        let cut = LayerToCutTransformer::new(&dag).transform(&full(5), &[NodeIndex::new(2)]);

        assert_eq!(ones(&cut.deleted), vec![0, 1, 2]);
        assert_eq!(ones(&cut.retained), vec![3, 4]);
    }

    #[test]
    fn cuts_are_complementary_within_live() {
        let dag = chain(5);
        let mut live = full(5);
        live.set(0, false);
        let cut = LayerToCutTransformer::new(&dag).transform(&live, &[NodeIndex::new(3)]);

        assert_eq!(ones(&cut.deleted), vec![1, 2, 3]);
        assert_eq!(ones(&cut.retained), vec![4]);
        assert!(cut.retained.is_disjoint(&cut.deleted));
        let mut union = cut.retained.clone();
        union.union_with(&cut.deleted);
        assert_eq!(union, live);
    }

    #[test]
    fn dead_components_are_not_deleted_again() {
        let dag = chain(3);
        let mut live = full(3);
        live.set(1, false);
        let cut = LayerToCutTransformer::new(&dag).transform(&live, &[NodeIndex::new(1)]);

        assert_eq!(cut.deleted.count_ones(..), 0);
        assert_eq!(ones(&cut.retained), vec![0, 2]);
    }

    #[test]
    fn empty_proposal_keeps_everything_live() {
        let dag = chain(4);
        let cut = LayerToCutTransformer::new(&dag).transform(&full(4), &[]);
        assert_eq!(ones(&cut.retained), vec![0, 1, 2, 3]);
    }
}
