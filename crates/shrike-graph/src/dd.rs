//! Layered graph delta debugging.
//!
//! # Overview
//!
//! [`GraphDd`] minimizes a directed graph whose edges point from a vertex to
//! the vertices it depends on. Removing a vertex removes everything that
//! depends on it, so a candidate is always a closed bipartition of the
//! vertex set.
//!
//! # Algorithm
//!
//! 1. Condense the graph; every SCC becomes one item.
//! 2. The first level is the set of sink components. No sinks means an
//!    empty graph and nothing to do.
//! 3. Each level is minimized by the configured linear algorithm (always
//!    wrapped in a zero test). Its tester, [`LayerToCutTester`], deletes the
//!    proposed components together with every live component that reaches
//!    them, asks the caller's [`GraphPropertyTester`] about the resulting
//!    bipartition and, on `Present`, shrinks the live set.
//! 4. The next level depends on [`Layering`]:
//!    - `Frontier`: a component joins once every successor was retained.
//!    - `Depth`: the live components one step further from the sinks.
//! 5. The live components at the end are the result.
//!
//! [`TraversalOrder::SourcesFirst`] runs the same steps on the transposed
//! condensation, peeling from the sources instead.

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use shrike_core::{
    CancellationToken, DdAlgorithm, DdError, DdResult, GraphCut, GraphPropertyTester, HddGenerator,
    HddLevel, HierarchicalDd, Layering, PropertyOutcome, PropertyTester, ReduceConfig,
    TraversalOrder, ZeroTestDd,
};
use tracing::{debug, info, instrument, trace};

use crate::graph::{CondensedGraph, DepthCounter, LayerToCutTransformer};

// ---------------------------------------------------------------------------
// GraphDd
// ---------------------------------------------------------------------------

/// Bipartition of the input graph's vertex weights, both halves in vertex
/// index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphDdResult<V> {
    pub retained: GraphCut<V>,
    pub deleted: GraphCut<V>,
    /// Number of levels minimized.
    pub levels: usize,
}

/// Graph minimizer built on a linear [`DdAlgorithm`] over component indices.
///
/// The level algorithm must apply the zero test; [`GraphDd::new`] adds it
/// and [`GraphDd::from_config`] forces it on.
#[derive(Debug, Clone)]
pub struct GraphDd<A> {
    algorithm: A,
    order: TraversalOrder,
    layering: Layering,
    cancellation: Option<CancellationToken>,
}

impl<A> GraphDd<ZeroTestDd<A>> {
    /// Minimize each level with `algorithm` followed by a zero test.
    #[must_use]
    pub const fn new(algorithm: A) -> Self {
        Self::from_parts(ZeroTestDd::new(algorithm))
    }
}

impl<A> GraphDd<A> {
    const fn from_parts(algorithm: A) -> Self {
        Self {
            algorithm,
            order: TraversalOrder::SinksFirst,
            layering: Layering::Frontier,
            cancellation: None,
        }
    }

    #[must_use]
    pub const fn with_order(mut self, order: TraversalOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub const fn with_layering(mut self, layering: Layering) -> Self {
        self.layering = layering;
        self
    }

    /// Stop between levels once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Minimize `graph` while `tester` reports the property present.
    ///
    /// # Errors
    ///
    /// Returns [`DdError::Tester`] when the tester fails and
    /// [`DdError::Cancelled`] when the cancellation token is raised.
    #[instrument(
        name = "graph_dd",
        skip_all,
        fields(vertices = graph.node_count(), edges = graph.edge_count())
    )]
    pub fn minimize<C, V, E, P>(
        &mut self,
        ctx: &mut C,
        graph: &DiGraph<V, E>,
        tester: &mut P,
    ) -> Result<GraphDdResult<V>, DdError>
    where
        A: DdAlgorithm<C, NodeIndex>,
        V: Clone,
        P: GraphPropertyTester<C, V> + ?Sized,
    {
        let condensed = CondensedGraph::from_graph(graph);
        let condensed = match self.order {
            TraversalOrder::SinksFirst => condensed,
            TraversalOrder::SourcesFirst => condensed.transposed(),
        };
        debug!(
            components = condensed.component_count(),
            cycles = condensed.cycle_count(),
            "graph condensed"
        );

        let mut generator = LayerGenerator::new(graph, &condensed, tester, self.layering);
        let mut driver = HierarchicalDd::new(&mut self.algorithm);
        if let Some(token) = &self.cancellation {
            driver = driver.with_cancellation(token.clone());
        }
        let levels = driver.minimize(ctx, &mut generator)?.len();

        let live = generator.into_live();
        let (retained, deleted) = bipartition(graph, &condensed, &live);
        info!(
            vertices = graph.node_count(),
            retained = retained.len(),
            deleted = deleted.len(),
            levels,
            "graph delta debugging finished"
        );

        Ok(GraphDdResult {
            retained,
            deleted,
            levels,
        })
    }
}

impl<C: 'static> GraphDd<Box<dyn DdAlgorithm<C, NodeIndex>>> {
    /// Build a minimizer from the `algorithm`, `probabilistic` and `graph`
    /// settings. The zero test is always on for graphs and sits inside the
    /// statistics wrapper.
    #[must_use]
    pub fn from_config(config: &ReduceConfig) -> Self {
        let linear = ReduceConfig {
            zero_test: true,
            ..config.clone()
        };
        Self::from_parts(linear.build_algorithm())
            .with_order(config.graph.order)
            .with_layering(config.graph.layering)
    }
}

/// Split the original vertices by whether their component is in `components`.
fn bipartition<V: Clone, E>(
    graph: &DiGraph<V, E>,
    condensed: &CondensedGraph,
    components: &FixedBitSet,
) -> (GraphCut<V>, GraphCut<V>) {
    let mut retained = Vec::new();
    let mut deleted = Vec::new();
    for vertex in graph.node_indices() {
        let keep = condensed
            .component_of(vertex)
            .is_some_and(|c| components.contains(c.index()));
        if keep {
            retained.push(graph[vertex].clone());
        } else {
            deleted.push(graph[vertex].clone());
        }
    }
    (GraphCut::new(retained), GraphCut::new(deleted))
}

// ---------------------------------------------------------------------------
// LayerToCutTester
// ---------------------------------------------------------------------------

/// Level tester for graph DD.
///
/// Level items are component indices. The tester ignores the proposed
/// retained items and works from the deleted ones: it closes them under
/// "reaches a deleted component" inside the live set and evaluates the
/// caller's tester on the expanded bipartition.
pub struct LayerToCutTester<'a, V, E, P: ?Sized> {
    graph: &'a DiGraph<V, E>,
    condensed: &'a CondensedGraph,
    live: FixedBitSet,
    tester: &'a mut P,
}

impl<'a, V, E, P: ?Sized> LayerToCutTester<'a, V, E, P> {
    /// Start with every component live.
    #[must_use]
    pub fn new(
        graph: &'a DiGraph<V, E>,
        condensed: &'a CondensedGraph,
        tester: &'a mut P,
    ) -> Self {
        let mut live = FixedBitSet::with_capacity(condensed.component_count());
        live.insert_range(..);
        Self {
            graph,
            condensed,
            live,
            tester,
        }
    }

    /// Components still part of the candidate result.
    #[must_use]
    pub const fn live(&self) -> &FixedBitSet {
        &self.live
    }

    #[must_use]
    pub fn into_live(self) -> FixedBitSet {
        self.live
    }
}

impl<C, V, E, P> PropertyTester<C, NodeIndex> for LayerToCutTester<'_, V, E, P>
where
    V: Clone,
    P: GraphPropertyTester<C, V> + ?Sized,
{
    fn test(
        &mut self,
        ctx: &mut C,
        _retained: &[NodeIndex],
        deleted: &[NodeIndex],
    ) -> anyhow::Result<PropertyOutcome> {
        let transformer = LayerToCutTransformer::new(self.condensed.dag());
        let cut = transformer.transform(&self.live, deleted);
        let (retained_vertices, deleted_vertices) =
            bipartition(self.graph, self.condensed, &cut.retained);

        let outcome = self
            .tester
            .test(ctx, &retained_vertices, &deleted_vertices)?;
        trace!(
            proposed = deleted.len(),
            closed = cut.deleted.count_ones(..),
            retained = retained_vertices.len(),
            %outcome,
            "graph cut tested"
        );
        if outcome.is_present() {
            self.live = cut.retained;
        }
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// LayerGenerator
// ---------------------------------------------------------------------------

/// Produces the levels of a graph DD run and lends its
/// [`LayerToCutTester`] to the hierarchical driver.
pub struct LayerGenerator<'a, V, E, P: ?Sized> {
    tester: LayerToCutTester<'a, V, E, P>,
    condensed: &'a CondensedGraph,
    layering: Layering,
    /// Per component: successors retained so far.
    inactive: Vec<usize>,
    /// Remaining depth layers, nearest to the sinks first.
    depth_layers: VecDeque<Vec<NodeIndex>>,
}

impl<'a, V, E, P: ?Sized> LayerGenerator<'a, V, E, P> {
    /// # Panics
    ///
    /// Panics if `condensed` is not acyclic, which a condensation never is.
    #[must_use]
    pub fn new(
        graph: &'a DiGraph<V, E>,
        condensed: &'a CondensedGraph,
        tester: &'a mut P,
        layering: Layering,
    ) -> Self {
        let depth_layers = match layering {
            Layering::Frontier => VecDeque::new(),
            Layering::Depth => {
                // Depth from the sinks is depth from the sources of the
                // transposed DAG.
                let transposed = condensed.transposed();
                DepthCounter::count(transposed.dag())
                    .expect("condensation is acyclic")
                    .into_layers()
                    .into()
            }
        };

        Self {
            tester: LayerToCutTester::new(graph, condensed, tester),
            condensed,
            layering,
            inactive: vec![0; condensed.component_count()],
            depth_layers,
        }
    }

    #[must_use]
    pub fn into_live(self) -> FixedBitSet {
        self.tester.into_live()
    }

    fn next_depth_layer(&mut self) -> Option<HddLevel<NodeIndex>> {
        while let Some(layer) = self.depth_layers.pop_front() {
            let live: Vec<NodeIndex> = layer
                .into_iter()
                .filter(|c| self.tester.live.contains(c.index()))
                .collect();
            if !live.is_empty() {
                return Some(HddLevel::new(live));
            }
        }
        None
    }

    /// Promote predecessors whose successors have all been retained.
    fn next_frontier(&mut self, retained: &[NodeIndex]) -> Option<HddLevel<NodeIndex>> {
        let condensed = self.condensed;
        let dag = condensed.dag();
        let mut frontier = Vec::new();

        for &component in retained {
            if !self.tester.live.contains(component.index()) {
                continue;
            }
            for pred in dag.neighbors_directed(component, Direction::Incoming) {
                let counter = &mut self.inactive[pred.index()];
                *counter += 1;
                let out_degree = dag.neighbors_directed(pred, Direction::Outgoing).count();
                if *counter == out_degree && self.tester.live.contains(pred.index()) {
                    frontier.push(pred);
                }
            }
        }

        frontier.sort_unstable();
        frontier.dedup();
        if frontier.is_empty() {
            None
        } else {
            Some(HddLevel::new(frontier))
        }
    }
}

impl<C, V, E, P> HddGenerator<C, NodeIndex> for LayerGenerator<'_, V, E, P>
where
    V: Clone,
    P: GraphPropertyTester<C, V> + ?Sized,
{
    fn first_level(&mut self, _ctx: &mut C) -> Result<Option<HddLevel<NodeIndex>>, DdError> {
        let level = match self.layering {
            Layering::Frontier => {
                let sinks = self.condensed.sinks();
                if sinks.is_empty() {
                    None
                } else {
                    Some(HddLevel::new(sinks))
                }
            }
            Layering::Depth => self.next_depth_layer(),
        };
        Ok(level)
    }

    fn next_level(
        &mut self,
        _ctx: &mut C,
        minimized: &DdResult<NodeIndex>,
    ) -> Result<Option<HddLevel<NodeIndex>>, DdError> {
        let level = match self.layering {
            Layering::Frontier => self.next_frontier(&minimized.retained),
            Layering::Depth => self.next_depth_layer(),
        };
        Ok(level)
    }

    fn level_tester(&mut self) -> &mut dyn PropertyTester<C, NodeIndex> {
        &mut self.tester
    }
}

#[cfg(test)]
mod tests {
    use shrike_core::{DdMin, ProbabilisticDd};

    use super::*;

    type Cut = GraphCut<&'static str>;

    /// Edges point from a vertex to what it depends on.
    fn build_graph(names: &[&'static str], edges: &[(&str, &str)]) -> DiGraph<&'static str, ()> {
        let mut graph = DiGraph::new();
        for name in names {
            graph.add_node(*name);
        }
        let index = |name: &str| {
            NodeIndex::new(names.iter().position(|n| *n == name).expect("known vertex"))
        };
        for &(a, b) in edges {
            graph.add_edge(index(a), index(b), ());
        }
        graph
    }

    fn requires<'n>(
        needed: &'n [&'static str],
    ) -> impl FnMut(&mut (), &Cut, &Cut) -> anyhow::Result<PropertyOutcome> + 'n {
        move |_: &mut (), retained: &Cut, _: &Cut| {
            Ok(if needed.iter().all(|n| retained.contains(n)) {
                PropertyOutcome::Present
            } else {
                PropertyOutcome::NotPresent
            })
        }
    }

    fn names(cut: &Cut) -> Vec<&'static str> {
        cut.iter().copied().collect()
    }

    #[test]
    fn chain_keeps_only_required_sink() {
        let graph = build_graph(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")],
        );
        let mut tester = requires(&["e"]);
        let result = GraphDd::new(DdMin)
            .minimize(&mut (), &graph, &mut tester)
            .expect("minimize");

        assert_eq!(names(&result.retained), vec!["e"]);
        assert_eq!(names(&result.deleted), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn required_vertex_keeps_its_dependencies() {
        let graph = build_graph(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")],
        );
        let mut tester = requires(&["c"]);
        let result = GraphDd::new(DdMin)
            .minimize(&mut (), &graph, &mut tester)
            .expect("minimize");

        assert_eq!(names(&result.retained), vec!["c", "d", "e"]);
        assert_eq!(names(&result.deleted), vec!["a", "b"]);
    }

    #[test]
    fn sources_first_keeps_dependents() {
        let graph = build_graph(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")],
        );
        let mut tester = requires(&["c"]);
        let result = GraphDd::new(DdMin)
            .with_order(TraversalOrder::SourcesFirst)
            .minimize(&mut (), &graph, &mut tester)
            .expect("minimize");

        assert_eq!(names(&result.retained), vec!["a", "b", "c"]);
    }

    #[test]
    fn unneeded_graph_is_deleted_entirely() {
        let graph = build_graph(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
        let mut tester = requires(&[]);
        let result = GraphDd::new(DdMin)
            .minimize(&mut (), &graph, &mut tester)
            .expect("minimize");

        assert!(result.retained.is_empty());
        assert_eq!(names(&result.deleted), vec!["a", "b", "c"]);
    }

    #[test]
    fn cycles_are_kept_or_deleted_whole() {
        // x ⇄ y form one component that depends on z.
        let graph = build_graph(
            &["w", "x", "y", "z"],
            &[("w", "x"), ("x", "y"), ("y", "x"), ("y", "z")],
        );
        let mut tester = requires(&["x"]);
        let result = GraphDd::new(DdMin)
            .minimize(&mut (), &graph, &mut tester)
            .expect("minimize");

        assert_eq!(names(&result.retained), vec!["x", "y", "z"]);
        assert_eq!(names(&result.deleted), vec!["w"]);
    }

    #[test]
    fn depth_layering_agrees_with_frontier() {
        let graph = build_graph(
            &["a", "b", "c", "d", "e", "f"],
            &[
                ("a", "b"),
                ("a", "c"),
                ("b", "d"),
                ("c", "d"),
                ("e", "d"),
                ("f", "c"),
            ],
        );
        let mut frontier_tester = requires(&["b", "f"]);
        let frontier = GraphDd::new(DdMin)
            .minimize(&mut (), &graph, &mut frontier_tester)
            .expect("minimize");
        let mut depth_tester = requires(&["b", "f"]);
        let depth = GraphDd::new(DdMin)
            .with_layering(Layering::Depth)
            .minimize(&mut (), &graph, &mut depth_tester)
            .expect("minimize");

        assert_eq!(names(&frontier.retained), vec!["b", "c", "d", "f"]);
        assert_eq!(frontier.retained, depth.retained);
        assert_eq!(frontier.deleted, depth.deleted);
    }

    #[test]
    fn empty_graph_finishes_without_testing() {
        let graph = build_graph(&[], &[]);
        let mut calls = 0usize;
        let mut tester = |_: &mut (), _: &Cut, _: &Cut| -> anyhow::Result<PropertyOutcome> {
            calls += 1;
            Ok(PropertyOutcome::Present)
        };
        let result = GraphDd::new(DdMin)
            .minimize(&mut (), &graph, &mut tester)
            .expect("minimize");
        assert!(result.retained.is_empty());
        assert!(result.deleted.is_empty());
        assert_eq!(result.levels, 0);
        assert_eq!(calls, 0);
    }

    #[test]
    fn tester_errors_abort() {
        let graph = build_graph(&["a", "b"], &[("a", "b")]);
        let mut tester = |_: &mut (), _: &Cut, _: &Cut| -> anyhow::Result<PropertyOutcome> {
            anyhow::bail!("sandbox died")
        };
        let err = GraphDd::new(DdMin)
            .minimize(&mut (), &graph, &mut tester)
            .expect_err("tester fails");
        assert!(matches!(err, DdError::Tester(_)));
    }

    #[test]
    fn cancellation_stops_between_levels() {
        let graph = build_graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let token = CancellationToken::new();
        let trigger = token.clone();
        let mut tester = move |_: &mut (), retained: &Cut, _: &Cut| {
            trigger.cancel();
            anyhow::Ok(if retained.contains(&"a") {
                PropertyOutcome::Present
            } else {
                PropertyOutcome::NotPresent
            })
        };
        let err = GraphDd::new(DdMin)
            .with_cancellation(token)
            .minimize(&mut (), &graph, &mut tester)
            .expect_err("cancelled");
        assert!(matches!(err, DdError::Cancelled { levels: 1 }));
    }

    #[test]
    fn probabilistic_inner_algorithm_finds_same_cut() {
        let graph = build_graph(
            &["a", "b", "c", "d"],
            &[("a", "d"), ("b", "d"), ("c", "d")],
        );
        let mut tester = requires(&["b"]);
        let result = GraphDd::new(ProbabilisticDd::default().with_seed(11))
            .minimize(&mut (), &graph, &mut tester)
            .expect("minimize");
        assert_eq!(names(&result.retained), vec!["b", "d"]);
    }

    #[test]
    fn configured_minimizer_uses_graph_settings() {
        let toml = "log_statistics = false\n[graph]\norder = \"sources_first\"\n";
        let config = shrike_core::parse_config(toml).expect("parse");
        let graph = build_graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let mut tester = requires(&["b"]);
        let result = GraphDd::<Box<dyn DdAlgorithm<(), NodeIndex>>>::from_config(&config)
            .minimize(&mut (), &graph, &mut tester)
            .expect("minimize");
        assert_eq!(names(&result.retained), vec!["a", "b"]);
    }
}
