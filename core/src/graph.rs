//! Weighted graph over dense node indices.
//!
//! The engine treats the graph as read-only for the duration of an
//! allocation call. Nodes are `0..node_count`; edges carry a finite weight
//! and may be directed or undirected (an undirected edge is stored as two
//! directed arcs). The graph tracks two properties incrementally so the
//! shortest-path oracle can select an algorithm without rescanning edges:
//! whether every weight is exactly `1.0`, and whether any weight is
//! negative.

use crate::plan::DispatchError;

#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    adj: Vec<Vec<(usize, f64)>>,
    unit_weights: bool,
    has_negative: bool,
}

impl Graph {
    /// Creates a graph with `node_count` nodes and no edges.
    pub fn with_nodes(node_count: usize) -> Self {
        Self {
            adj: vec![Vec::new(); node_count],
            unit_weights: true,
            has_negative: false,
        }
    }

    /// Creates a graph from a directed edge list.
    pub fn from_edges(node_count: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut graph = Self::with_nodes(node_count);
        for &(from, to, weight) in edges {
            graph.add_edge(from, to, weight);
        }
        graph
    }

    /// Adds a directed arc `from -> to`.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint is out of bounds or the weight is not
    /// finite. Edge construction happens on the collaborator's side of the
    /// boundary, so malformed edges are programmer errors rather than
    /// recoverable input.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64) {
        assert!(
            from < self.node_count() && to < self.node_count(),
            "edge ({from}, {to}) is out of bounds for {} nodes",
            self.node_count()
        );
        assert!(weight.is_finite(), "edge weight must be finite");

        self.unit_weights &= weight == 1.0;
        self.has_negative |= weight < 0.0;
        self.adj[from].push((to, weight));
    }

    /// Adds both `a -> b` and `b -> a` with the same weight.
    pub fn add_undirected_edge(&mut self, a: usize, b: usize, weight: f64) {
        self.add_edge(a, b, weight);
        self.add_edge(b, a, weight);
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    pub fn neighbors(&self, node: usize) -> &[(usize, f64)] {
        &self.adj[node]
    }

    /// True when every edge weight is exactly `1.0` (BFS is exact).
    pub fn has_unit_weights(&self) -> bool {
        self.unit_weights
    }

    pub fn has_negative_weights(&self) -> bool {
        self.has_negative
    }

    /// Validates caller-supplied node indices (agents, goals, seeds).
    pub(crate) fn check_nodes(&self, nodes: &[usize]) -> Result<(), DispatchError> {
        let bound = self.node_count();
        for &node in nodes {
            if node >= bound {
                return Err(DispatchError::InvalidIndex { index: node, bound });
            }
        }
        Ok(())
    }
}
