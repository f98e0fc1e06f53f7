//! Multi-seed shortest-path oracle.
//!
//! For every seed node the oracle computes a dense distance vector and a
//! predecessor tree rooted at that seed. The per-seed algorithm is chosen
//! from graph properties: BFS when every weight is exactly one, binary-heap
//! Dijkstra when weights are non-negative, Bellman-Ford relaxation when
//! negative weights cannot be ruled out.
//!
//! `pred[seed][v]` holds the node one step closer to the seed on the
//! shortest path between `v` and the seed, or `None` when `v` is the seed
//! itself or unreachable. With a goal node as the seed, the predecessor of
//! an agent's node is directly the agent's next hop.

use std::collections::{BinaryHeap, VecDeque};

use rustc_hash::FxHashMap;

use crate::graph::Graph;
use crate::plan::DispatchError;

/// Distance table and predecessor trees for a set of seeds.
#[derive(Debug, Clone, Default)]
pub struct SearchTrees {
    dist: FxHashMap<usize, Vec<f64>>,
    pred: FxHashMap<usize, Vec<Option<usize>>>,
    node_count: usize,
    unit_weights: bool,
}

impl SearchTrees {
    /// Distance from `seed` to `node`; `f64::INFINITY` when unreachable.
    ///
    /// # Panics
    ///
    /// Panics if `seed` was not part of the computed seed set.
    pub fn distance(&self, seed: usize, node: usize) -> f64 {
        self.dist
            .get(&seed)
            .unwrap_or_else(|| panic!("seed {seed} was not part of the search"))[node]
    }

    /// The node one step closer to `seed` from `node`, or `None` when
    /// `node` is the seed itself or unreachable.
    ///
    /// # Panics
    ///
    /// Panics if `seed` was not part of the computed seed set.
    pub fn predecessor(&self, seed: usize, node: usize) -> Option<usize> {
        self.pred
            .get(&seed)
            .unwrap_or_else(|| panic!("seed {seed} was not part of the search"))[node]
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// True when the trees were computed by BFS over unit weights, in which
    /// case every finite distance is an exact hop count.
    pub(crate) fn has_unit_weights(&self) -> bool {
        self.unit_weights
    }
}

/// Computes distances and predecessor trees for every distinct seed.
///
/// Seeds are computed lazily and at most once each; repeated indices are
/// cheap. Fails with [`DispatchError::InvalidIndex`] when a seed lies
/// outside the graph.
pub fn shortest_paths(graph: &Graph, seeds: &[usize]) -> Result<SearchTrees, DispatchError> {
    graph.check_nodes(seeds)?;

    let mut trees = SearchTrees {
        node_count: graph.node_count(),
        unit_weights: graph.has_unit_weights(),
        ..SearchTrees::default()
    };

    for &seed in seeds {
        if trees.dist.contains_key(&seed) {
            continue;
        }
        let (dist, pred) = if graph.has_unit_weights() {
            bfs(graph, seed)
        } else if !graph.has_negative_weights() {
            dijkstra(graph, seed)
        } else {
            bellman_ford(graph, seed)
        };
        trees.dist.insert(seed, dist);
        trees.pred.insert(seed, pred);
    }

    Ok(trees)
}

type SeedTree = (Vec<f64>, Vec<Option<usize>>);

fn bfs(graph: &Graph, seed: usize) -> SeedTree {
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut pred = vec![None; n];
    let mut queue = VecDeque::new();

    dist[seed] = 0.0;
    queue.push_back(seed);

    while let Some(node) = queue.pop_front() {
        for &(next, _) in graph.neighbors(node) {
            if dist[next].is_infinite() {
                dist[next] = dist[node] + 1.0;
                pred[next] = Some(node);
                queue.push_back(next);
            }
        }
    }

    (dist, pred)
}

/// Min-heap entry ordered by distance, then node index for determinism.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    dist: f64,
    node: usize,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed so BinaryHeap pops the smallest distance first.
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

fn dijkstra(graph: &Graph, seed: usize) -> SeedTree {
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut pred = vec![None; n];
    let mut heap = BinaryHeap::new();

    dist[seed] = 0.0;
    heap.push(HeapEntry {
        dist: 0.0,
        node: seed,
    });

    while let Some(HeapEntry { dist: d, node }) = heap.pop() {
        if d > dist[node] {
            continue; // stale entry
        }
        for &(next, weight) in graph.neighbors(node) {
            let candidate = d + weight;
            if candidate < dist[next] {
                dist[next] = candidate;
                pred[next] = Some(node);
                heap.push(HeapEntry {
                    dist: candidate,
                    node: next,
                });
            }
        }
    }

    (dist, pred)
}

fn bellman_ford(graph: &Graph, seed: usize) -> SeedTree {
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut pred = vec![None; n];

    dist[seed] = 0.0;

    for _ in 1..n.max(1) {
        let mut changed = false;
        for node in 0..n {
            if dist[node].is_infinite() {
                continue;
            }
            for &(next, weight) in graph.neighbors(node) {
                let candidate = dist[node] + weight;
                if candidate < dist[next] {
                    dist[next] = candidate;
                    pred[next] = Some(node);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    (dist, pred)
}
