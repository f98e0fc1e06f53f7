//! Path reconstruction from predecessor trees.

use crate::plan::DispatchError;
use crate::shortest_path::SearchTrees;

/// Walks the predecessor tree rooted at `goal` from `agent`, returning the
/// node sequence `[agent, ..., goal]`.
///
/// Fails with [`DispatchError::Unreachable`] when the goal has no route
/// from the agent, or when the walk outlives the shortest distance (for
/// unit-weight trees) or the node count (otherwise) — either means the
/// predecessor tree is inconsistent with the distance table.
pub fn reconstruct_path(
    agent: usize,
    goal: usize,
    trees: &SearchTrees,
) -> Result<Vec<usize>, DispatchError> {
    let distance = trees.distance(goal, agent);
    if !distance.is_finite() {
        return Err(DispatchError::Unreachable { agent, goal });
    }

    // A consistent tree yields distance+1 nodes on unit weights; weighted
    // trees are only bounded by the node count (paths are simple).
    let max_nodes = if trees.has_unit_weights() {
        distance as usize + 1
    } else {
        trees.node_count()
    };

    let mut path = vec![agent];
    let mut current = agent;
    while let Some(next) = trees.predecessor(goal, current) {
        path.push(next);
        current = next;
        if path.len() > max_nodes {
            return Err(DispatchError::Unreachable { agent, goal });
        }
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::shortest_path::shortest_paths;

    fn path_graph(n: usize) -> Graph {
        let mut graph = Graph::with_nodes(n);
        for i in 0..n - 1 {
            graph.add_undirected_edge(i, i + 1, 1.0);
        }
        graph
    }

    #[test]
    fn walks_from_agent_to_goal() {
        let graph = path_graph(4);
        let trees = shortest_paths(&graph, &[3]).expect("valid seed");

        let path = reconstruct_path(0, 3, &trees).expect("goal is reachable");
        assert_eq!(path, vec![0, 1, 2, 3]);
    }

    #[test]
    fn agent_standing_on_goal_yields_single_node() {
        let graph = path_graph(3);
        let trees = shortest_paths(&graph, &[1]).expect("valid seed");

        let path = reconstruct_path(1, 1, &trees).expect("trivially reachable");
        assert_eq!(path, vec![1]);
    }

    #[test]
    fn unreachable_goal_is_an_error() {
        let mut graph = Graph::with_nodes(4);
        graph.add_undirected_edge(0, 1, 1.0);
        graph.add_undirected_edge(2, 3, 1.0);
        let trees = shortest_paths(&graph, &[3]).expect("valid seed");

        let err = reconstruct_path(0, 3, &trees).expect_err("components are disconnected");
        assert!(matches!(
            err,
            DispatchError::Unreachable { agent: 0, goal: 3 }
        ));
    }

    #[test]
    fn weighted_paths_follow_the_cheap_route() {
        let mut graph = Graph::with_nodes(3);
        graph.add_undirected_edge(0, 2, 5.0);
        graph.add_undirected_edge(0, 1, 1.0);
        graph.add_undirected_edge(1, 2, 2.0);
        let trees = shortest_paths(&graph, &[2]).expect("valid seed");

        let path = reconstruct_path(0, 2, &trees).expect("goal is reachable");
        assert_eq!(path, vec![0, 1, 2]);
    }
}
