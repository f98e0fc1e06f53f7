//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use fleet_dispatch::Graph;

pub fn node_at(width: usize, row: usize, col: usize) -> usize {
    row * width + col
}

/// A 4-connected unit-weight grid, the shape the board collaborator feeds
/// the engine. Obstacle cells keep their node index but get no edges.
pub fn grid_graph_with_obstacles(
    height: usize,
    width: usize,
    obstacles: &[(usize, usize)],
) -> Graph {
    let blocked = |row: usize, col: usize| obstacles.contains(&(row, col));
    let mut graph = Graph::with_nodes(height * width);
    for row in 0..height {
        for col in 0..width {
            if blocked(row, col) {
                continue;
            }
            if row + 1 < height && !blocked(row + 1, col) {
                graph.add_undirected_edge(
                    node_at(width, row, col),
                    node_at(width, row + 1, col),
                    1.0,
                );
            }
            if col + 1 < width && !blocked(row, col + 1) {
                graph.add_undirected_edge(
                    node_at(width, row, col),
                    node_at(width, row, col + 1),
                    1.0,
                );
            }
        }
    }
    graph
}

pub fn grid_graph(height: usize, width: usize) -> Graph {
    grid_graph_with_obstacles(height, width, &[])
}

/// The linear world 0 - 1 - ... - n-1 with unit weights.
pub fn path_graph(n: usize) -> Graph {
    let mut graph = Graph::with_nodes(n);
    for i in 0..n.saturating_sub(1) {
        graph.add_undirected_edge(i, i + 1, 1.0);
    }
    graph
}
