//! Fleet Dispatch: a multi-agent task-allocation and routing engine.
//!
//! Given a graph, a set of agent positions, and a set of goal positions,
//! this crate computes a cost-minimizing pairing of agents to goals and
//! the concrete path each agent must follow:
//! - multi-seed shortest paths with predecessor reconstruction
//! - optimal bipartite matching over the agent/goal distance matrix
//! - recursive spectral bisection and exemplar clustering to break large
//!   problems into smaller independent ones before exact matching
//!
//! The engine is a pure computation: it performs no I/O, owns no state
//! across calls, and leaves board rules, rendering, and tick handling to
//! the caller.
//!
//! # Quick Start
//!
//! ```
//! use fleet_dispatch::{compute_paths, DispatchConfig, Graph};
//!
//! // A path-shaped world: 0 - 1 - 2 - 3.
//! let mut graph = Graph::with_nodes(4);
//! graph.add_undirected_edge(0, 1, 1.0);
//! graph.add_undirected_edge(1, 2, 1.0);
//! graph.add_undirected_edge(2, 3, 1.0);
//!
//! let paths = compute_paths(&graph, &[0], &[3], &DispatchConfig::default())?;
//! assert_eq!(paths, vec![vec![0, 1, 2, 3]]);
//! # Ok::<(), fleet_dispatch::DispatchError>(())
//! ```

mod allocator;
mod config;
mod error_codes;
mod graph;
mod matching;
pub(crate) mod partition;
mod path;
mod plan;
mod shortest_path;

pub use allocator::{allocate, compute_assignment, compute_paths};
pub use config::{AllocationPolicy, ConfigError, DispatchConfig, DispatchConfigBuilder};
pub use graph::Graph;
pub use matching::solve_assignment;
pub use path::reconstruct_path;
pub use plan::{Allocation, AllocationStats, AssignedPair, Assignment, DispatchError};
pub use shortest_path::{shortest_paths, SearchTrees};
