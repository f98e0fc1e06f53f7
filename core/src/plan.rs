//! Allocation results and errors.
//!
//! This module defines the types returned by the allocator:
//! - [`Assignment`]: an injective partial pairing of agent nodes to goal nodes
//! - [`Allocation`]: assignment plus per-agent paths and run statistics
//! - [`DispatchError`]: errors that can occur during an allocation call

use crate::error_codes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One matched agent/goal pair, both as graph node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedPair {
    pub agent: usize,
    pub goal: usize,
}

/// An injective partial mapping of agents to goals.
///
/// Pairs are ordered by the agent's position in the input sequence. Each
/// agent and each goal appears at most once; the pairing covers
/// `min(|agents|, |goals|)` agents when a full matching exists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Assignment {
    pairs: Vec<AssignedPair>,
}

impl Assignment {
    pub(crate) fn new(pairs: Vec<AssignedPair>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[AssignedPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The goal matched to `agent`, if any.
    pub fn goal_for(&self, agent: usize) -> Option<usize> {
        self.pairs
            .iter()
            .find(|pair| pair.agent == agent)
            .map(|pair| pair.goal)
    }

    /// Total cost of the pairing under a caller-supplied metric.
    pub fn total_cost(&self, mut cost: impl FnMut(usize, usize) -> f64) -> f64 {
        self.pairs.iter().map(|p| cost(p.agent, p.goal)).sum()
    }
}

/// Counters describing what the allocator did during one call.
///
/// The engine performs no I/O and carries no logger; recovered conditions
/// (degenerate splits, cluster-count mismatches, stalled agents) surface
/// here instead of being raised as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllocationStats {
    /// Number of full-matrix Hungarian solves, including fallbacks.
    pub direct_solves: u32,
    /// Bisections rejected because one side lacked an agent or a goal.
    pub degenerate_splits: u32,
    /// Deepest recursion level reached by the bisection policy.
    pub max_depth: u32,
    /// Exemplar clusterings whose group count differed from the request.
    pub cluster_count_mismatches: u32,
    /// Agents paired with a goal no route leads to.
    pub stalled_agents: u32,
}

/// A complete planning result: who goes where, and how.
///
/// `paths` is positionally parallel to the agent input sequence. An agent
/// with no matched goal, or whose matched goal is unreachable, keeps a
/// single-element path holding its own node.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub assignment: Assignment,
    pub paths: Vec<Vec<usize>>,
    pub stats: AllocationStats,
}

/// Errors produced by allocation APIs.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum DispatchError {
    #[error(
        "[FLDSP_GRAPH_001] node index {index} is out of bounds for a graph of {bound} nodes. Suggestion: agents, goals, and seeds must use the same node numbering as the graph."
    )]
    InvalidIndex { index: usize, bound: usize },

    #[error(
        "[FLDSP_MATCH_001] cost matrix entry ({row}, {col}) is {value}, which is not finite. Suggestion: sanitize unreachable distances to a large finite sentinel before matching."
    )]
    NonFiniteCost { row: usize, col: usize, value: f64 },

    #[error(
        "[FLDSP_PATH_001] no route from agent node {agent} to goal node {goal}. Suggestion: treat the agent as stalled and replan when the graph changes."
    )]
    Unreachable { agent: usize, goal: usize },
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::InvalidIndex { .. } => error_codes::GRAPH_INVALID_INDEX,
            DispatchError::NonFiniteCost { .. } => error_codes::MATCH_NON_FINITE_COST,
            DispatchError::Unreachable { .. } => error_codes::PATH_UNREACHABLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_lookup_follows_pairs() {
        let assignment = Assignment::new(vec![
            AssignedPair { agent: 4, goal: 9 },
            AssignedPair { agent: 7, goal: 2 },
        ]);
        assert_eq!(assignment.goal_for(7), Some(2));
        assert_eq!(assignment.goal_for(9), None);
        assert_eq!(assignment.len(), 2);
    }

    #[test]
    fn total_cost_sums_pairwise_metric() {
        let assignment = Assignment::new(vec![
            AssignedPair { agent: 0, goal: 1 },
            AssignedPair { agent: 3, goal: 2 },
        ]);
        let total = assignment.total_cost(|a, g| (a as f64 - g as f64).abs());
        assert_eq!(total, 2.0);
    }

    #[test]
    fn error_codes_are_stable() {
        let err = DispatchError::InvalidIndex { index: 5, bound: 4 };
        assert_eq!(err.code(), "FLDSP_GRAPH_001");
        assert!(err.to_string().starts_with("[FLDSP_GRAPH_001]"));
    }

    #[test]
    fn assignment_serde_round_trip() {
        let assignment = Assignment::new(vec![AssignedPair { agent: 1, goal: 6 }]);
        let json = serde_json::to_string(&assignment).expect("serialize assignment");
        let parsed: Assignment = serde_json::from_str(&json).expect("deserialize assignment");
        assert_eq!(assignment, parsed);
    }
}
