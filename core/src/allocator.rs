//! Hierarchical agent-to-goal allocation.
//!
//! The allocator turns a graph plus ordered agent/goal node sets into an
//! optimal (or near-optimal, under partitioning) assignment and one path
//! per agent. Problem shapes are handled in a fixed order:
//!
//! 1. an empty side yields an empty assignment;
//! 2. a single agent takes its nearest goal;
//! 3. fewer goals than agents forces one direct matrix solve;
//! 4. otherwise the configured [`AllocationPolicy`] decides between a
//!    direct solve, recursive spectral bisection, and goal clustering.
//!
//! Degenerate bisections (a side without both an agent and a goal, or
//! with more agents than goals) fall back to the direct solve on the same
//! inputs, so partitioning can only trade optimality for speed, never
//! fail or strand a coverable agent.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{AllocationPolicy, DispatchConfig};
use crate::graph::Graph;
use crate::matching::solve_assignment;
use crate::partition::exemplar::{self, ExemplarParams};
use crate::partition::{inverse_distance_similarity, spectral};
use crate::path::reconstruct_path;
use crate::plan::{Allocation, AllocationStats, AssignedPair, Assignment, DispatchError};
use crate::shortest_path::{shortest_paths, SearchTrees};

/// Read-only inputs shared by every level of the recursion.
struct SolveContext<'a> {
    agents: &'a [usize],
    goals: &'a [usize],
    trees: &'a SearchTrees,
    config: &'a DispatchConfig,
}

impl SolveContext<'_> {
    fn agent_node(&self, pos: usize) -> usize {
        self.agents[pos]
    }

    fn goal_node(&self, pos: usize) -> usize {
        self.goals[pos]
    }

    /// Agent-to-goal distance with unreachable pairs replaced by the
    /// configured finite sentinel, as required by the matching solver.
    fn sanitized_cost(&self, agent_pos: usize, goal_pos: usize) -> f64 {
        let dist = self
            .trees
            .distance(self.agent_node(agent_pos), self.goal_node(goal_pos));
        if dist.is_finite() {
            dist
        } else {
            self.config.unreachable_cost
        }
    }
}

/// Computes the agent-to-goal assignment for one planning cycle.
///
/// `agents` and `goals` are ordered node-index sequences; the pairing is
/// injective both ways and covers `min(|agents|, |goals|)` agents. Empty
/// sets yield an empty assignment. The config is assumed to be validated
/// (see [`DispatchConfig::validate`]).
pub fn compute_assignment(
    graph: &Graph,
    agents: &[usize],
    goals: &[usize],
    config: &DispatchConfig,
) -> Result<Assignment, DispatchError> {
    graph.check_nodes(agents)?;
    graph.check_nodes(goals)?;
    if agents.is_empty() || goals.is_empty() {
        return Ok(Assignment::default());
    }

    let seeds: Vec<usize> = agents.iter().chain(goals.iter()).copied().collect();
    let trees = shortest_paths(graph, &seeds)?;
    let ctx = SolveContext {
        agents,
        goals,
        trees: &trees,
        config,
    };
    let mut stats = AllocationStats::default();
    let mut rng = StdRng::seed_from_u64(config.rng_seed);

    let pairs = solve_positions(&ctx, &mut rng, &mut stats)?;
    Ok(to_assignment(&pairs, agents, goals))
}

/// Computes one path per agent, positionally parallel to `agents`.
///
/// Agents without a matched goal, or matched to an unreachable goal, keep
/// a single-element path holding their own node.
pub fn compute_paths(
    graph: &Graph,
    agents: &[usize],
    goals: &[usize],
    config: &DispatchConfig,
) -> Result<Vec<Vec<usize>>, DispatchError> {
    allocate(graph, agents, goals, config).map(|allocation| allocation.paths)
}

/// Runs a full planning cycle: assignment, paths, and run statistics.
///
/// Paths are consumed one step per tick by the caller; once any agent
/// reaches its goal the whole allocation must be recomputed, because the
/// optimal matching for the remaining agents may have shifted.
pub fn allocate(
    graph: &Graph,
    agents: &[usize],
    goals: &[usize],
    config: &DispatchConfig,
) -> Result<Allocation, DispatchError> {
    graph.check_nodes(agents)?;
    graph.check_nodes(goals)?;

    let mut stats = AllocationStats::default();
    if agents.is_empty() || goals.is_empty() {
        return Ok(Allocation {
            assignment: Assignment::default(),
            paths: agents.iter().map(|&agent| vec![agent]).collect(),
            stats,
        });
    }

    let seeds: Vec<usize> = agents.iter().chain(goals.iter()).copied().collect();
    let trees = shortest_paths(graph, &seeds)?;
    let ctx = SolveContext {
        agents,
        goals,
        trees: &trees,
        config,
    };
    let mut rng = StdRng::seed_from_u64(config.rng_seed);
    let pairs = solve_positions(&ctx, &mut rng, &mut stats)?;

    let mut goal_by_pos: Vec<Option<usize>> = vec![None; agents.len()];
    for &(agent_pos, goal_pos) in &pairs {
        goal_by_pos[agent_pos] = Some(goals[goal_pos]);
    }

    let mut paths = Vec::with_capacity(agents.len());
    for (pos, &agent) in agents.iter().enumerate() {
        match goal_by_pos[pos] {
            None => paths.push(vec![agent]),
            Some(goal) => match reconstruct_path(agent, goal, &trees) {
                Ok(path) => paths.push(path),
                Err(DispatchError::Unreachable { .. }) => {
                    stats.stalled_agents += 1;
                    paths.push(vec![agent]);
                }
                Err(other) => return Err(other),
            },
        }
    }

    Ok(Allocation {
        assignment: to_assignment(&pairs, agents, goals),
        paths,
        stats,
    })
}

/// Solves the full problem in position space (indices into the input
/// sequences), returning pairs sorted by agent position.
fn solve_positions(
    ctx: &SolveContext<'_>,
    rng: &mut StdRng,
    stats: &mut AllocationStats,
) -> Result<Vec<(usize, usize)>, DispatchError> {
    let agent_pos: Vec<usize> = (0..ctx.agents.len()).collect();
    let goal_pos: Vec<usize> = (0..ctx.goals.len()).collect();
    let mut pairs = allocate_subset(ctx, &agent_pos, &goal_pos, rng, stats, 0)?;
    pairs.sort_unstable_by_key(|&(pos, _)| pos);
    Ok(pairs)
}

fn to_assignment(pairs: &[(usize, usize)], agents: &[usize], goals: &[usize]) -> Assignment {
    Assignment::new(
        pairs
            .iter()
            .map(|&(agent_pos, goal_pos)| AssignedPair {
                agent: agents[agent_pos],
                goal: goals[goal_pos],
            })
            .collect(),
    )
}

fn allocate_subset(
    ctx: &SolveContext<'_>,
    agent_pos: &[usize],
    goal_pos: &[usize],
    rng: &mut StdRng,
    stats: &mut AllocationStats,
    depth: u32,
) -> Result<Vec<(usize, usize)>, DispatchError> {
    stats.max_depth = stats.max_depth.max(depth);

    if agent_pos.is_empty() || goal_pos.is_empty() {
        return Ok(Vec::new());
    }

    if agent_pos.len() == 1 {
        let agent = ctx.agent_node(agent_pos[0]);
        let mut best = goal_pos[0];
        for &candidate in &goal_pos[1..] {
            let closer = ctx.trees.distance(agent, ctx.goal_node(candidate))
                < ctx.trees.distance(agent, ctx.goal_node(best));
            if closer {
                best = candidate;
            }
        }
        return Ok(vec![(agent_pos[0], best)]);
    }

    // With fewer goals than agents no partition can help; one exact solve
    // covers every goal and leaves the surplus agents unmatched.
    if goal_pos.len() < agent_pos.len() {
        return direct_solve(ctx, agent_pos, goal_pos, stats);
    }

    match ctx.config.policy {
        AllocationPolicy::Direct => direct_solve(ctx, agent_pos, goal_pos, stats),
        AllocationPolicy::RecursiveBisection => {
            bisect_and_recurse(ctx, agent_pos, goal_pos, rng, stats, depth)
        }
        AllocationPolicy::ClusterThenAssign => {
            cluster_then_assign(ctx, agent_pos, goal_pos, rng, stats)
        }
    }
}

fn direct_solve(
    ctx: &SolveContext<'_>,
    agent_pos: &[usize],
    goal_pos: &[usize],
    stats: &mut AllocationStats,
) -> Result<Vec<(usize, usize)>, DispatchError> {
    stats.direct_solves += 1;
    let costs = DMatrix::from_fn(agent_pos.len(), goal_pos.len(), |i, j| {
        ctx.sanitized_cost(agent_pos[i], goal_pos[j])
    });
    let matched = solve_assignment(&costs, false)?;
    Ok(matched
        .into_iter()
        .map(|(i, j)| (agent_pos[i], goal_pos[j]))
        .collect())
}

fn bisect_and_recurse(
    ctx: &SolveContext<'_>,
    agent_pos: &[usize],
    goal_pos: &[usize],
    rng: &mut StdRng,
    stats: &mut AllocationStats,
    depth: u32,
) -> Result<Vec<(usize, usize)>, DispatchError> {
    let member_count = agent_pos.len() + goal_pos.len();
    if member_count < ctx.config.min_bisection_size {
        return direct_solve(ctx, agent_pos, goal_pos, stats);
    }

    let combined: Vec<usize> = agent_pos
        .iter()
        .map(|&pos| ctx.agent_node(pos))
        .chain(goal_pos.iter().map(|&pos| ctx.goal_node(pos)))
        .collect();
    let similarity = inverse_distance_similarity(&combined, ctx.trees);
    let split = spectral::bisect(&similarity, ctx.config.kmeans_max_iterations, rng);

    let (left_agents, left_goals) = split_members(&split.left, agent_pos, goal_pos);
    let (right_agents, right_goals) = split_members(&split.right, agent_pos, goal_pos);

    // A usable split keeps both sides mixed AND keeps every agent
    // coverable: a side with more agents than goals would strand the
    // surplus even though goals exist on the far side.
    let usable = !left_agents.is_empty()
        && !right_agents.is_empty()
        && left_goals.len() >= left_agents.len()
        && right_goals.len() >= right_agents.len();
    if !usable {
        stats.degenerate_splits += 1;
        return direct_solve(ctx, agent_pos, goal_pos, stats);
    }

    let mut pairs = allocate_subset(ctx, &left_agents, &left_goals, rng, stats, depth + 1)?;
    pairs.extend(allocate_subset(
        ctx,
        &right_agents,
        &right_goals,
        rng,
        stats,
        depth + 1,
    )?);
    Ok(pairs)
}

/// Maps one side of a bisection (indices into the combined agents-then-
/// goals ordering) back to agent and goal positions.
fn split_members(
    side: &[usize],
    agent_pos: &[usize],
    goal_pos: &[usize],
) -> (Vec<usize>, Vec<usize>) {
    let mut agents = Vec::new();
    let mut goals = Vec::new();
    for &member in side {
        if member < agent_pos.len() {
            agents.push(agent_pos[member]);
        } else {
            goals.push(goal_pos[member - agent_pos.len()]);
        }
    }
    (agents, goals)
}

fn cluster_then_assign(
    ctx: &SolveContext<'_>,
    agent_pos: &[usize],
    goal_pos: &[usize],
    rng: &mut StdRng,
    stats: &mut AllocationStats,
) -> Result<Vec<(usize, usize)>, DispatchError> {
    let goal_nodes: Vec<usize> = goal_pos.iter().map(|&pos| ctx.goal_node(pos)).collect();
    let similarity = inverse_distance_similarity(&goal_nodes, ctx.trees);
    let params = ExemplarParams {
        damping: ctx.config.exemplar_damping,
        max_iterations: ctx.config.exemplar_max_iterations,
        convergence_window: ctx.config.exemplar_convergence_window,
        preference: ctx.config.exemplar_preference,
    };

    // The returned group count is authoritative; agents beyond it simply
    // stay unassigned for this cycle.
    let groups = exemplar::cluster(&similarity, agent_pos.len(), &params, rng);
    if groups.len() != agent_pos.len() {
        stats.cluster_count_mismatches += 1;
    }

    let costs = DMatrix::from_fn(agent_pos.len(), groups.len(), |i, g| {
        let agent = ctx.agent_node(agent_pos[i]);
        groups[g]
            .iter()
            .map(|&member| {
                let dist = ctx.trees.distance(agent, goal_nodes[member]);
                if dist.is_finite() {
                    dist
                } else {
                    ctx.config.unreachable_cost
                }
            })
            .fold(f64::INFINITY, f64::min)
    });
    let matched = solve_assignment(&costs, false)?;

    let mut pairs = Vec::with_capacity(matched.len());
    for (i, g) in matched {
        let agent = ctx.agent_node(agent_pos[i]);
        let nearest = groups[g]
            .iter()
            .copied()
            .min_by(|&x, &y| {
                ctx.trees
                    .distance(agent, goal_nodes[x])
                    .total_cmp(&ctx.trees.distance(agent, goal_nodes[y]))
            })
            .expect("exemplar groups are never empty");
        pairs.push((agent_pos[i], goal_pos[nearest]));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> Graph {
        let mut graph = Graph::with_nodes(n);
        for i in 0..n - 1 {
            graph.add_undirected_edge(i, i + 1, 1.0);
        }
        graph
    }

    #[test]
    fn empty_sides_yield_empty_assignment() {
        let graph = path_graph(4);
        let config = DispatchConfig::default();

        let no_agents = compute_assignment(&graph, &[], &[1, 2], &config).expect("no agents");
        assert!(no_agents.is_empty());

        let no_goals = compute_assignment(&graph, &[0, 3], &[], &config).expect("no goals");
        assert!(no_goals.is_empty());
    }

    #[test]
    fn empty_goals_still_produce_standing_paths() {
        let graph = path_graph(3);
        let allocation =
            allocate(&graph, &[2, 0], &[], &DispatchConfig::default()).expect("no goals");
        assert_eq!(allocation.paths, vec![vec![2], vec![0]]);
    }

    #[test]
    fn single_agent_takes_nearest_goal_with_low_index_tie_break() {
        let graph = path_graph(5);
        let config = DispatchConfig::default();

        // Goals 0 and 4 are both two steps from node 2; input order wins.
        let assignment =
            compute_assignment(&graph, &[2], &[4, 0], &config).expect("valid indices");
        assert_eq!(assignment.pairs(), &[AssignedPair { agent: 2, goal: 4 }]);
    }

    #[test]
    fn surplus_agents_cover_every_goal() {
        let graph = path_graph(6);
        let config = DispatchConfig::default();

        let assignment =
            compute_assignment(&graph, &[0, 2, 5], &[1, 4], &config).expect("valid indices");
        assert_eq!(assignment.len(), 2);
        let mut goals: Vec<usize> = assignment.pairs().iter().map(|p| p.goal).collect();
        goals.sort_unstable();
        assert_eq!(goals, vec![1, 4]);
    }

    #[test]
    fn invalid_agent_index_is_fatal() {
        let graph = path_graph(3);
        let err = compute_assignment(&graph, &[9], &[1], &DispatchConfig::default())
            .expect_err("agent 9 is out of bounds");
        assert!(matches!(
            err,
            DispatchError::InvalidIndex { index: 9, bound: 3 }
        ));
    }
}
