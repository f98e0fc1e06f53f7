mod common;

use common::path_graph;
use fleet_dispatch::{allocate, compute_assignment, DispatchConfig};

#[test]
fn degenerate_bisection_falls_back_to_direct_matching() {
    // Agents huddle at one end, goals at the other: the spectral split
    // separates agents from goals, which no side-local matching can use.
    let graph = path_graph(7);
    let agents = [0, 1];
    let goals = [5, 6];

    let recursive = allocate(&graph, &agents, &goals, &DispatchConfig::balanced())
        .expect("valid indices");
    assert_eq!(recursive.stats.degenerate_splits, 1);
    assert_eq!(recursive.stats.direct_solves, 1);

    let direct =
        allocate(&graph, &agents, &goals, &DispatchConfig::direct()).expect("valid indices");
    assert_eq!(
        recursive.assignment, direct.assignment,
        "fallback must reproduce the direct solve exactly"
    );
}

#[test]
fn well_separated_halves_recurse_instead_of_solving_globally() {
    // Two agent/goal pairs at opposite ends of a long corridor.
    let graph = path_graph(12);
    let agents = [0, 11];
    let goals = [1, 10];

    let allocation =
        allocate(&graph, &agents, &goals, &DispatchConfig::balanced()).expect("valid indices");
    assert_eq!(allocation.assignment.goal_for(0), Some(1));
    assert_eq!(allocation.assignment.goal_for(11), Some(10));
    assert_eq!(allocation.stats.degenerate_splits, 0);
    assert!(
        allocation.stats.max_depth >= 1,
        "the split should have recursed, stats: {:?}",
        allocation.stats
    );
}

#[test]
fn cluster_policy_matches_agents_to_goal_clumps() {
    // Goals form two clumps near the corridor ends; each agent should be
    // routed into its nearby clump and take the closest member.
    let graph = path_graph(30);
    let agents = [0, 29];
    let goals = [2, 3, 26, 27];

    let allocation =
        allocate(&graph, &agents, &goals, &DispatchConfig::clustered()).expect("valid indices");
    assert_eq!(allocation.assignment.goal_for(0), Some(2));
    assert_eq!(allocation.assignment.goal_for(29), Some(27));
    assert_eq!(allocation.stats.cluster_count_mismatches, 0);
}

#[test]
fn direct_policy_performs_exactly_one_matrix_solve() {
    let graph = path_graph(10);
    let allocation = allocate(&graph, &[0, 4, 9], &[1, 5, 8], &DispatchConfig::direct())
        .expect("valid indices");
    assert_eq!(allocation.stats.direct_solves, 1);
    assert_eq!(allocation.stats.max_depth, 0);
    assert_eq!(allocation.assignment.len(), 3);
}

#[test]
fn seeded_runs_are_reproducible() {
    let graph = path_graph(16);
    let agents = [0, 6, 15];
    let goals = [2, 8, 13];

    for config in [DispatchConfig::balanced(), DispatchConfig::clustered()] {
        let first = compute_assignment(&graph, &agents, &goals, &config).expect("valid indices");
        let second = compute_assignment(&graph, &agents, &goals, &config).expect("valid indices");
        assert_eq!(first, second, "policy {:?}", config.policy);
    }
}

#[test]
fn distinct_seeds_still_produce_valid_matchings() {
    let graph = path_graph(16);
    let agents = [0, 6, 15];
    let goals = [2, 8, 13];

    for seed in [1u64, 7, 1234] {
        let config = DispatchConfig::builder()
            .rng_seed(seed)
            .build()
            .expect("valid config");
        let assignment =
            compute_assignment(&graph, &agents, &goals, &config).expect("valid indices");
        assert_eq!(assignment.len(), 3, "seed {seed}");

        let mut goals_used: Vec<usize> = assignment.pairs().iter().map(|p| p.goal).collect();
        goals_used.sort_unstable();
        goals_used.dedup();
        assert_eq!(goals_used.len(), 3, "seed {seed}");
    }
}
