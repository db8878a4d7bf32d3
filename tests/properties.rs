mod common;

use common::{assert_close, init_logger, random_graph, random_real_graph, reference_distances, TestGraph, W};
use ordered_float::OrderedFloat;
use pivot_sssp::graph::MutableGraph;
use pivot_sssp::{
    AbortReason, BmsspSolver, Completion, DirectedGraph, Error, ParameterPolicy, Parameters,
    QueryState, Relaxation, Solution, SolverConfig,
};
use std::time::Duration;

fn solve_with(solver: &BmsspSolver<impl ParameterPolicy>, graph: &TestGraph, source: usize) -> Solution<W> {
    solver.solve(graph, source).unwrap()
}

/// Every reported distance equals the reference one
fn assert_correct_on_reached(graph: &TestGraph, source: usize, solution: &Solution<W>) {
    let reference = reference_distances(graph, source);
    for (v, reported) in solution.distances().iter().enumerate() {
        if let Some(d) = reported {
            let expected = reference[v].unwrap_or_else(|| panic!("vertex {} is not reachable", v));
            assert_close(*d, expected, v);
        }
    }
}

/// Every reported vertex other than the source has a reported predecessor
fn assert_closed_under_predecessors(source: usize, solution: &Solution<W>) {
    for (v, reported) in solution.distances().iter().enumerate() {
        if reported.is_none() || v == source {
            continue;
        }
        let pred = solution.predecessors()[v].unwrap_or_else(|| panic!("vertex {} has no predecessor", v));
        assert!(solution.distances()[pred].is_some(), "predecessor {} of {} is withheld", pred, v);
    }
}

#[test]
fn test_matches_dijkstra_on_random_graphs() {
    init_logger();
    let solver = BmsspSolver::new();
    for seed in 0..24u64 {
        let n = [8, 16, 40, 100, 200][seed as usize % 5];
        let graph = random_graph(seed, n, 4 * n, 10);
        let source = seed as usize % n;

        let solution = solve_with(&solver, &graph, source);
        let reference = reference_distances(&graph, source);

        assert_correct_on_reached(&graph, source, &solution);
        for v in 0..n {
            assert_eq!(
                solution.distances()[v].is_some(),
                reference[v].is_some(),
                "seed {}: reachability of vertex {} differs",
                seed,
                v
            );
        }
        assert_eq!(solution.diagnostics().completion, Completion::Complete);
    }
}

#[test]
fn test_correct_on_reached_for_larger_graphs() {
    init_logger();
    let solver = BmsspSolver::new();
    for seed in 100..106u64 {
        let n = 300 + 150 * (seed as usize - 100);
        let graph = random_real_graph(seed, n, 3 * n);

        let solution = solve_with(&solver, &graph, 0);

        assert_correct_on_reached(&graph, 0, &solution);
        assert_eq!(solution.distances()[0], Some(OrderedFloat(0.0)));
        let d = solution.diagnostics();
        assert_eq!(d.reachable_count + d.unreached_count, n);
        assert!(d.k >= 2);
    }
}

#[test]
fn test_zero_weight_heavy_graphs() {
    init_logger();
    let solver = BmsspSolver::new();
    for seed in 200..210u64 {
        // Weights in {0, 1}: most paths tie on distance
        let graph = random_graph(seed, 60, 240, 2);
        let solution = solve_with(&solver, &graph, 0);
        assert_correct_on_reached(&graph, 0, &solution);
        assert!(!solution.diagnostics().iteration_cap_hit);
    }
}

#[test]
fn test_complete_zero_weight_digraph_terminates() {
    init_logger();
    let n = 30;
    let mut graph = DirectedGraph::with_capacity(n);
    for u in 0..n {
        for v in 0..n {
            graph.add_edge(u, v, OrderedFloat(0.0));
        }
    }

    let solution = solve_with(&BmsspSolver::new(), &graph, 7);

    assert!(solution.distances().iter().all(|d| *d == Some(OrderedFloat(0.0))));
    for (v, pred) in solution.predecessors().iter().enumerate() {
        let expected = if v == 7 { None } else { Some(7) };
        assert_eq!(*pred, expected);
    }
}

#[test]
fn test_deterministic_results() {
    init_logger();
    let graph = random_graph(42, 150, 600, 5);
    let solver = BmsspSolver::new();

    let first = solve_with(&solver, &graph, 3);
    let second = solve_with(&solver, &graph, 3);

    assert_eq!(first.distances(), second.distances());
    assert_eq!(first.predecessors(), second.predecessors());
    assert_eq!(first.diagnostics().iterations, second.diagnostics().iterations);
    assert_eq!(first.diagnostics().frames, second.diagnostics().frames);
}

#[test]
fn test_terminates_under_tight_limits() {
    init_logger();
    let config = SolverConfig::new()
        .with_k(3)
        .with_t(1)
        .with_levels(1)
        .with_stall_threshold(1)
        .with_iteration_cap(1, 1);
    let solver = BmsspSolver::with_config(config);

    for seed in 300..305u64 {
        let graph = random_graph(seed, 80, 320, 4);
        let solution = solve_with(&solver, &graph, 0);
        assert_correct_on_reached(&graph, 0, &solution);
        let d = solution.diagnostics();
        assert_eq!((d.k, d.t, d.levels), (3, 1, 1));
        assert!(d.iterations <= 80);
    }
}

#[test]
fn test_iteration_budget_and_time_limit() {
    init_logger();
    let mut graph = random_graph(7, 120, 480, 10);
    for v in 1..12 {
        graph.add_edge(0, v, OrderedFloat(v as f64));
    }

    let budget = BmsspSolver::with_config(SolverConfig::new().with_max_iterations(4));
    let solution = solve_with(&budget, &graph, 0);
    assert_eq!(solution.diagnostics().abort, Some(AbortReason::IterationBudget));
    assert_eq!(solution.diagnostics().iterations, 4);
    assert!(!solution.diagnostics().is_complete());
    assert!(solution.result().reachable_count() > 1);
    assert_correct_on_reached(&graph, 0, &solution);
    assert_closed_under_predecessors(0, &solution);

    let timed = BmsspSolver::with_config(SolverConfig::new().with_time_limit(Duration::ZERO));
    let solution = solve_with(&timed, &graph, 0);
    assert_eq!(solution.diagnostics().abort, Some(AbortReason::TimeLimit));
    assert_eq!(solution.diagnostics().completion, Completion::Incomplete);
    assert_correct_on_reached(&graph, 0, &solution);
}

#[test]
fn test_budget_abort_keeps_settled_vertices() {
    init_logger();
    let graph = random_real_graph(11, 20_000, 80_000);
    let reachable = reference_distances(&graph, 0).iter().filter(|d| d.is_some()).count();

    for budget in [10u64, 100] {
        let solver = BmsspSolver::with_config(SolverConfig::new().with_max_iterations(budget));
        let solution = solve_with(&solver, &graph, 0);
        let d = solution.diagnostics();

        assert_eq!(d.abort, Some(AbortReason::IterationBudget));
        assert_eq!(d.completion, Completion::Incomplete);
        assert!(d.reachable_count > 1, "budget {}: only the source reported", budget);
        assert!(d.reachable_count < reachable);
        assert_correct_on_reached(&graph, 0, &solution);
        assert_closed_under_predecessors(0, &solution);
    }
}

#[test]
fn test_level_budget_exit_keeps_settled_vertices() {
    init_logger();
    let config = SolverConfig::new().with_k(5).with_t(1).with_levels(1);
    let solver = BmsspSolver::with_config(config);

    for seed in 40..46u64 {
        let mut graph = random_graph(seed, 60, 240, 10);
        for v in 1..6 {
            graph.add_edge(0, v, OrderedFloat(v as f64));
        }
        let solution = solve_with(&solver, &graph, 0);

        assert!(solution.result().reachable_count() > 1, "seed {}", seed);
        assert_correct_on_reached(&graph, 0, &solution);
        assert_closed_under_predecessors(0, &solution);
    }
}

#[test]
fn test_iteration_cap_reports_incomplete_result() {
    init_logger();
    let solver = BmsspSolver::with_config(SolverConfig::new().with_iteration_cap(0, 1));

    for seed in 60..64u64 {
        let mut graph = random_graph(seed, 120, 480, 10);
        for v in 1..12 {
            graph.add_edge(0, v, OrderedFloat(v as f64));
        }
        let solution = solve_with(&solver, &graph, 0);
        let d = solution.diagnostics();

        assert!(d.iteration_cap_hit, "seed {}", seed);
        assert!(!d.stall_detected);
        assert_eq!(d.abort, None);
        assert_eq!(d.completion, Completion::Incomplete);
        assert!(d.reachable_count > 1);
        assert_correct_on_reached(&graph, 0, &solution);
        assert_closed_under_predecessors(0, &solution);
    }
}

#[test]
fn test_relaxation_outcomes_and_monotone_labels() {
    let mut state: QueryState<W> = QueryState::new(3, 0);

    assert_eq!(state.relax(0, 1, OrderedFloat(4.0)), Relaxation::Improved);
    assert_eq!(state.relax(0, 1, OrderedFloat(4.0)), Relaxation::Tight);
    assert_eq!(state.relax(0, 1, OrderedFloat(5.0)), Relaxation::Rejected);
    assert_eq!(state.relax(2, 1, OrderedFloat(0.0)), Relaxation::Rejected);

    assert_eq!(state.relax(0, 2, OrderedFloat(1.0)), Relaxation::Improved);
    assert_eq!(state.relax(2, 1, OrderedFloat(3.0)), Relaxation::Rejected);
    assert_eq!(state.distance(1), OrderedFloat(4.0));
    // Equal distance over more edges does not replace the label
    assert_eq!(state.predecessor(1), Some(0));
    assert_eq!(state.path_length(1), 1);

    assert_eq!(state.relax(2, 1, OrderedFloat(2.0)), Relaxation::Improved);
    assert_eq!(state.distance(1), OrderedFloat(3.0));
    assert_eq!(state.predecessor(1), Some(2));

    let bound = state.key(1);
    assert_eq!(state.relax_below(0, 1, OrderedFloat(0.5), &bound), Relaxation::Improved);
    assert_eq!(
        state.relax_below(2, 1, OrderedFloat(0.0), &state.key(2)),
        Relaxation::Rejected
    );
}

#[derive(Debug)]
struct FixedPolicy;

impl ParameterPolicy for FixedPolicy {
    fn parameters(&self, _vertex_count: usize) -> Parameters {
        Parameters::new(2, 2, 4)
    }
}

#[test]
fn test_custom_parameter_policy() {
    let solver = BmsspSolver::with_policy(SolverConfig::new().with_t(1), FixedPolicy);
    assert_eq!(solver.parameters(10), Parameters::new(2, 1, 4));

    let graph = random_graph(5, 50, 200, 6);
    let solution = solve_with(&solver, &graph, 0);
    assert_correct_on_reached(&graph, 0, &solution);
    assert_eq!(solution.diagnostics().levels, 4);
}

#[test]
fn test_parameters_for_vertex_count() {
    assert_eq!(Parameters::for_vertex_count(1), Parameters::new(1, 1, 1));
    assert_eq!(Parameters::for_vertex_count(4), Parameters::new(1, 1, 2));
    assert_eq!(Parameters::for_vertex_count(256), Parameters::new(2, 4, 2));
    assert_eq!(Parameters::for_vertex_count(1_000_000), Parameters::new(2, 7, 3));

    let p = Parameters::new(2, 7, 3);
    assert_eq!(p.pull_size(1), 1);
    assert_eq!(p.pull_size(3), 1 << 14);
    assert_eq!(p.level_budget(3), 2 << 21);
    assert_eq!(Parameters::new(1, 64, 2).pull_size(5), usize::MAX);
    assert_eq!(Parameters::new(0, 0, 0), Parameters::new(1, 1, 0));
}

#[test]
fn test_config_from_json() {
    let config = SolverConfig::from_json(r#"{ "k": 2, "stall_threshold": 8, "time_limit_ms": 250 }"#).unwrap();
    assert_eq!(config.k, Some(2));
    assert_eq!(config.t, None);
    assert_eq!(config.stall_threshold, 8);
    assert_eq!(config.min_iteration_cap, 1000);
    assert_eq!(config.time_limit(), Some(Duration::from_millis(250)));

    let json = config.to_json().unwrap();
    assert_eq!(SolverConfig::from_json(&json).unwrap(), config);
    assert_eq!(SolverConfig::from_json("{}").unwrap(), SolverConfig::default());
}

#[test]
fn test_config_rejects_bad_input() {
    assert!(matches!(
        SolverConfig::from_json(r#"{ "pivots": 3 }"#),
        Err(Error::ConfigParse(_))
    ));
    assert!(matches!(
        SolverConfig::from_json(r#"{ "k": 0 }"#),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        SolverConfig::new().with_stall_threshold(0).validate(),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        SolverConfig::new().with_iteration_cap(0, 0).validate(),
        Err(Error::Config(_))
    ));
    assert!(SolverConfig::new().with_iteration_cap(0, 1).validate().is_ok());
    assert!(matches!(
        SolverConfig::from_json_file("/nonexistent/pivot_sssp.json"),
        Err(Error::Io(_))
    ));

    // An invalid configuration surfaces from solve
    let graph = random_graph(1, 10, 20, 3);
    let solver = BmsspSolver::with_config(SolverConfig::new().with_t(0));
    assert!(matches!(solver.solve::<W, _>(&graph, 0), Err(Error::Config(_))));
}

#[test]
fn test_config_from_json_file() {
    let path = std::env::temp_dir().join(format!("pivot_sssp_config_{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "max_iterations": 64, "levels": 2 }"#).unwrap();

    let config = SolverConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.max_iterations, Some(64));
    assert_eq!(config.levels, Some(2));
}
