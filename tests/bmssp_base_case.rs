use ordered_float::OrderedFloat;
use pivot_sssp::algorithm::base_case::base_case;
use pivot_sssp::algorithm::bmssp::{ExecutionTracker, Limits, BMSSP};
use pivot_sssp::graph::{DirectedGraph, Graph, MutableGraph};
use pivot_sssp::{Key, Label, Parameters, QueryState};

type W = OrderedFloat<f64>;

fn diamond_path_graph() -> DirectedGraph<W> {
    let mut g: DirectedGraph<W> = DirectedGraph::new();
    for _ in 0..5 {
        g.add_vertex();
    }
    g.add_edge(0, 1, OrderedFloat(1.0));
    g.add_edge(1, 2, OrderedFloat(1.0));
    g.add_edge(0, 2, OrderedFloat(3.0));
    g.add_edge(2, 3, OrderedFloat(1.0));
    g.add_edge(1, 3, OrderedFloat(4.0));
    g.add_edge(3, 4, OrderedFloat(1.0));
    g.add_edge(0, 4, OrderedFloat(10.0));
    g
}

#[test]
fn test_bmssp_base_case() {
    let g = diamond_path_graph();
    let n = g.vertex_count();
    let mut state = QueryState::new(n, 0);
    let mut tracker = ExecutionTracker::default();

    let bmssp = BMSSP::<W, DirectedGraph<W>>::with_params(Parameters::new(2, 1, 1), Limits::default());
    let result = bmssp
        .execute(&g, 0, Key::unbounded(), &[0], &mut state, &mut tracker)
        .unwrap();

    assert_eq!(result.new_bound.distance(), OrderedFloat(2.0));
    assert_eq!(result.new_bound.vertex, 2);
    assert_eq!(result.vertices.len(), 2);
    assert!(result.vertices.contains(&0));
    assert!(result.vertices.contains(&1));
    assert_eq!(tracker.base_cases(), 1);
}

#[test]
fn test_base_case_fewer_than_k_keeps_bound() {
    let mut g: DirectedGraph<W> = DirectedGraph::with_capacity(3);
    g.add_edge(0, 1, OrderedFloat(2.0));
    let mut state = QueryState::new(3, 0);

    let result = base_case(&g, Key::unbounded(), 0, 3, &mut state);

    assert!(result.new_bound.is_unbounded());
    assert_eq!(result.vertices, vec![0, 1]);
    assert_eq!(state.distance(1), OrderedFloat(2.0));
    assert!(!state.is_reached(2));
}

#[test]
fn test_base_case_never_crosses_bound() {
    let g = diamond_path_graph();
    let mut state = QueryState::new(5, 0);
    // Key of vertex 2 on its shortest path 0 -> 1 -> 2
    let bound = Key::new(
        2,
        Label {
            dist: OrderedFloat(2.0),
            hops: 2,
            pred: Some(1),
        },
    );

    let result = base_case(&g, bound, 0, 10, &mut state);

    assert_eq!(result.new_bound, bound);
    assert_eq!(result.vertices, vec![0, 1]);
    // Candidates at or above the bound are not recorded
    assert!(!state.is_reached(2));
    assert!(!state.is_reached(4));
}

#[test]
fn test_base_case_source_outside_bound() {
    let g = diamond_path_graph();
    let mut state = QueryState::new(5, 0);
    let bound = state.key(0);

    let result = base_case(&g, bound, 0, 2, &mut state);

    assert!(result.vertices.is_empty());
    assert_eq!(result.new_bound, bound);
}

#[test]
fn test_base_case_settles_in_tie_break_order() {
    // Two zero-weight routes to vertex 3; the one through the lower predecessor wins
    let mut g: DirectedGraph<W> = DirectedGraph::with_capacity(4);
    g.add_edge(0, 2, OrderedFloat(0.0));
    g.add_edge(0, 1, OrderedFloat(0.0));
    g.add_edge(2, 3, OrderedFloat(0.0));
    g.add_edge(1, 3, OrderedFloat(0.0));
    let mut state = QueryState::new(4, 0);

    let result = base_case(&g, Key::unbounded(), 0, 3, &mut state);

    assert_eq!(result.vertices, vec![0, 1, 2]);
    assert_eq!(result.new_bound, state.key(3));
    assert_eq!(state.predecessor(3), Some(1));
    assert_eq!(state.path_length(3), 2);
}
