#![allow(dead_code)]

use ordered_float::OrderedFloat;
use pivot_sssp::graph::MutableGraph;
use pivot_sssp::{DirectedGraph, Dijkstra, ShortestPathAlgorithm};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub type W = OrderedFloat<f64>;
pub type TestGraph = DirectedGraph<W>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn build_graph(vertex_count: usize, edges: &[(usize, usize, f64)]) -> TestGraph {
    let weighted: Vec<(usize, usize, W)> = edges
        .iter()
        .map(|&(u, v, w)| (u, v, OrderedFloat(w)))
        .collect();
    DirectedGraph::from_edges(vertex_count, &weighted).unwrap()
}

/// Random directed graph with `edge_count` edge attempts and integer weights in `0..max_weight`
pub fn random_graph(seed: u64, vertex_count: usize, edge_count: usize, max_weight: u32) -> TestGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = DirectedGraph::with_capacity(vertex_count);
    for _ in 0..edge_count {
        let u = rng.gen_range(0..vertex_count);
        let v = rng.gen_range(0..vertex_count);
        let w = rng.gen_range(0..max_weight) as f64;
        graph.add_edge(u, v, OrderedFloat(w));
    }
    graph
}

/// Same shape as [`random_graph`] with real-valued weights in `[0, 1)`
pub fn random_real_graph(seed: u64, vertex_count: usize, edge_count: usize) -> TestGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = DirectedGraph::with_capacity(vertex_count);
    for _ in 0..edge_count {
        let u = rng.gen_range(0..vertex_count);
        let v = rng.gen_range(0..vertex_count);
        let w: f64 = rng.gen();
        graph.add_edge(u, v, OrderedFloat(w));
    }
    graph
}

pub fn reference_distances(graph: &TestGraph, source: usize) -> Vec<Option<W>> {
    Dijkstra::new()
        .compute_shortest_paths(graph, source)
        .unwrap()
        .distances
}

pub fn assert_close(actual: W, expected: W, vertex: usize) {
    assert!(
        (actual.0 - expected.0).abs() <= 1e-9,
        "vertex {}: got {}, expected {}",
        vertex,
        actual.0,
        expected.0
    );
}
