use sketcher::{Edge, SketchConfig, SketchEngine};

fn engine(width: usize, depth: usize, limit: usize) -> SketchEngine {
    SketchEngine::new(SketchConfig::new(width, depth, limit).unwrap()).unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn concrete_scenario() {
    let e = engine(100, 3, 2);
    e.update(&[
        Edge::new("10", "20", 1.0),
        Edge::new("10", "20", 1.0),
        Edge::new("10", "20", 1.0),
        Edge::new("30", "40", 1.0),
    ]);
    assert!(approx(e.edge_query("10", "20"), 3.0));
    assert!(approx(e.edge_query("30", "40"), 1.0));
    assert_eq!(e.edge_query("1", "2"), 0.0);
    assert!(e.reachability_query("10", "20"));
    assert!(!e.reachability_query("1", "2"));
}

#[test]
fn single_observation_is_exact() {
    let e = engine(1000, 4, 3);
    e.update(&[Edge::new("alpha", "beta", 7.25)]);
    assert_eq!(e.edge_query("alpha", "beta"), 7.25);
    // direction is part of the identity
    assert_eq!(e.edge_query("beta", "alpha"), 0.0);
}

#[test]
fn duplicate_observation_doubles() {
    let e = engine(1000, 3, 2);
    e.update(&[Edge::new("a", "b", 1.5)]);
    e.update(&[Edge::new("a", "b", 1.5)]);
    assert_eq!(e.edge_query("a", "b"), 3.0);
}

#[test]
fn unseen_pairs_are_zero() {
    let e = engine(50, 3, 2);
    e.update(&[Edge::new("a", "b", 1.0), Edge::new("c", "d", 1.0)]);
    // both nodes seen, edge never inserted
    assert_eq!(e.edge_query("a", "d"), 0.0);
    assert_eq!(e.edge_query("x", "y"), 0.0);
}

#[test]
fn estimates_never_negative_under_pressure() {
    // tiny grid: heavy collisions and saturation
    let e = engine(3, 2, 1);
    let edges: Vec<Edge> = (0..400)
        .map(|i| Edge::new((i % 31).to_string(), (i % 37).to_string(), (i % 5) as f64))
        .collect();
    e.update(&edges);
    for s in 0..31 {
        for d in 0..37 {
            let w = e.edge_query(&s.to_string(), &d.to_string());
            assert!(w >= 0.0 && w.is_finite());
        }
    }
    let stats = e.stats();
    assert!(stats.total_edges <= stats.total_cells);
    assert!(stats.occupancy_rate > 0.0 && stats.occupancy_rate <= 1.0);
}

#[test]
fn reachability_is_symmetric_and_transitive() {
    let e = engine(64, 3, 2);
    e.update(&[Edge::new("a", "b", 1.0), Edge::new("b", "c", 1.0)]);
    assert!(e.reachability_query("a", "b"));
    assert!(e.reachability_query("b", "a"));
    assert!(e.reachability_query("a", "c"));
    assert!(e.reachability_query("c", "a"));
    assert!(e.reachability_query("a", "a"));
    assert!(!e.reachability_query("a", "zzz"));
    // a query must not register the node
    assert_eq!(e.stats().tracked_nodes, 3);

    e.update(&[Edge::new("x", "y", 1.0)]);
    assert!(!e.reachability_query("a", "y"));
    assert_eq!(e.stats().components, 2);
    e.update(&[Edge::new("y", "c", 1.0)]);
    assert!(e.reachability_query("x", "a"));
    assert_eq!(e.stats().components, 1);
}

#[test]
fn reachability_survives_saturation() {
    // a 1x1 grid keeps a single edge, connectivity keeps everything
    let e = engine(1, 1, 1);
    let chain: Vec<Edge> = (0..100)
        .map(|i| Edge::new(i.to_string(), (i + 1).to_string(), 1.0))
        .collect();
    e.update(&chain);
    assert!(e.reachability_query("0", "100"));
    assert_eq!(e.stats().total_edges, 1);
}

#[test]
fn occupancy_is_monotonic() {
    let e = engine(20, 3, 2);
    let mut last = 0usize;
    for b in 0..30 {
        let batch: Vec<Edge> = (0..10)
            .map(|i| Edge::new(format!("s{b}-{i}"), format!("d{}", i * b), 1.0))
            .collect();
        e.update(&batch);
        let occupied = e.stats().occupied_cells;
        assert!(occupied >= last);
        last = occupied;
    }
    assert!(last > 0);
}

#[test]
fn stats_shape_and_totals() {
    let e = engine(10, 4, 2);
    let empty = e.stats();
    assert_eq!(empty.hash_functions, 4);
    assert_eq!(empty.total_cells, 400);
    assert_eq!(empty.occupied_cells, 0);
    assert_eq!(empty.occupancy_rate, 0.0);

    e.update(&[Edge::new("p", "q", 2.0)]);
    let s = e.stats();
    // one edge recorded once per round
    assert_eq!(s.total_edges, 4);
    assert_eq!(s.occupied_cells, 4);
    assert_eq!(s.total_weight, 8.0);
    assert_eq!(s.occupancy_rate, 4.0 / 400.0);
    assert_eq!(s.observed_edges, 1);
}

#[test]
fn bad_edges_do_not_abort_batch() {
    let e = engine(100, 3, 2);
    let out = e.update(&[
        Edge::new("a", "b", 1.0),
        Edge::new("a", "b", -3.0),
        Edge::new("", "b", 1.0),
        Edge::new("b", "c", 2.0),
    ]);
    assert_eq!(out.applied, 2);
    assert_eq!(out.rejected, 2);
    assert_eq!(e.edge_query("a", "b"), 1.0);
    assert_eq!(e.edge_query("b", "c"), 2.0);
    assert_eq!(e.stats().rejected_edges, 2);
}

#[test]
fn repeated_reads_are_identical() {
    let e = engine(30, 3, 2);
    let edges: Vec<Edge> = (0..200)
        .map(|i| Edge::new((i % 13).to_string(), (i % 7).to_string(), 1.0))
        .collect();
    e.update(&edges);
    let s1 = e.stats();
    let w1 = e.edge_query("3", "3");
    let r1 = e.reachability_query("1", "6");
    assert_eq!(e.stats(), s1);
    assert_eq!(e.edge_query("3", "3"), w1);
    assert_eq!(e.reachability_query("1", "6"), r1);
}

#[test]
fn zero_config_is_rejected() {
    assert!(SketchConfig::new(0, 3, 2).is_err());
    assert!(SketchConfig::new(10, 0, 2).is_err());
    assert!(SketchConfig::new(10, 3, 0).is_err());
}
