mod common;

use std::collections::HashMap;

use petgraph::visit::EdgeRef;
use railwise::{
    Mode,
    graph::{Label, build_graph},
    resolve::Resolver,
};

fn resolver() -> Resolver {
    Resolver::new(&HashMap::new())
}

#[test]
fn waiting_edge_weighs_ride_plus_expected_wait() {
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &[]), ("b", "B", 1000.0, 0.0, &[])],
        vec![common::route("r1", "Red Line", &["a", "b"], &[60.0])],
    );
    let network = common::network(&snapshot);
    let intervals = common::intervals(&[("Red Line", 120)]);

    let build = build_graph(
        &network,
        &common::config(),
        Some(&intervals),
        &resolver(),
        Mode::Waiting,
    );
    let from = build.graph.node_index(0).unwrap();
    let to = build.graph.node_index(1).unwrap();
    let edges = build.graph.edges_between(from, to);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].weight, 120.0);
    assert_eq!(edges[0].waiting, 60.0);
}

#[test]
fn parallel_routes_combine_waits_by_lcm() {
    // lcm(200, 300) = 600; 600 / (2 * (3 + 2)) = 60.
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &[]), ("b", "B", 1000.0, 0.0, &[])],
        vec![
            common::route("r1", "R1", &["a", "b"], &[100.0]),
            common::route("r2", "R2", &["a", "b"], &[110.0]),
        ],
    );
    let network = common::network(&snapshot);
    let intervals = common::intervals(&[("R1", 200), ("R2", 300)]);

    let build = build_graph(
        &network,
        &common::config(),
        Some(&intervals),
        &resolver(),
        Mode::Waiting,
    );
    let from = build.graph.node_index(0).unwrap();
    let to = build.graph.node_index(1).unwrap();
    let edges = build.graph.edges_between(from, to);
    assert_eq!(edges.len(), 1);
    let edge = edges[0];
    assert_eq!(edge.waiting, 60.0);
    assert_eq!(edge.weight, 160.0);
    match &edge.label {
        Label::Parallel(names) => {
            assert!(names.iter().any(|n| &**n == "R1"));
            assert!(names.iter().any(|n| &**n == "R2"));
        }
        Label::Single(_) => panic!("expected a parallel label"),
    }
    assert_eq!(build.originals[&("R1".into(), 0, 1)], 100.0);
    assert_eq!(build.originals[&("R2".into(), 0, 1)], 110.0);
}

#[test]
fn rides_outside_the_prune_window_are_dropped() {
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &[]), ("b", "B", 1000.0, 0.0, &[])],
        vec![
            common::route("r1", "Fast", &["a", "b"], &[100.0]),
            common::route("r2", "Okay", &["a", "b"], &[150.0]),
            common::route("r3", "Slow", &["a", "b"], &[200.0]),
        ],
    );
    let network = common::network(&snapshot);

    let build = build_graph(&network, &common::config(), None, &resolver(), Mode::Theory);
    let from = build.graph.node_index(0).unwrap();
    let to = build.graph.node_index(1).unwrap();
    let edges = build.graph.edges_between(from, to);

    let min = edges
        .iter()
        .map(|edge| edge.weight)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(min, 100.0);
    assert_eq!(edges.len(), 2);
    for edge in edges {
        assert!(edge.weight <= min + 60.0);
    }
}

#[test]
fn interchange_edges_walk_at_transfer_speed() {
    let snapshot = common::snapshot(
        &[
            ("a", "A", 0.0, 0.0, &["b"]),
            ("b", "B", 43.17, 0.0, &[]),
            ("c", "C", 5000.0, 0.0, &[]),
        ],
        vec![common::route("r1", "Line", &["b", "c"], &[60.0])],
    );
    let network = common::network(&snapshot);

    let build = build_graph(&network, &common::config(), None, &resolver(), Mode::Theory);
    let from = build.graph.node_index(0).unwrap();
    let to = build.graph.node_index(1).unwrap();
    let edges = build.graph.edges_between(from, to);
    assert_eq!(edges.len(), 1);
    assert!((edges[0].weight - 10.0).abs() < 0.01);
    match &edges[0].label {
        Label::Single(name) => assert!(name.starts_with("出站换乘步行 Walk")),
        Label::Parallel(_) => panic!("walks are single-labelled"),
    }
}

#[test]
fn wild_walks_connect_nearby_unrailed_stations() {
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &[]), ("b", "B", 45.0, 0.0, &[])],
        vec![],
    );
    let network = common::network(&snapshot);
    let config = common::config().with_walking_wild(true);

    let build = build_graph(&network, &config, None, &resolver(), Mode::Theory);
    let from = build.graph.node_index(0).unwrap();
    let to = build.graph.node_index(1).unwrap();
    let edges = build.graph.edges_between(from, to);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].weight, 45.0 / 2.25);
}

#[test]
fn wild_walk_skipped_when_ride_clearly_faster() {
    // Walk takes 1400 / 2.25 ≈ 622 s, the ride 60 s.
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &[]), ("b", "B", 1400.0, 0.0, &[])],
        vec![common::route("r1", "Line", &["a", "b"], &[60.0])],
    );
    let network = common::network(&snapshot);
    let config = common::config().with_walking_wild(true);

    let build = build_graph(&network, &config, None, &resolver(), Mode::Theory);
    let from = build.graph.node_index(0).unwrap();
    let to = build.graph.node_index(1).unwrap();
    let edges = build.graph.edges_between(from, to);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].weight, 60.0);
}

#[test]
fn wild_walk_replaces_much_slower_ride() {
    // Walk takes 45 / 2.25 = 20 s, the ride 600 s.
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &[]), ("b", "B", 45.0, 0.0, &[])],
        vec![common::route("r1", "Line", &["a", "b"], &[600.0])],
    );
    let network = common::network(&snapshot);
    let config = common::config().with_walking_wild(true);

    let build = build_graph(&network, &config, None, &resolver(), Mode::Theory);
    let from = build.graph.node_index(0).unwrap();
    let to = build.graph.node_index(1).unwrap();
    let edges = build.graph.edges_between(from, to);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].weight, 20.0);
}

#[test]
fn avoided_stations_take_no_edges() {
    let snapshot = common::snapshot(
        &[
            ("a", "A", 0.0, 0.0, &[]),
            ("b", "B", 1000.0, 0.0, &[]),
            ("c", "C", 2000.0, 0.0, &[]),
        ],
        vec![common::route("r1", "Line", &["a", "b", "c"], &[60.0, 60.0])],
    );
    let network = common::network(&snapshot);
    let config = common::config().with_avoid_stations(vec!["B".to_string()]);

    let build = build_graph(&network, &config, None, &resolver(), Mode::Theory);
    let b = network.station_index("b").unwrap();
    for edge in build.graph.graph.edge_references() {
        assert_ne!(build.graph.station(edge.source()), b);
        assert_ne!(build.graph.station(edge.target()), b);
    }
    // The through-window contains the avoided station too.
    assert!(
        build.graph.node_index(0).is_none()
            || build
                .graph
                .edges_between(
                    build.graph.node_index(0).unwrap(),
                    build.graph.node_index(2).unwrap()
                )
                .is_empty()
    );
}

#[test]
fn ignored_lines_drop_their_routes() {
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &[]), ("b", "B", 1000.0, 0.0, &[])],
        vec![
            common::route("r1", "Red Line", &["a", "b"], &[60.0]),
            common::route("r2", "Blue Line", &["a", "b"], &[70.0]),
        ],
    );
    let network = common::network(&snapshot);
    let config = common::config().with_ignored_lines(vec!["red line".to_string()]);

    let build = build_graph(&network, &config, None, &resolver(), Mode::Theory);
    let from = build.graph.node_index(0).unwrap();
    let to = build.graph.node_index(1).unwrap();
    let edges = build.graph.edges_between(from, to);
    assert_eq!(edges.len(), 1);
    match &edges[0].label {
        Label::Single(name) => assert_eq!(&**name, "Blue Line"),
        Label::Parallel(_) => panic!("theory edges are single-labelled"),
    }
}
