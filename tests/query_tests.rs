mod common;

use std::{collections::HashMap, fs, path::PathBuf};

use railwise::{
    Config, Mode, Pathfinder,
    model::{Departures, Snapshot},
    query::Error,
    shared::time::Time,
};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    engine: Pathfinder,
}

fn engine(
    config: Config,
    snapshot: &Snapshot,
    intervals: Option<&[(&str, u32)]>,
    departures: Option<&Departures>,
) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path: PathBuf = dir.path().join("snapshot.json");
    snapshot.save(&snapshot_path).unwrap();

    let mut engine = Pathfinder::new(config).with_snapshot(&snapshot_path).unwrap();
    if let Some(entries) = intervals {
        let table: HashMap<String, u32> = entries
            .iter()
            .map(|(name, seconds)| (name.to_string(), *seconds))
            .collect();
        let path = dir.path().join("intervals.json");
        fs::write(&path, serde_json::to_vec(&table).unwrap()).unwrap();
        engine = engine.with_intervals(&path).unwrap();
    }
    if let Some(departures) = departures {
        let path = dir.path().join("departures.json");
        fs::write(&path, serde_json::to_vec(departures).unwrap()).unwrap();
        engine = engine.with_departures(&path).unwrap();
    }
    Fixture { _dir: dir, engine }
}

#[test]
fn minimal_linear_waiting_journey() {
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &[]), ("b", "B", 1000.0, 0.0, &[])],
        vec![common::route("r1", "Red Line", &["a", "b"], &[60.0])],
    );
    let fixture = engine(
        common::config(),
        &snapshot,
        Some(&[("Red Line", 120)]),
        None,
    );

    let journey = fixture.engine.query("A", "B", Mode::Waiting).unwrap();
    assert_eq!(journey.total_seconds, 120);
    assert_eq!(journey.waiting_seconds, 60);
    assert_eq!(journey.riding_seconds, 60);
    assert_eq!(journey.legs.len(), 1);
    let leg = &journey.legs[0];
    assert_eq!(leg.from, "A");
    assert_eq!(leg.to, "B");
    assert_eq!(leg.route, "Red Line");
    assert_eq!(leg.ride_seconds, 60.0);
    assert_eq!(leg.waiting_seconds, 60.0);
    assert_eq!(leg.interval, Some(120));
}

#[test]
fn theory_prefers_fewest_nodes_among_equal_weights() {
    let snapshot = common::snapshot(
        &[
            ("a", "A", 0.0, 0.0, &[]),
            ("b", "B", 1000.0, 0.0, &[]),
            ("c", "C", 2000.0, 0.0, &[]),
        ],
        vec![common::route("r1", "Line", &["a", "b", "c"], &[60.0, 60.0])],
    );
    let fixture = engine(common::config(), &snapshot, None, None);

    let journey = fixture.engine.query("A", "C", Mode::Theory).unwrap();
    // Riding through is weight-equal to the two-hop chain but visits fewer
    // nodes, so the journey is a single through leg.
    assert_eq!(journey.total_seconds, 120);
    assert_eq!(journey.waiting_seconds, 0);
    assert_eq!(journey.legs.len(), 1);
    assert_eq!(journey.legs[0].from, "A");
    assert_eq!(journey.legs[0].to, "C");
}

#[test]
fn parallel_routes_are_reported_as_alternatives() {
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &[]), ("b", "B", 1000.0, 0.0, &[])],
        vec![
            common::route("r1", "R1", &["a", "b"], &[100.0]),
            common::route("r2", "R2", &["a", "b"], &[110.0]),
        ],
    );
    let fixture = engine(
        common::config(),
        &snapshot,
        Some(&[("R1", 200), ("R2", 300)]),
        None,
    );

    let journey = fixture.engine.query("A", "B", Mode::Waiting).unwrap();
    assert_eq!(journey.total_seconds, 160);
    assert_eq!(journey.waiting_seconds, 60);
    assert_eq!(journey.legs.len(), 2);
    assert_eq!(journey.legs[0].route, "R1");
    assert_eq!(journey.legs[0].ride_seconds, 100.0);
    assert_eq!(journey.legs[0].waiting_seconds, 60.0);
    assert_eq!(journey.legs[1].route, "R2");
    assert_eq!(journey.legs[1].ride_seconds, 110.0);
}

#[test]
fn competitive_walk_joins_the_alternatives() {
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &["b"]), ("b", "B", 21.585, 0.0, &[])],
        vec![common::route("r1", "R1", &["a", "b"], &[4.0])],
    );
    let fixture = engine(common::config(), &snapshot, Some(&[("R1", 120)]), None);

    let journey = fixture.engine.query("A", "B", Mode::Waiting).unwrap();
    assert_eq!(journey.total_seconds, 64);
    assert_eq!(journey.legs.len(), 2);
    let ride = &journey.legs[0];
    assert_eq!(ride.route, "R1");
    assert_eq!(ride.ride_seconds, 4.0);
    assert_eq!(ride.waiting_seconds, 60.0);
    let walk = &journey.legs[1];
    assert!(walk.route.starts_with("出站换乘步行 Walk"));
    assert_eq!(walk.ride_seconds.round(), 5.0);
    assert_eq!(walk.waiting_seconds, 0.0);
    assert!(walk.kind.is_none());
    assert_eq!(walk.color, "#000000");
}

#[test]
fn realtime_journey_across_midnight_coalesces_one_leg() {
    let snapshot = common::snapshot(
        &[
            ("a", "A", 0.0, 0.0, &[]),
            ("b", "B", 2000.0, 0.0, &[]),
            ("c", "C", 4000.0, 0.0, &[]),
        ],
        vec![common::route("r1", "Line", &["a", "b", "c"], &[120.0, 120.0])],
    );
    let mut departures = Departures::default();
    departures.insert("r1", vec![86_340]);
    let fixture = engine(
        common::config().with_max_hour(1),
        &snapshot,
        None,
        Some(&departures),
    );

    let journey = fixture
        .engine
        .query_at("A", "C", Time::from_seconds(86_300))
        .unwrap();
    assert_eq!(journey.legs.len(), 1);
    let leg = &journey.legs[0];
    assert_eq!(leg.from, "A");
    assert_eq!(leg.to, "C");
    assert_eq!(leg.ride_seconds, 240.0);
    assert_eq!(leg.waiting_seconds, 40.0);
    assert_eq!(journey.total_seconds, 280);
}

#[test]
fn circular_routes_signal_direction_via_the_next_station() {
    let mut loop_route = common::route("r1", "Loop", &["a", "b", "c"], &[60.0, 60.0]);
    loop_route.circular = railwise::model::Circular::Clockwise;
    let snapshot = common::snapshot(
        &[
            ("a", "A", 0.0, 0.0, &[]),
            ("b", "B", 1000.0, 0.0, &[]),
            ("c", "C", 2000.0, 0.0, &[]),
        ],
        vec![loop_route],
    );
    let fixture = engine(common::config(), &snapshot, None, None);

    let journey = fixture.engine.query("A", "B", Mode::Theory).unwrap();
    assert_eq!(journey.legs.len(), 1);
    assert_eq!(
        journey.legs[0].terminus,
        railwise::query::Terminus::CircularVia {
            kind: railwise::query::CircularKind::Clockwise,
            primary: "B".to_string(),
            alt: "B".to_string(),
        }
    );
    let (primary, alt) = journey.legs[0].terminus.render();
    assert_eq!(primary, "(顺时针) 经由B");
    assert_eq!(alt, "(Clockwise) Via B");
}

#[test]
fn unresolved_station_is_reported_as_such() {
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &[]), ("b", "B", 1000.0, 0.0, &[])],
        vec![common::route("r1", "Line", &["a", "b"], &[60.0])],
    );
    let fixture = engine(common::config(), &snapshot, None, None);

    let result = fixture.engine.query("", "B", Mode::Theory);
    assert!(matches!(result, Err(Error::StationUnresolved)));
}

#[test]
fn identical_endpoints_are_rejected() {
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &[]), ("b", "B", 1000.0, 0.0, &[])],
        vec![common::route("r1", "Line", &["a", "b"], &[60.0])],
    );
    let fixture = engine(common::config(), &snapshot, None, None);

    let result = fixture.engine.query("A", "a", Mode::Theory);
    assert!(matches!(result, Err(Error::StationUnresolved)));
}

#[test]
fn avoiding_the_cut_vertex_leaves_no_path() {
    let snapshot = common::snapshot(
        &[
            ("a", "A", 0.0, 0.0, &[]),
            ("b", "B", 1000.0, 0.0, &[]),
            ("c", "C", 2000.0, 0.0, &[]),
        ],
        vec![common::route("r1", "Line", &["a", "b", "c"], &[60.0, 60.0])],
    );
    let fixture = engine(
        common::config().with_avoid_stations(vec!["B".to_string()]),
        &snapshot,
        None,
        None,
    );

    let result = fixture.engine.query("A", "C", Mode::Theory);
    assert!(matches!(result, Err(Error::NoPath)));
}

#[test]
fn waiting_mode_without_intervals_is_a_data_error() {
    let snapshot = common::snapshot(
        &[("a", "A", 0.0, 0.0, &[]), ("b", "B", 1000.0, 0.0, &[])],
        vec![common::route("r1", "Line", &["a", "b"], &[60.0])],
    );
    let fixture = engine(common::config(), &snapshot, None, None);

    let result = fixture.engine.query("A", "B", Mode::Waiting);
    assert!(matches!(result, Err(Error::Data(_))));
}
