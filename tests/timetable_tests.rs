mod common;

use std::{collections::HashMap, time::Duration};

use railwise::{
    model::Departures,
    resolve::Resolver,
    timetable::{Connection, ConnectionKind, Csa, build_templates, expand},
};

fn resolver() -> Resolver {
    Resolver::new(&HashMap::new())
}

fn three_stop_fixture() -> (railwise::model::Snapshot, Departures) {
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
    (snapshot, departures)
}

#[test]
fn templates_walk_backwards_from_the_terminus() {
    let (snapshot, departures) = three_stop_fixture();
    let network = common::network(&snapshot);
    let timetable = build_templates(&network, &departures, &common::config(), &resolver());

    assert_eq!(timetable.templates.len(), 1);
    let (route_id, entries) = &timetable.templates[0];
    assert_eq!(&**route_id, "r1");
    // No walks configured, so exactly the two ride hops, last hop first.
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].dep, 1);
    assert_eq!(entries[0].arr, 2);
    assert_eq!(entries[0].dep_offset, -120);
    assert_eq!(entries[0].arr_offset, 0);
    assert_eq!(entries[1].dep, 0);
    assert_eq!(entries[1].arr, 1);
    assert_eq!(entries[1].dep_offset, -240);
    assert_eq!(entries[1].arr_offset, -120);
    match &entries[0].kind {
        ConnectionKind::Ride { terminus, .. } => assert_eq!(&**terminus, "c"),
        ConnectionKind::Walk { .. } => panic!("expected a ride entry"),
    }
}

#[test]
fn expansion_anchors_dispatch_at_the_first_stop() {
    let (snapshot, departures) = three_stop_fixture();
    let network = common::network(&snapshot);
    let config = common::config();
    let timetable = build_templates(&network, &departures, &config, &resolver());

    let expansion = expand(&network, &timetable, &departures, &config, 0, 86_300);
    let rides: Vec<&Connection> = expansion
        .connections
        .iter()
        .filter(|connection| connection.kind.is_ride())
        .collect();
    assert_eq!(rides.len(), 2);
    assert_eq!((rides[0].dep_time, rides[0].arr_time), (86_340, 86_460));
    assert_eq!((rides[1].dep_time, rides[1].arr_time), (86_460, 86_580));
    assert_eq!(rides[0].trip, rides[1].trip);
}

#[test]
fn expansion_is_sorted_by_departure_time() {
    let snapshot = common::snapshot(
        &[
            ("a", "A", 0.0, 0.0, &[]),
            ("b", "B", 2000.0, 0.0, &[]),
            ("c", "C", 4000.0, 0.0, &[]),
        ],
        vec![
            common::route("r1", "Line 1", &["a", "b", "c"], &[120.0, 120.0]),
            common::route("r2", "Line 2", &["c", "b", "a"], &[90.0, 90.0]),
        ],
    );
    let mut departures = Departures::default();
    departures.insert("r1", vec![600, 1200, 1800]);
    departures.insert("r2", vec![700, 1400]);
    let network = common::network(&snapshot);
    let config = common::config();
    let timetable = build_templates(&network, &departures, &config, &resolver());

    let expansion = expand(&network, &timetable, &departures, &config, 0, 500);
    assert!(!expansion.connections.is_empty());
    for pair in expansion.connections.windows(2) {
        assert!(pair[0].dep_time <= pair[1].dep_time);
    }
}

#[test]
fn dispatches_near_midnight_are_duplicated_into_the_next_day() {
    let (snapshot, _) = three_stop_fixture();
    let mut departures = Departures::default();
    departures.insert("r1", vec![100]);
    let network = common::network(&snapshot);
    let config = common::config();
    let timetable = build_templates(&network, &departures, &config, &resolver());

    // The horizon from 86 300 wraps past midnight, so the 00:01:40
    // dispatch also appears a day later, where the scan can still use it.
    let expansion = expand(&network, &timetable, &departures, &config, 0, 86_300);
    let first_departures: Vec<u32> = expansion
        .connections
        .iter()
        .filter(|connection| connection.kind.is_ride() && connection.dep == 0)
        .map(|connection| connection.dep_time)
        .collect();
    assert_eq!(first_departures, vec![100, 86_500]);
}

#[test]
fn headways_derive_from_the_low_median_of_gaps() {
    let (snapshot, _) = three_stop_fixture();
    let network = common::network(&snapshot);
    let mut departures = Departures::default();
    // Gaps are 300, 300 and the 85 800 s wrap back to the first dispatch;
    // the low median lands on 300.
    departures.insert("r1", vec![100, 400, 700]);

    let intervals = railwise::model::intervals_from_departures(&departures, &network);
    assert_eq!(intervals.get("Line"), Some(300));
}

#[test]
fn csa_finds_the_earliest_arrival_chain() {
    let connections = vec![
        ride(0, 1, 100, 200),
        ride(0, 2, 110, 400),
        ride(1, 2, 150, 250),
        ride(1, 2, 220, 300),
    ];
    let scan = Csa::new(&connections, 3, Duration::from_secs(120));
    let path = scan.compute(0, 2, 100).unwrap();
    // The 150 departure from B is missed (arrival there is 200); the best
    // chain rides A->B then the 220 departure, beating the direct 400.
    assert_eq!(path, vec![0, 3]);
    assert_eq!(connections[path[path.len() - 1]].arr_time, 300);
}

#[test]
fn csa_reports_unreachable_as_empty() {
    let connections = vec![ride(0, 1, 100, 200)];
    let scan = Csa::new(&connections, 3, Duration::from_secs(120));
    assert!(scan.compute(0, 2, 100).unwrap().is_empty());
}

#[test]
fn csa_ignores_connections_departing_before_the_query() {
    let connections = vec![ride(0, 1, 50, 90), ride(0, 1, 150, 190)];
    let scan = Csa::new(&connections, 2, Duration::from_secs(120));
    let path = scan.compute(0, 1, 100).unwrap();
    assert_eq!(path, vec![1]);
}

#[test]
fn csa_times_out_on_a_zero_budget() {
    // Self-loops never improve anything, so the scan has to grind through
    // the whole list and trips the wall-clock check instead.
    let connections: Vec<Connection> = (0..20_000u32).map(|i| ride(0, 0, i, i + 10)).collect();
    let scan = Csa::new(&connections, 2, Duration::ZERO);
    assert!(scan.compute(0, 1, 0).is_err());
}

fn ride(dep: u32, arr: u32, dep_time: u32, arr_time: u32) -> Connection {
    Connection {
        dep,
        arr,
        dep_time,
        arr_time,
        kind: ConnectionKind::Ride {
            route: "r".into(),
            terminus: "t".into(),
            platform: "".into(),
        },
        trip: None,
    }
}
