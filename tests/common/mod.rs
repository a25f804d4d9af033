#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use railwise::{
    Config,
    model::{
        Circular, Network, Snapshot, SnapshotRoute, SnapshotStation, SnapshotStop, TransportType,
    },
};

/// `(id, name, x, z, declared connections)`
pub type StationSpec<'a> = (&'a str, &'a str, f64, f64, &'a [&'a str]);

pub fn snapshot(stations: &[StationSpec], routes: Vec<SnapshotRoute>) -> Snapshot {
    let mut map = BTreeMap::new();
    for (i, (id, name, x, z, connections)) in stations.iter().enumerate() {
        map.insert(
            id.to_string(),
            SnapshotStation {
                name: name.to_string(),
                x: Some(*x),
                z: Some(*z),
                connections: connections.iter().map(|c| c.to_string()).collect(),
                station_num: format!("{:x}", i),
            },
        );
    }
    Snapshot {
        version: 4,
        stations: map,
        routes,
        transfer_time: HashMap::new(),
        transfer_dist: HashMap::new(),
    }
}

pub fn route(id: &str, name: &str, stops: &[&str], durations: &[f64]) -> SnapshotRoute {
    SnapshotRoute {
        id: id.to_string(),
        name: name.to_string(),
        number: String::new(),
        color: 0xee2e24,
        circular: Circular::None,
        kind: TransportType::TrainNormal,
        stations: stops
            .iter()
            .map(|stop| SnapshotStop {
                id: stop.to_string(),
                dwell_time: 0.0,
                platform: String::new(),
            })
            .collect(),
        durations: durations.to_vec(),
    }
}

pub fn network(snapshot: &Snapshot) -> Network {
    Network::from_snapshot(snapshot, 1500.0).expect("fixture snapshot should build")
}

/// A config suitable for unit fixtures: no on-disk caching.
pub fn config() -> Config {
    Config::default().with_cache(false)
}

pub fn intervals(entries: &[(&str, u32)]) -> railwise::model::Intervals {
    entries
        .iter()
        .map(|(name, seconds)| (name.to_string(), *seconds))
        .collect()
}
