use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    model::{Error, TransportType},
    shared::geo::Position,
};

/// Duration unit of version-3 snapshots, ticks per second.
pub const SERVER_TICK: f64 = 20.0;

fn default_version() -> u8 {
    4
}

/// The on-disk station-and-route snapshot in its normalised form. Version 3
/// snapshots store hop durations in game ticks, version 4 in seconds; both
/// are converted to seconds when the arena is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u8,
    pub stations: BTreeMap<String, SnapshotStation>,
    pub routes: Vec<SnapshotRoute>,
    /// Precomputed walking seconds between nearby stations, version 4 only.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub transfer_time: HashMap<String, HashMap<String, f64>>,
    /// Walking distances in blocks matching `transfer_time`.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub transfer_dist: HashMap<String, HashMap<String, f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotStation {
    pub name: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
    #[serde(default)]
    pub connections: Vec<String>,
    /// Hex code assigned at ingest.
    pub station_num: String,
}

impl SnapshotStation {
    pub fn position(&self) -> Option<Position> {
        match (self.x, self.z) {
            (Some(x), Some(z)) => Some(Position { x, z }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRoute {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub circular: super::Circular,
    #[serde(rename = "type")]
    pub kind: TransportType,
    pub stations: Vec<SnapshotStop>,
    #[serde(default)]
    pub durations: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotStop {
    pub id: String,
    /// Milliseconds.
    #[serde(rename = "dwellTime", default)]
    pub dwell_time: f64,
    /// Platform label; the upstream map reuses the `name` key for it.
    #[serde(rename = "name", default)]
    pub platform: String,
}

/// Placeholder entries drawn on the map but not operating.
pub fn is_placeholder(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("placeholder") || lower.contains("dummy")
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = fs::read(path)?;
        let snapshot: Snapshot = serde_json::from_slice(&raw)?;
        if !matches!(snapshot.version, 3 | 4) {
            return Err(Error::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    /// Serialises back to `path` through a sibling temp file and an atomic
    /// rename, so concurrent readers never observe a half-written snapshot.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(self)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Fills missing or zero hop durations from the inter-station distance
    /// and the transport type's nominal speed, in the snapshot's native
    /// unit. Non-zero recorded durations are preserved untouched. Returns
    /// the number of repaired routes.
    pub fn synthesize_durations(&mut self) -> usize {
        let mut repaired = 0;
        let positions: HashMap<&str, Position> = self
            .stations
            .iter()
            .filter_map(|(id, station)| station.position().map(|p| (id.as_str(), p)))
            .collect();

        for route in &mut self.routes {
            if is_placeholder(&route.name) || route.stations.len() < 2 {
                continue;
            }
            let hops = route.stations.len() - 1;
            if !route.durations.is_empty() && !route.durations.contains(&0.0) {
                continue;
            }

            let mut new_durations = Vec::with_capacity(hops);
            for hop in 0..hops {
                if let Some(&recorded) = route.durations.get(hop)
                    && recorded != 0.0
                {
                    new_durations.push(recorded);
                    continue;
                }

                let from = positions.get(route.stations[hop].id.as_str());
                let to = positions.get(route.stations[hop + 1].id.as_str());
                let mut synthesized = match (from, to) {
                    (Some(a), Some(b)) => a.distance(b) / route.kind.nominal_speed(),
                    _ => 0.0,
                };
                if self.version == 3 {
                    synthesized *= SERVER_TICK;
                }
                if synthesized == 0.0 {
                    synthesized = 0.01;
                }
                new_durations.push(synthesized);
            }

            if new_durations.iter().sum::<f64>() == 0.0 {
                continue;
            }

            debug!(route = %route.name, "synthesized missing hop durations");
            route.durations = new_durations;
            repaired += 1;
        }

        if repaired > 0 {
            info!(routes = repaired, "repaired routes with missing durations");
        }
        repaired
    }
}

#[cfg(test)]
fn two_stop_snapshot(durations: Vec<f64>, version: u8) -> Snapshot {
    let mut stations = BTreeMap::new();
    stations.insert(
        "a".to_string(),
        SnapshotStation {
            name: "A".to_string(),
            x: Some(0.0),
            z: Some(0.0),
            connections: vec![],
            station_num: "0".to_string(),
        },
    );
    stations.insert(
        "b".to_string(),
        SnapshotStation {
            name: "B".to_string(),
            x: Some(140.0),
            z: Some(0.0),
            connections: vec![],
            station_num: "1".to_string(),
        },
    );
    Snapshot {
        version,
        stations,
        routes: vec![SnapshotRoute {
            id: "r1".to_string(),
            name: "Test Line".to_string(),
            number: String::new(),
            color: 0,
            circular: super::Circular::None,
            kind: TransportType::TrainNormal,
            stations: vec![
                SnapshotStop {
                    id: "a".to_string(),
                    dwell_time: 0.0,
                    platform: String::new(),
                },
                SnapshotStop {
                    id: "b".to_string(),
                    dwell_time: 0.0,
                    platform: String::new(),
                },
            ],
            durations,
        }],
        transfer_time: HashMap::new(),
        transfer_dist: HashMap::new(),
    }
}

#[test]
fn synthesis_fills_zero_hops() {
    // 140 blocks at 14 blocks/s -> 10 s.
    let mut snapshot = two_stop_snapshot(vec![0.0], 4);
    assert_eq!(snapshot.synthesize_durations(), 1);
    assert_eq!(snapshot.routes[0].durations, vec![10.0]);
}

#[test]
fn synthesis_keeps_recorded_hops() {
    let mut snapshot = two_stop_snapshot(vec![42.0], 4);
    assert_eq!(snapshot.synthesize_durations(), 0);
    assert_eq!(snapshot.routes[0].durations, vec![42.0]);
}

#[test]
fn synthesis_uses_ticks_for_v3() {
    let mut snapshot = two_stop_snapshot(vec![0.0], 3);
    snapshot.synthesize_durations();
    assert_eq!(snapshot.routes[0].durations, vec![200.0]);
}

#[test]
fn placeholder_names_detected() {
    assert!(is_placeholder("Dummy Express"));
    assert!(is_placeholder("my PLACEHOLDER line"));
    assert!(!is_placeholder("Island Line"));
}
