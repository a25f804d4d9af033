mod route;
mod snapshot;
mod station;
mod tables;

pub use route::*;
pub use snapshot::*;
pub use station::*;
pub use tables::*;

use std::{collections::HashMap, io, sync::Arc};

use rayon::prelude::*;
use thiserror::Error as ThisError;
use tracing::debug;

use crate::shared::geo::{TRANSFER_SPEED, WILD_WALKING_SPEED};

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u8),
    #[error("Invalid station code: {0}")]
    InvalidStationCode(String),
    #[error("No snapshot loaded")]
    MissingSnapshot,
    #[error("Waiting-mode queries need an interval table")]
    MissingIntervals,
    #[error("Realtime queries need a departure table")]
    MissingDepartures,
}

/// One directed walking link of the transfer table.
#[derive(Debug, Clone, Copy)]
pub struct TransferEdge {
    /// Station arena index.
    pub to: u32,
    pub seconds: f64,
    pub blocks: f64,
}

/// Walking seconds and distances between nearby station pairs. Loaded from
/// a version-4 snapshot when present, otherwise computed from positions.
#[derive(Debug, Clone, Default)]
pub struct TransferTable {
    edges: HashMap<u32, Vec<TransferEdge>>,
}

impl TransferTable {
    pub fn from(&self, station: u32) -> &[TransferEdge] {
        self.edges.get(&station).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn between(&self, from: u32, to: u32) -> Option<TransferEdge> {
        self.from(from).iter().find(|edge| edge.to == to).copied()
    }

}

/// The in-memory network: a station arena plus routes referring into it by
/// index, with id and packed-code lookups on the side.
#[derive(Debug, Clone)]
pub struct Network {
    pub version: u8,
    pub stations: Box<[Station]>,
    pub routes: Box<[Route]>,
    pub transfers: TransferTable,
    station_lookup: HashMap<Arc<str>, u32>,
    num_lookup: HashMap<u32, u32>,
}

impl Network {
    /// Builds the arena form of a snapshot. Placeholder routes, routes with
    /// fewer than two stops and routes whose duration list cannot be
    /// reconciled are dropped here; hop durations come out in seconds
    /// whatever the snapshot version.
    pub fn from_snapshot(snapshot: &Snapshot, max_wild_blocks: f64) -> Result<Self, Error> {
        let mut stations: Vec<Station> = Vec::with_capacity(snapshot.stations.len());
        let mut station_lookup: HashMap<Arc<str>, u32> = HashMap::new();
        let mut num_lookup: HashMap<u32, u32> = HashMap::new();

        for (id, raw) in &snapshot.stations {
            let index = stations.len() as u32;
            let station_num = u32::from_str_radix(raw.station_num.trim(), 16)
                .map_err(|_| Error::InvalidStationCode(raw.station_num.clone()))?;
            let id: Arc<str> = id.as_str().into();
            station_lookup.insert(id.clone(), index);
            num_lookup.insert(station_num, index);
            stations.push(Station {
                id,
                name: raw.name.as_str().into(),
                position: raw.position(),
                connections: vec![],
                station_num,
                index,
            });
        }

        // Second pass now that every id has an index; unknown peers are
        // silently dropped like the upstream data does.
        for (id, raw) in &snapshot.stations {
            let index = station_lookup[id.as_str()];
            let connections: Vec<u32> = raw
                .connections
                .iter()
                .filter_map(|peer| station_lookup.get(peer.as_str()).copied())
                .collect();
            stations[index as usize].connections = connections;
        }

        let mut routes: Vec<Route> = Vec::with_capacity(snapshot.routes.len());
        for raw in &snapshot.routes {
            if is_placeholder(&raw.name) {
                continue;
            }
            if raw.stations.len() < 2 {
                continue;
            }
            let hops = raw.stations.len() - 1;
            let mut durations = raw.durations.clone();
            if durations.len() > hops {
                durations.truncate(hops);
            }
            if durations.len() < hops {
                debug!(route = %raw.name, "dropping route with short duration list");
                continue;
            }
            if snapshot.version == 3 {
                for duration in &mut durations {
                    *duration /= SERVER_TICK;
                }
            }

            let stops: Option<Vec<RouteStop>> = raw
                .stations
                .iter()
                .map(|stop| {
                    station_lookup.get(stop.id.as_str()).map(|&station| RouteStop {
                        station,
                        platform: stop.platform.as_str().into(),
                        dwell: stop.dwell_time / 1000.0,
                    })
                })
                .collect();
            let Some(stops) = stops else {
                debug!(route = %raw.name, "dropping route visiting unknown stations");
                continue;
            };

            routes.push(Route {
                id: raw.id.as_str().into(),
                name: raw.name.as_str().into(),
                number: raw.number.as_str().into(),
                color: raw.color,
                circular: raw.circular,
                kind: raw.kind,
                stops,
                durations,
                index: routes.len() as u32,
            });
        }

        let transfers = if snapshot.transfer_time.is_empty() {
            compute_transfers(&stations, max_wild_blocks)
        } else {
            load_transfers(snapshot, &station_lookup)
        };

        Ok(Self {
            version: snapshot.version,
            stations: stations.into(),
            routes: routes.into(),
            transfers,
            station_lookup,
            num_lookup,
        })
    }

    pub fn station_by_id(&self, id: &str) -> Option<&Station> {
        let index = self.station_lookup.get(id)?;
        Some(&self.stations[*index as usize])
    }

    pub fn station_index(&self, id: &str) -> Option<u32> {
        self.station_lookup.get(id).copied()
    }

    pub fn station_by_num(&self, num: u32) -> Option<&Station> {
        let index = self.num_lookup.get(&num)?;
        Some(&self.stations[*index as usize])
    }

    pub fn route_by_id(&self, id: &str) -> Option<&Route> {
        self.routes.iter().find(|route| &*route.id == id)
    }

    pub fn route_by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| &*route.name == name)
    }
}

fn load_transfers(snapshot: &Snapshot, lookup: &HashMap<Arc<str>, u32>) -> TransferTable {
    let mut table = TransferTable::default();
    for (from_id, peers) in &snapshot.transfer_time {
        let Some(&from) = lookup.get(from_id.as_str()) else {
            continue;
        };
        let mut edges: Vec<TransferEdge> = peers
            .iter()
            .filter_map(|(to_id, &seconds)| {
                let &to = lookup.get(to_id.as_str())?;
                let blocks = snapshot
                    .transfer_dist
                    .get(from_id)
                    .and_then(|row| row.get(to_id))
                    .copied()
                    .unwrap_or_default();
                Some(TransferEdge { to, seconds, blocks })
            })
            .collect();
        edges.sort_by_key(|edge| edge.to);
        table.edges.insert(from, edges);
    }
    table
}

/// Pairwise walking precompute: declared interchange pairs walk at transfer
/// speed with no distance cap, any other pair walks cross-country and is
/// kept only within `max_wild_blocks` on both axes and in the plane.
fn compute_transfers(stations: &[Station], max_wild_blocks: f64) -> TransferTable {
    let rows: Vec<(u32, Vec<TransferEdge>)> = stations
        .par_iter()
        .filter_map(|from| {
            let from_pos = from.position?;
            let mut edges: Vec<TransferEdge> = Vec::new();
            for to in stations {
                if to.index == from.index {
                    continue;
                }
                let Some(to_pos) = to.position else {
                    continue;
                };
                let declared = from.connections.contains(&to.index)
                    || to.connections.contains(&from.index);
                let blocks = from_pos.distance(&to_pos);
                let speed = if declared {
                    TRANSFER_SPEED
                } else {
                    if blocks > max_wild_blocks
                        || (from_pos.x - to_pos.x).abs() > max_wild_blocks
                        || (from_pos.z - to_pos.z).abs() > max_wild_blocks
                    {
                        continue;
                    }
                    WILD_WALKING_SPEED
                };
                edges.push(TransferEdge {
                    to: to.index,
                    seconds: blocks / speed,
                    blocks,
                });
            }
            Some((from.index, edges))
        })
        .collect();

    let mut table = TransferTable::default();
    for (from, edges) in rows {
        table.edges.insert(from, edges);
    }
    table
}
