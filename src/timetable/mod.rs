mod csa;

pub use csa::*;

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    config::Config,
    graph::{transfer_walk_label, wild_walk_label},
    model::{Departures, Network, TransportType},
    resolve::Resolver,
    shared::time::SECONDS_PER_DAY,
};

/// What an elementary connection is travelled as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionKind {
    Ride {
        /// Route id, not name; realtime legs resolve it back.
        route: Arc<str>,
        /// Station id of the route's final stop.
        terminus: Arc<str>,
        /// Platform label at the departure station.
        platform: Arc<str>,
    },
    Walk {
        label: Arc<str>,
    },
}

impl ConnectionKind {
    pub fn is_ride(&self) -> bool {
        matches!(self, ConnectionKind::Ride { .. })
    }
}

/// One template connection of a notional dispatch at time zero; offsets are
/// zero or negative and get shifted per real departure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateEntry {
    /// Packed station codes.
    pub dep: u32,
    pub arr: u32,
    pub dep_offset: i64,
    pub arr_offset: i64,
    pub kind: ConnectionKind,
}

/// Per-route connection templates, the unit the timetable cache stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timetable {
    pub templates: Vec<(Arc<str>, Vec<TemplateEntry>)>,
}

/// One concrete scheduled hop after expansion. Times are seconds of day
/// but exceed one day for trips straddling midnight.
#[derive(Debug, Clone)]
pub struct Connection {
    pub dep: u32,
    pub arr: u32,
    pub dep_time: u32,
    pub arr_time: u32,
    pub kind: ConnectionKind,
    pub trip: Option<u32>,
}

/// An expanded, scan-ready connection list plus the per-trip departure maps
/// the post-processor coalesces with.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub connections: Vec<Connection>,
    /// `trips[trip_no][station_num] -> dep_time` at that station.
    pub trips: Vec<HashMap<u32, u32>>,
}

fn resolve_avoided(network: &Network, config: &Config, resolver: &Resolver) -> HashSet<u32> {
    config
        .avoid_stations
        .iter()
        .filter_map(|name| resolver.resolve(network, name))
        .collect()
}

/// Builds the per-route templates: ride entries walked backwards from the
/// terminus, each followed by the post-arrival walks its arrival station
/// offers.
pub fn build_templates(
    network: &Network,
    departures: &Departures,
    config: &Config,
    resolver: &Resolver,
) -> Timetable {
    let avoid = resolve_avoided(network, config, resolver);
    let ignored = config.effective_ignored();
    let only = config.effective_only();

    let mut templates: Vec<(Arc<str>, Vec<TemplateEntry>)> = Vec::new();
    for route in network.routes.iter() {
        if departures.get(&route.id).is_none() {
            continue;
        }
        if route.is_excluded(&ignored, &only) {
            continue;
        }
        if !config.calculate_high_speed && route.kind == TransportType::TrainHighSpeed {
            continue;
        }
        if !config.calculate_boat && route.kind.is_boat() {
            continue;
        }
        if config.only_lrt && route.kind != TransportType::TrainLightRail {
            continue;
        }

        let stops = &route.stops;
        let n = stops.len();
        let terminus_id = network.stations[route.terminus() as usize].id.clone();
        let mut entries: Vec<TemplateEntry> = Vec::new();
        let mut cur: i64 = -(stops[n - 1].dwell.round() as i64);

        for i in (1..n).rev() {
            let dep_station = &network.stations[stops[i - 1].station as usize];
            let arr_station = &network.stations[stops[i].station as usize];
            let duration = route.durations[i - 1].round() as i64;
            let arr_offset = cur;
            let dep_offset = cur - duration;
            cur -= duration;
            cur -= stops[i - 1].dwell.round() as i64;

            if dep_station.station_num == arr_station.station_num {
                continue;
            }
            if avoid.contains(&arr_station.index) {
                continue;
            }
            if !avoid.contains(&dep_station.index) {
                entries.push(TemplateEntry {
                    dep: dep_station.station_num,
                    arr: arr_station.station_num,
                    dep_offset,
                    arr_offset,
                    kind: ConnectionKind::Ride {
                        route: route.id.clone(),
                        terminus: terminus_id.clone(),
                        platform: stops[i - 1].platform.clone(),
                    },
                });
            }

            walk_entries(
                network,
                config,
                &avoid,
                arr_station.index,
                arr_offset,
                &mut entries,
            );
        }

        templates.push((route.id.clone(), entries));
    }

    info!(routes = templates.len(), "built timetable templates");
    Timetable { templates }
}

/// Post-arrival walks from `from`: every declared interchange peer (plus
/// operator-supplied extras), and with wild walking on, every station the
/// transfer table reaches.
fn walk_entries(
    network: &Network,
    config: &Config,
    avoid: &HashSet<u32>,
    from: u32,
    base: i64,
    out: &mut Vec<TemplateEntry>,
) {
    let station = &network.stations[from as usize];

    let mut peers: Vec<u32> = station.connections.clone();
    if let Some(extras) = config.transfer_addition.get(&*station.name) {
        for extra in extras {
            if let Some(peer) = network
                .stations
                .iter()
                .find(|candidate| &*candidate.name == extra)
            {
                peers.push(peer.index);
            }
        }
    }
    for peer in peers {
        if avoid.contains(&peer) {
            continue;
        }
        let Some(edge) = network.transfers.between(from, peer) else {
            continue;
        };
        let seconds = edge.seconds.round() as i64;
        out.push(TemplateEntry {
            dep: station.station_num,
            arr: network.stations[peer as usize].station_num,
            dep_offset: base,
            arr_offset: base + seconds,
            kind: ConnectionKind::Walk {
                label: transfer_walk_label(edge.blocks),
            },
        });
    }

    if config.calculate_walking_wild {
        let mut wild_peers: Vec<u32> = network.transfers.from(from).iter().map(|e| e.to).collect();
        if let Some(extras) = config.wild_addition.get(&*station.name) {
            for extra in extras {
                if let Some(peer) = network
                    .stations
                    .iter()
                    .find(|candidate| &*candidate.name == extra)
                {
                    wild_peers.push(peer.index);
                }
            }
        }
        for peer in wild_peers {
            if avoid.contains(&peer) {
                continue;
            }
            let Some(edge) = network.transfers.between(from, peer) else {
                continue;
            };
            let seconds = edge.seconds.round() as i64;
            out.push(TemplateEntry {
                dep: station.station_num,
                arr: network.stations[peer as usize].station_num,
                dep_offset: base,
                arr_offset: base + seconds,
                kind: ConnectionKind::Walk {
                    label: wild_walk_label(edge.blocks),
                },
            });
        }
    }
}

/// Expands templates against real dispatch times for one query.
///
/// Dispatches close to midnight are duplicated a day later so trips that
/// straddle it stay visible inside the horizon; entries shifted below zero
/// move forward one day. Connections departing inside the wrapped window
/// but before the query time are dropped.
pub fn expand(
    network: &Network,
    timetable: &Timetable,
    departures: &Departures,
    config: &Config,
    origin: u32,
    departure_time: u32,
) -> Expansion {
    let day = SECONDS_PER_DAY as i64;
    let departure_time = departure_time as i64;
    let max_time = departure_time + 3600 * config.max_hour as i64;

    let mut expansion = Expansion::default();

    // The query's own station offers its walks right away.
    let mut origin_walks: Vec<TemplateEntry> = Vec::new();
    walk_entries(
        network,
        config,
        &HashSet::new(),
        origin,
        departure_time,
        &mut origin_walks,
    );
    for entry in origin_walks {
        expansion.connections.push(Connection {
            dep: entry.dep,
            arr: entry.arr,
            dep_time: entry.dep_offset as u32,
            arr_time: entry.arr_offset as u32,
            kind: entry.kind,
            trip: None,
        });
    }

    for (route_id, template) in &timetable.templates {
        let Some(route_departures) = departures.get(route_id) else {
            continue;
        };
        let mut dispatches: Vec<i64> = route_departures.iter().map(|&d| d as i64).collect();
        if max_time > day {
            let wrapped: Vec<i64> = route_departures
                .iter()
                .map(|&d| d as i64)
                .filter(|&d| d <= max_time - day)
                .map(|d| d + day)
                .collect();
            dispatches.extend(wrapped);
        }

        // Template offsets run backwards from the terminus; the dispatch
        // time names the moment the trip leaves its first station.
        let anchor = template
            .iter()
            .map(|entry| entry.dep_offset)
            .min()
            .unwrap_or_default();

        for dispatch in dispatches {
            if dispatch >= max_time {
                break;
            }
            let shift = dispatch - anchor;
            let trip_no = expansion.trips.len() as u32;
            expansion.trips.push(HashMap::new());

            for entry in template {
                let mut dep_time = entry.dep_offset + shift;
                let mut arr_time = entry.arr_offset + shift;
                if dep_time < 0 {
                    dep_time += day;
                    arr_time += day;
                }
                if dep_time < 0 {
                    continue;
                }
                if max_time - day < dep_time && dep_time < departure_time {
                    continue;
                }

                let trip = if entry.kind.is_ride() {
                    expansion.trips[trip_no as usize].insert(entry.dep, dep_time as u32);
                    Some(trip_no)
                } else {
                    None
                };
                expansion.connections.push(Connection {
                    dep: entry.dep,
                    arr: entry.arr,
                    dep_time: dep_time as u32,
                    arr_time: arr_time as u32,
                    kind: entry.kind.clone(),
                    trip,
                });
            }
        }
    }

    // The scan relies on nothing but this order; the sort is stable so
    // equal departure times keep their build order.
    expansion.connections.sort_by_key(|connection| connection.dep_time);
    expansion
}
