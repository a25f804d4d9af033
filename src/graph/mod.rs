mod dijkstra;
mod edge;

pub use dijkstra::*;
pub use edge::*;

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::Config,
    model::{Intervals, Network, TransportType},
    query::Mode,
    resolve::Resolver,
    shared::geo::{TRANSFER_SPEED, WILD_WALKING_SPEED},
};

/// Parallel services with ride times within this many seconds of the best
/// one stay on the graph; anything slower is pruned.
pub const PRUNE_WINDOW: f64 = 60.0;

/// Pure ride time per admitted `(route, from, to)` record, consulted by the
/// post-processor to recover each alternative's own duration out of a
/// combined parallel edge.
pub type OriginalDurations = HashMap<(Arc<str>, u32, u32), f64>;

/// The weighted ride multigraph over station arena indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitGraph {
    pub graph: DiGraph<u32, RideEdge>,
    node_of: HashMap<u32, u32>,
}

impl Default for TransitGraph {
    fn default() -> Self {
        Self {
            graph: DiGraph::new(),
            node_of: HashMap::new(),
        }
    }
}

impl TransitGraph {
    fn node(&mut self, station: u32) -> NodeIndex {
        if let Some(&node) = self.node_of.get(&station) {
            return NodeIndex::new(node as usize);
        }
        let node = self.graph.add_node(station);
        self.node_of.insert(station, node.index() as u32);
        node
    }

    pub fn node_index(&self, station: u32) -> Option<NodeIndex> {
        self.node_of
            .get(&station)
            .map(|&node| NodeIndex::new(node as usize))
    }

    pub fn station(&self, node: NodeIndex) -> u32 {
        self.graph[node]
    }

    pub fn edges_between(&self, from: NodeIndex, to: NodeIndex) -> Vec<&RideEdge> {
        self.graph
            .edges_connecting(from, to)
            .map(|edge| edge.weight())
            .collect()
    }

    fn min_weight_between(&self, from: NodeIndex, to: NodeIndex) -> Option<f64> {
        self.graph
            .edges_connecting(from, to)
            .map(|edge| edge.weight().weight)
            .min_by(|a, b| a.total_cmp(b))
    }

    fn remove_all_between(&mut self, from: NodeIndex, to: NodeIndex) {
        while let Some(edge) = self.graph.find_edge(from, to) {
            self.graph.remove_edge(edge);
        }
    }
}

/// A finished graph build: the multigraph plus the per-route ride ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphBuild {
    pub graph: TransitGraph,
    pub originals: OriginalDurations,
}

/// Constructs the multigraph for the theory and waiting modes.
///
/// Edges are declared interchange walks, admitted ride segments (one per
/// route serving a station pair, combined into parallel sets in waiting
/// mode) and, when enabled, cross-country walks.
pub fn build_graph(
    network: &Network,
    config: &Config,
    intervals: Option<&Intervals>,
    resolver: &Resolver,
    mode: Mode,
) -> GraphBuild {
    debug_assert!(mode != Mode::Realtime);

    let avoid: HashSet<u32> = config
        .avoid_stations
        .iter()
        .filter_map(|name| resolver.resolve(network, name))
        .collect();
    let ignored = config.effective_ignored();
    let mut intervals = intervals.cloned().unwrap_or_default();

    // (label-or-name, ride seconds, waiting seconds) admission records per
    // directed pair. BTreeMap keeps the build deterministic.
    let mut attrs: BTreeMap<(u32, u32), Vec<(Label, f64, f64)>> = BTreeMap::new();
    // Cheapest walking option per pair, for the waiting-mode alternative and
    // the wild-walk dedup.
    let mut walk_best: HashMap<(u32, u32), (f64, Arc<str>)> = HashMap::new();
    let mut originals: OriginalDurations = HashMap::new();

    add_interchange_edges(network, config, &avoid, &mut attrs, &mut walk_best);

    // Ride admission records, per mode.
    let mut waiting_records: BTreeMap<(u32, u32), Vec<(f64, u32, Arc<str>)>> = BTreeMap::new();
    for route in network.routes.iter() {
        if route.is_excluded(&ignored, &[]) {
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
        if mode == Mode::Waiting {
            if route.kind == TransportType::CableCarNormal {
                intervals.set(&route.name, 2);
            }
            if !intervals.contains(&route.name) {
                continue;
            }
        }

        let n = route.stops.len();
        for i in 0..n - 1 {
            if avoid.contains(&route.stops[i].station) {
                continue;
            }
            for j in i + 1..n {
                if avoid.contains(&route.stops[j].station) {
                    break;
                }

                let mut ride: f64 = if route.durations[i..j].contains(&0.0) {
                    synthesized_ride(network, route, i, j)
                } else {
                    route.durations[i..j].iter().sum()
                };
                if network.version == 4 {
                    let dwell: f64 = route.stops[i + 1..j].iter().map(|stop| stop.dwell).sum();
                    ride = (ride + dwell).round();
                }
                if ride == 0.0 {
                    continue;
                }

                let from = route.stops[i].station;
                let to = route.stops[j].station;
                match mode {
                    Mode::Theory => {
                        attrs
                            .entry((from, to))
                            .or_default()
                            .push((Label::Single(route.name.clone()), ride, 0.0));
                    }
                    Mode::Waiting => {
                        let interval = intervals.get(&route.name).unwrap_or_default();
                        waiting_records.entry((from, to)).or_default().push((
                            ride,
                            interval,
                            route.name.clone(),
                        ));
                        originals
                            .entry((route.name.clone(), from, to))
                            .and_modify(|best| {
                                if ride < *best {
                                    *best = ride;
                                }
                            })
                            .or_insert(ride);
                    }
                    Mode::Realtime => unreachable!(),
                }
            }
        }
    }

    if mode == Mode::Waiting {
        combine_parallel(waiting_records, &walk_best, &mut attrs, &mut originals);
    }

    // Admission: per pair keep only records within the prune window of the
    // cheapest total, and store them as edges.
    let mut build = GraphBuild {
        originals,
        ..Default::default()
    };
    for ((from, to), records) in &attrs {
        let min_total = records
            .iter()
            .map(|(_, ride, wait)| ride + wait)
            .min_by(|a, b| a.total_cmp(b))
            .unwrap_or_default();
        for (label, ride, wait) in records {
            let weight = ride + wait;
            if (weight - min_total).abs() <= PRUNE_WINDOW && weight > 0.0 {
                let u = build.graph.node(*from);
                let v = build.graph.node(*to);
                build.graph.graph.add_edge(
                    u,
                    v,
                    RideEdge {
                        weight,
                        waiting: *wait,
                        label: label.clone(),
                    },
                );
            }
        }
    }

    if config.calculate_walking_wild {
        add_wild_walks(network, config, &avoid, &walk_best, &mut build.graph);
    }

    info!(
        nodes = build.graph.graph.node_count(),
        edges = build.graph.graph.edge_count(),
        ?mode,
        "built transit graph"
    );
    build
}

/// Step A: declared interchange walks plus the operator-supplied extra
/// transfer and wild pairs.
fn add_interchange_edges(
    network: &Network,
    config: &Config,
    avoid: &HashSet<u32>,
    attrs: &mut BTreeMap<(u32, u32), Vec<(Label, f64, f64)>>,
    walk_best: &mut HashMap<(u32, u32), (f64, Arc<str>)>,
) {
    let mut push_walk = |from: u32, to: u32, seconds: f64, label: Arc<str>| {
        attrs
            .entry((from, to))
            .or_default()
            .push((Label::Single(label.clone()), seconds, 0.0));
        walk_best.insert((from, to), (seconds, label));
    };

    for station in network.stations.iter() {
        let Some(position) = station.position else {
            continue;
        };
        if avoid.contains(&station.index) {
            continue;
        }

        for &peer in &station.connections {
            if avoid.contains(&peer) {
                continue;
            }
            let Some(peer_position) = network.stations[peer as usize].position else {
                continue;
            };
            let blocks = position.distance(&peer_position);
            push_walk(
                station.index,
                peer,
                blocks / TRANSFER_SPEED,
                transfer_walk_label(blocks),
            );
        }

        if let Some(extras) = config.transfer_addition.get(&*station.name) {
            for extra in extras {
                let Some(peer) = station_by_name(network, extra, avoid) else {
                    continue;
                };
                if peer == station.index || station.connections.contains(&peer) {
                    continue;
                }
                let Some(peer_position) = network.stations[peer as usize].position else {
                    continue;
                };
                let blocks = position.distance(&peer_position);
                push_walk(
                    station.index,
                    peer,
                    blocks / TRANSFER_SPEED,
                    transfer_walk_label(blocks),
                );
            }
        }

        if config.calculate_walking_wild
            && let Some(extras) = config.wild_addition.get(&*station.name)
        {
            for extra in extras {
                let Some(peer) = station_by_name(network, extra, avoid) else {
                    continue;
                };
                if peer == station.index || station.connections.contains(&peer) {
                    continue;
                }
                let Some(peer_position) = network.stations[peer as usize].position else {
                    continue;
                };
                let blocks = position.distance(&peer_position);
                push_walk(
                    station.index,
                    peer,
                    blocks / WILD_WALKING_SPEED,
                    wild_walk_label(blocks),
                );
            }
        }
    }
}

fn station_by_name(network: &Network, name: &str, avoid: &HashSet<u32>) -> Option<u32> {
    network
        .stations
        .iter()
        .find(|station| &*station.name == name && !avoid.contains(&station.index))
        .map(|station| station.index)
}

/// Sum of synthesised hop times over `stops[i..=j]`, seconds. Hops with an
/// unknown endpoint position contribute nothing.
fn synthesized_ride(network: &Network, route: &crate::model::Route, i: usize, j: usize) -> f64 {
    let mut total = 0.0;
    for hop in i..j {
        let from = network.stations[route.stops[hop].station as usize].position;
        let to = network.stations[route.stops[hop + 1].station as usize].position;
        if let (Some(a), Some(b)) = (from, to) {
            total += a.distance(&b) / route.kind.nominal_speed();
        }
    }
    total
}

fn lcm(a: u64, b: u64) -> u64 {
    fn gcd(mut a: u64, mut b: u64) -> u64 {
        while b != 0 {
            (a, b) = (b, a % b);
        }
        a
    }
    a / gcd(a, b) * b
}

/// Step C, waiting mode: collapse each pair's admitted rides into one edge
/// whose waiting term models boarding whichever parallel service arrives
/// first, assuming independent uniform offsets within each headway.
fn combine_parallel(
    records: BTreeMap<(u32, u32), Vec<(f64, u32, Arc<str>)>>,
    walk_best: &HashMap<(u32, u32), (f64, Arc<str>)>,
    attrs: &mut BTreeMap<(u32, u32), Vec<(Label, f64, f64)>>,
    originals: &mut OriginalDurations,
) {
    for ((from, to), entries) in records {
        let min_ride = entries
            .iter()
            .map(|(ride, _, _)| *ride)
            .min_by(|a, b| a.total_cmp(b))
            .unwrap_or_default();

        let mut names: Vec<Arc<str>> = Vec::new();
        let mut kept_intervals: Vec<u32> = Vec::new();
        for (ride, interval, name) in &entries {
            if (ride - min_ride).abs() <= PRUNE_WINDOW {
                names.push(name.clone());
                kept_intervals.push(*interval);
            }
        }

        let mut lcm_all: u64 = 1;
        for &interval in &kept_intervals {
            if interval != 0 {
                lcm_all = lcm(lcm_all, interval as u64);
            }
        }
        let frequency_sum: f64 = kept_intervals
            .iter()
            .filter(|&&interval| interval != 0)
            .map(|&interval| lcm_all as f64 / interval as f64)
            .sum();
        let waiting = if frequency_sum == 0.0 {
            0.0
        } else {
            lcm_all as f64 / frequency_sum / 2.0
        };

        if let Some((walk_seconds, walk_label)) = walk_best.get(&(from, to))
            && (walk_seconds - min_ride).abs() <= PRUNE_WINDOW
        {
            names.push(walk_label.clone());
            originals.insert((walk_label.clone(), from, to), *walk_seconds);
        }

        attrs.insert(
            (from, to),
            vec![(Label::Parallel(names), min_ride, waiting)],
        );
    }
}

/// Step D: cross-country walks between pairs with no declared walking link.
/// An existing ride clearly faster than the walk keeps the walk out; a ride
/// clearly slower is replaced by it.
fn add_wild_walks(
    network: &Network,
    config: &Config,
    avoid: &HashSet<u32>,
    walk_best: &HashMap<(u32, u32), (f64, Arc<str>)>,
    graph: &mut TransitGraph,
) {
    let max_squared = config.max_wild_blocks * config.max_wild_blocks;
    let mut planned: Vec<(u32, u32, f64, Arc<str>)> = Vec::new();

    for station in network.stations.iter() {
        if avoid.contains(&station.index) {
            continue;
        }
        let Some(position) = station.position else {
            continue;
        };
        for other in network.stations.iter() {
            if other.index == station.index || avoid.contains(&other.index) {
                continue;
            }
            let Some(other_position) = other.position else {
                continue;
            };
            if walk_best.contains_key(&(station.index, other.index)) {
                continue;
            }
            let squared = position.distance_squared(&other_position);
            if squared > max_squared {
                continue;
            }
            let blocks = squared.sqrt();
            let seconds = blocks / WILD_WALKING_SPEED;

            if let (Some(u), Some(v)) = (
                graph.node_index(station.index),
                graph.node_index(other.index),
            ) && let Some(existing) = graph.min_weight_between(u, v)
            {
                if seconds - existing > PRUNE_WINDOW {
                    continue;
                }
                if seconds + 120.0 < existing {
                    graph.remove_all_between(u, v);
                }
            }
            planned.push((station.index, other.index, seconds, wild_walk_label(blocks)));
        }
    }

    debug!(walks = planned.len(), "admitted cross-country walk edges");
    for (from, to, seconds, label) in planned {
        let u = graph.node(from);
        let v = graph.node(to);
        graph.graph.add_edge(
            u,
            v,
            RideEdge {
                weight: seconds,
                waiting: 0.0,
                label: Label::Single(label),
            },
        );
    }
}
