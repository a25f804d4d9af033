use std::collections::HashMap;

use crate::{
    model::Network,
    query::{Journey, Leg, Terminus, WALK_COLOR, ride_terminus},
    timetable::{Connection, ConnectionKind},
};

/// Turns a reconstructed connection chain into display legs.
///
/// Consecutive connections of one trip collapse into a single ride leg, and
/// adjacent legs on the same route towards the same terminus merge unless
/// the caller asked for per-stop detail.
pub fn journey_from_connections(
    network: &Network,
    connections: &[Connection],
    path: &[usize],
    trips: &[HashMap<u32, u32>],
    departure_time: u32,
    detail: bool,
) -> Journey {
    let coalesced = coalesce_trips(connections, path, trips);
    let merged = merge_adjacent(coalesced, detail);

    let mut legs: Vec<Leg> = Vec::new();
    let mut previous_end = departure_time;
    for connection in &merged {
        legs.push(make_leg(network, connection, previous_end));
        previous_end = connection.arr_time;
    }

    let total_seconds = merged
        .last()
        .map(|connection| connection.arr_time - departure_time)
        .unwrap_or_default();
    let waiting_seconds: f64 = legs.iter().map(|leg| leg.waiting_seconds).sum();
    let waiting_seconds = waiting_seconds.round() as u32;
    Journey {
        legs,
        total_seconds,
        riding_seconds: total_seconds.saturating_sub(waiting_seconds),
        waiting_seconds,
    }
}

/// Walks the chain backwards; whenever an earlier connection belongs to the
/// same trip, the later one is extended leftwards over it and everything in
/// between is dropped. The earliest matching connection wins.
fn coalesce_trips(
    connections: &[Connection],
    path: &[usize],
    trips: &[HashMap<u32, u32>],
) -> Vec<Connection> {
    let mut result: Vec<Connection> = Vec::new();
    let mut low_i = usize::MAX;

    for i in (0..path.len()).rev() {
        if i >= low_i {
            continue;
        }
        let mut leg = connections[path[i]].clone();
        if let Some(trip_no) = leg.trip
            && let Some(trip) = trips.get(trip_no as usize)
        {
            for j in (0..i).rev() {
                let earlier = &connections[path[j]];
                let Some(&boarding_time) = trip.get(&earlier.dep) else {
                    continue;
                };
                if boarding_time >= earlier.dep_time {
                    leg.dep = earlier.dep;
                    leg.dep_time = boarding_time;
                    leg.kind = earlier.kind.clone();
                    low_i = j;
                }
            }
        }
        result.push(leg);
    }

    result.reverse();
    result
}

fn merge_key(kind: &ConnectionKind) -> (&str, &str) {
    match kind {
        ConnectionKind::Ride { route, terminus, .. } => (route, terminus),
        ConnectionKind::Walk { label } => (label, ""),
    }
}

fn merge_adjacent(chain: Vec<Connection>, detail: bool) -> Vec<Connection> {
    let mut merged: Vec<Connection> = Vec::new();
    let mut last_key: Option<(String, String)> = None;
    for connection in chain {
        let (a, b) = merge_key(&connection.kind);
        let key = (a.to_string(), b.to_string());
        if detail || last_key.as_ref() != Some(&key) {
            last_key = Some(key);
            merged.push(connection);
        } else {
            last_key = Some(key);
            if let Some(last) = merged.last_mut() {
                last.arr = connection.arr;
                last.arr_time = connection.arr_time;
            }
        }
    }
    merged
}

fn station_display(network: &Network, num: u32) -> String {
    network
        .station_by_num(num)
        .map(|station| station.display_name())
        .unwrap_or_default()
}

fn make_leg(network: &Network, connection: &Connection, previous_end: u32) -> Leg {
    let from = station_display(network, connection.dep);
    let to = station_display(network, connection.arr);
    let ride_seconds = (connection.arr_time - connection.dep_time) as f64;
    let waiting_seconds = connection.dep_time.saturating_sub(previous_end) as f64;

    if let ConnectionKind::Ride {
        route: route_id,
        platform,
        ..
    } = &connection.kind
        && let Some(route) = network.route_by_id(route_id)
    {
        let boarding = network
            .station_by_num(connection.dep)
            .map(|station| station.index)
            .unwrap_or_default();
        return Leg {
            from,
            to,
            color: route.color_hex(),
            route: route.display_name(),
            terminus: ride_terminus(network, route, boarding, false),
            ride_seconds,
            waiting_seconds,
            interval: None,
            kind: Some(route.kind),
            platform: Some(platform.to_string()),
        };
    }

    let label = match &connection.kind {
        ConnectionKind::Walk { label } => label.to_string(),
        ConnectionKind::Ride { route, .. } => route.to_string(),
    };
    Leg {
        from,
        to,
        color: WALK_COLOR.to_string(),
        route: label.clone(),
        terminus: Terminus::Linear {
            primary: label,
            alt: "Walk".to_string(),
        },
        ride_seconds,
        waiting_seconds,
        interval: None,
        kind: None,
        platform: None,
    }
}
