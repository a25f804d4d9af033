use std::sync::Arc;

use petgraph::graph::NodeIndex;

use crate::{
    graph::{GraphBuild, Label, RideEdge},
    model::{Intervals, Network},
    query::{Journey, Leg, Terminus, WALK_COLOR, natural_key, ride_terminus},
};

/// Turns a shortest node path over the ride multigraph into display legs.
///
/// Every parallel route name sharing a station pair becomes its own leg on
/// that pair (the renderer shows them as "or" alternatives), with each
/// alternative's own ride time recovered from the originals ledger.
pub fn journey_from_path(
    network: &Network,
    build: &GraphBuild,
    intervals: &Intervals,
    path: &[NodeIndex],
    total: f64,
) -> Journey {
    let mut legs: Vec<Leg> = Vec::new();
    let mut waiting_total = 0.0;

    for window in path.windows(2) {
        let (u_node, v_node) = (window[0], window[1]);
        let from = build.graph.station(u_node);
        let to = build.graph.station(v_node);
        let edges = build.graph.edges_between(u_node, v_node);

        let mut names: Vec<Arc<str>> = Vec::new();
        for edge in &edges {
            waiting_total += edge.waiting;
            names.extend(edge.label.names().iter().cloned());
        }

        let mut pair_legs: Vec<Leg> = Vec::new();
        for name in &names {
            let ride = ride_seconds(build, &edges, name, from, to);
            let waiting = edges
                .iter()
                .find(|edge| edge.label.contains(name))
                .map(|edge| edge.waiting)
                .unwrap_or_default();
            let leg = make_leg(network, intervals, name, from, to, ride, waiting);

            let duplicate = pair_legs.last().is_some_and(|last| {
                last.from == leg.from
                    && last.to == leg.to
                    && last.color == leg.color
                    && last.route == leg.route
                    && last.terminus == leg.terminus
                    && last.ride_seconds.round() == leg.ride_seconds.round()
            });
            if !duplicate {
                pair_legs.push(leg);
            }
        }

        pair_legs.sort_by(|a, b| natural_key(&a.route).cmp(&natural_key(&b.route)));
        pair_legs.sort_by(|a, b| a.ride_seconds.total_cmp(&b.ride_seconds));
        legs.extend(pair_legs);
    }

    let total_seconds = total.round() as u32;
    let waiting_seconds = waiting_total.round() as u32;
    Journey {
        legs,
        total_seconds,
        riding_seconds: total_seconds.saturating_sub(waiting_seconds),
        waiting_seconds,
    }
}

/// A single alternative's pure ride time: a single-labelled edge carries it
/// as its weight, a combined parallel edge defers to the originals ledger.
fn ride_seconds(
    build: &GraphBuild,
    edges: &[&RideEdge],
    name: &Arc<str>,
    from: u32,
    to: u32,
) -> f64 {
    for edge in edges {
        if let Label::Single(single) = &edge.label
            && single == name
        {
            return edge.weight;
        }
    }
    if let Some(&ride) = build.originals.get(&(name.clone(), from, to)) {
        return ride;
    }
    edges
        .iter()
        .find(|edge| edge.label.contains(name))
        .map(|edge| edge.weight - edge.waiting)
        .unwrap_or_default()
}

fn make_leg(
    network: &Network,
    intervals: &Intervals,
    name: &Arc<str>,
    from: u32,
    to: u32,
    ride: f64,
    waiting: f64,
) -> Leg {
    let from_name = network.stations[from as usize].display_name();
    let to_name = network.stations[to as usize].display_name();

    if let Some(route) = network.route_by_name(name) {
        Leg {
            from: from_name,
            to: to_name,
            color: route.color_hex(),
            route: route.display_name(),
            terminus: ride_terminus(network, route, from, true),
            ride_seconds: ride,
            waiting_seconds: waiting,
            interval: intervals.get(name),
            kind: Some(route.kind),
            platform: None,
        }
    } else {
        // A walking alternative; its label stands in for the route name,
        // and walking involves no waiting even inside a parallel set.
        Leg {
            from: from_name,
            to: to_name,
            color: WALK_COLOR.to_string(),
            route: name.to_string(),
            terminus: Terminus::Linear {
                primary: name.to_string(),
                alt: "Walk".to_string(),
            },
            ride_seconds: ride,
            waiting_seconds: 0.0,
            interval: intervals.get(name),
            kind: None,
            platform: None,
        }
    }
}
