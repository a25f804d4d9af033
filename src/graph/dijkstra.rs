use std::{cmp::Ordering, collections::BinaryHeap};

use petgraph::{graph::DiGraph, graph::NodeIndex, visit::EdgeRef};

use crate::graph::RideEdge;

/// Heap entry ordered by total weight, then hop count, so popping the
/// minimum yields the cheapest path and, among equal-weight paths, the one
/// with fewest nodes.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: f64,
    hops: u32,
    node: NodeIndex,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.hops.cmp(&self.hops))
            .then_with(|| other.node.index().cmp(&self.node.index()))
    }
}

/// Lexicographic `(weight, hops)` Dijkstra over the ride multigraph.
///
/// Returns the total weight and the node sequence of the minimum-weight
/// path, tie-broken to the fewest nodes, or `None` when the destination is
/// unreachable.
pub fn shortest_path(
    graph: &DiGraph<u32, RideEdge>,
    start: NodeIndex,
    end: NodeIndex,
) -> Option<(f64, Vec<NodeIndex>)> {
    let n = graph.node_count();
    let mut best: Vec<Option<(f64, u32)>> = vec![None; n];
    let mut parent: Vec<Option<NodeIndex>> = vec![None; n];
    let mut heap: BinaryHeap<Candidate> = BinaryHeap::new();

    best[start.index()] = Some((0.0, 0));
    heap.push(Candidate {
        cost: 0.0,
        hops: 0,
        node: start,
    });

    while let Some(Candidate { cost, hops, node }) = heap.pop() {
        match best[node.index()] {
            Some((c, h)) if (cost, hops) != (c, h) => continue,
            None => continue,
            _ => {}
        }
        if node == end {
            break;
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let next_cost = cost + edge.weight().weight;
            let next_hops = hops + 1;
            let improved = match best[next.index()] {
                Some((c, h)) => {
                    next_cost < c || (next_cost == c && next_hops < h)
                }
                None => true,
            };
            if improved {
                best[next.index()] = Some((next_cost, next_hops));
                parent[next.index()] = Some(node);
                heap.push(Candidate {
                    cost: next_cost,
                    hops: next_hops,
                    node: next,
                });
            }
        }
    }

    let (total, _) = best[end.index()]?;
    let mut path = vec![end];
    let mut at = end;
    while at != start {
        at = parent[at.index()]?;
        path.push(at);
    }
    path.reverse();
    Some((total, path))
}
