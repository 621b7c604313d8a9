// Shortest-path-first computation over the link-state database

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

use crate::lsdb::Lsdb;

#[derive(Debug, Clone, Eq, PartialEq)]
struct SpfNode {
    router_id: String,
    total_cost: u64,
}

impl Ord for SpfNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on cost; equal costs pop in router-id order.
        other
            .total_cost
            .cmp(&self.total_cost)
            .then_with(|| other.router_id.cmp(&self.router_id))
    }
}

impl PartialOrd for SpfNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct SpfResult {
    /// Finite distances only; unreachable routers are simply absent.
    pub dist: HashMap<String, u64>,
    pub predecessor: HashMap<String, Option<String>>,
}

/// Dijkstra from `source` over the union of every LSDB entry's outgoing
/// links. Edges are directed as advertised; symmetry is not assumed.
pub fn shortest_paths(lsdb: &Lsdb, source: &str) -> SpfResult {
    let mut dist: HashMap<String, u64> = HashMap::new();
    let mut predecessor: HashMap<String, Option<String>> =
        lsdb.keys().map(|id| (id.clone(), None)).collect();
    let mut visited: HashSet<String> = HashSet::new();
    let mut heap: BinaryHeap<SpfNode> = BinaryHeap::new();

    dist.insert(source.to_string(), 0);
    predecessor.insert(source.to_string(), None);
    heap.push(SpfNode {
        router_id: source.to_string(),
        total_cost: 0,
    });

    while let Some(node) = heap.pop() {
        if !visited.insert(node.router_id.clone()) {
            continue;
        }
        let Some(links) = lsdb.links(&node.router_id) else {
            continue;
        };
        for (neighbor, cost) in links {
            if visited.contains(neighbor) {
                continue;
            }
            let candidate = node.total_cost + *cost as u64;
            let update = match dist.get(neighbor) {
                None => true,
                Some(&best) if candidate < best => true,
                Some(&best) if candidate == best => {
                    // Deterministic tie-break: keep the smaller predecessor id.
                    match predecessor.get(neighbor) {
                        Some(Some(current)) => node.router_id < *current,
                        _ => false,
                    }
                }
                Some(_) => false,
            };
            if update {
                dist.insert(neighbor.clone(), candidate);
                predecessor.insert(neighbor.clone(), Some(node.router_id.clone()));
                heap.push(SpfNode {
                    router_id: neighbor.clone(),
                    total_cost: candidate,
                });
            }
        }
    }

    SpfResult { dist, predecessor }
}

/// Walks `predecessor` backwards from each reachable destination until the
/// predecessor equals `source`; that node is the first hop. Destinations
/// whose walk dies before touching the source are skipped.
pub fn next_hops(spf: &SpfResult, source: &str) -> BTreeMap<String, String> {
    let mut table = BTreeMap::new();
    for destination in spf.dist.keys() {
        if destination == source {
            continue;
        }
        let mut hop = destination;
        let first_hop = loop {
            match spf.predecessor.get(hop).and_then(|prev| prev.as_ref()) {
                Some(prev) if prev == source => break Some(hop.clone()),
                Some(prev) => hop = prev,
                None => break None,
            }
        };
        if let Some(first_hop) = first_hop {
            table.insert(destination.clone(), first_hop);
        }
    }
    table
}
