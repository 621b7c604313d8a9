// HELLO and LSA processors: the protocol state machine, free of sockets so
// tests can drive it directly

use std::net::Ipv4Addr;

use log::{debug, info, warn};

use crate::cost::CostOracle;
use crate::routes::{self, RouteSpec};
use crate::types::{HelloPacket, LsaPacket};
use crate::RouterState;

#[derive(Debug, Default)]
pub struct HelloOutcome {
    /// True exactly when this HELLO confirmed a new bidirectional adjacency;
    /// the caller starts the LSA emitter on the first such event.
    pub adjacency_formed: bool,
}

/// A neighbor becomes *detected* on its first HELLO; it becomes *recognized*
/// only when its HELLO lists us in return. Only recognized neighbors take
/// part in LSA exchange and next-hop resolution.
pub fn process_hello(
    state: &mut RouterState,
    local_id: &str,
    costs: &CostOracle,
    packet: &HelloPacket,
    source_ip: Ipv4Addr,
) -> HelloOutcome {
    if packet.router_id == local_id {
        return HelloOutcome::default();
    }
    let cost = match costs.require(local_id, &packet.router_id) {
        Ok(cost) => cost,
        Err(e) => {
            warn!("[HELLO] dropping packet from {}: {}", packet.router_id, e);
            return HelloOutcome::default();
        }
    };
    state.detected_cost.insert(packet.router_id.clone(), cost);

    let lists_us = packet.known_neighbors.iter().any(|id| id == local_id);
    if lists_us && !state.recognized_ip.contains_key(&packet.router_id) {
        info!(
            "[HELLO] adjacency with {} confirmed at {}",
            packet.router_id, source_ip
        );
        state
            .recognized_ip
            .insert(packet.router_id.clone(), source_ip);
        return HelloOutcome {
            adjacency_formed: true,
        };
    }
    HelloOutcome::default()
}

#[derive(Debug, Default)]
pub struct LsaOutcome {
    pub accepted: bool,
    /// Recognized neighbor IPs to forward the packet to, minus the sender.
    pub flood_targets: Vec<Ipv4Addr>,
    /// Route batch derived from the refreshed next-hop table.
    pub routes: Vec<RouteSpec>,
}

/// Applies a received LSA. On acceptance the SPF and next-hop table are
/// recomputed in place (still under the caller's lock) and the packet is
/// scheduled for split-horizon flooding; a stale LSA is dropped silently,
/// which is what terminates flooding.
pub fn process_lsa(
    state: &mut RouterState,
    local_id: &str,
    packet: &LsaPacket,
    source_ip: Ipv4Addr,
) -> LsaOutcome {
    if packet.router_id == local_id {
        return LsaOutcome::default();
    }
    if !state.lsdb.update(packet) {
        debug!(
            "[LSA] stale from {} (seq {}), dropped",
            packet.router_id, packet.sequence_number
        );
        return LsaOutcome::default();
    }
    state.recompute_routes(local_id);
    let flood_targets = state
        .recognized_ip
        .values()
        .copied()
        .filter(|ip| *ip != source_ip)
        .collect();
    LsaOutcome {
        accepted: true,
        flood_targets,
        routes: routes::plan_routes(state),
    }
}

/// Self-injection of the locally built LSA, so SPF always runs over a view
/// that includes this router. Returns the route batch when the entry
/// changed (it always does: the emitter increments the sequence number).
pub fn refresh_local_lsa(
    state: &mut RouterState,
    local_id: &str,
    packet: &LsaPacket,
) -> Option<Vec<RouteSpec>> {
    if !state.lsdb.update(packet) {
        return None;
    }
    state.recompute_routes(local_id);
    Some(routes::plan_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn oracle(entries: &[(&str, &str)]) -> CostOracle {
        CostOracle::from_vars(
            "rt0",
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>()
                .into_iter(),
        )
    }

    fn hello(router_id: &str, known: &[&str]) -> HelloPacket {
        HelloPacket {
            router_id: router_id.to_string(),
            timestamp: 1.0,
            ip_address: "10.10.1.3".to_string(),
            known_neighbors: known.iter().map(|id| id.to_string()).collect(),
        }
    }

    fn lsa(router_id: &str, seq: i64, links: &[(&str, i32)]) -> LsaPacket {
        LsaPacket {
            router_id: router_id.to_string(),
            timestamp: 1.0,
            sequence_number: seq,
            addresses: vec!["192.168.2.0/24".to_string()],
            links: links
                .iter()
                .map(|(id, cost)| (id.to_string(), *cost))
                .collect(),
        }
    }

    #[test]
    fn first_hello_detects_without_recognizing() {
        let mut state = RouterState::default();
        let costs = oracle(&[("CUSTO_rt0_rt1_net", "5")]);
        let outcome = process_hello(
            &mut state,
            "rt0",
            &costs,
            &hello("rt1", &[]),
            "10.10.1.3".parse().expect("ip"),
        );
        assert!(!outcome.adjacency_formed);
        assert_eq!(state.detected_cost.get("rt1"), Some(&5));
        assert!(state.recognized_ip.is_empty());
    }

    #[test]
    fn hello_listing_us_confirms_adjacency_once() {
        let mut state = RouterState::default();
        let costs = oracle(&[("CUSTO_rt0_rt1_net", "5")]);
        let source: Ipv4Addr = "10.10.1.3".parse().expect("ip");

        let first = process_hello(&mut state, "rt0", &costs, &hello("rt1", &["rt0"]), source);
        assert!(first.adjacency_formed);
        assert_eq!(state.recognized_ip.get("rt1"), Some(&source));

        let second = process_hello(&mut state, "rt0", &costs, &hello("rt1", &["rt0"]), source);
        assert!(!second.adjacency_formed);
    }

    #[test]
    fn recognized_is_always_a_subset_of_detected() {
        let mut state = RouterState::default();
        let costs = oracle(&[("CUSTO_rt0_rt1_net", "5")]);
        process_hello(
            &mut state,
            "rt0",
            &costs,
            &hello("rt1", &["rt0"]),
            "10.10.1.3".parse().expect("ip"),
        );
        for id in state.recognized_ip.keys() {
            assert!(state.detected_cost.contains_key(id));
        }
    }

    #[test]
    fn own_hello_is_ignored() {
        let mut state = RouterState::default();
        let costs = oracle(&[("CUSTO_rt0_rt1_net", "5")]);
        let outcome = process_hello(
            &mut state,
            "rt0",
            &costs,
            &hello("rt0", &["rt1"]),
            "10.10.1.2".parse().expect("ip"),
        );
        assert!(!outcome.adjacency_formed);
        assert!(state.detected_cost.is_empty());
    }

    #[test]
    fn missing_cost_drops_the_hello_untouched() {
        let mut state = RouterState::default();
        let costs = oracle(&[]);
        let outcome = process_hello(
            &mut state,
            "rt0",
            &costs,
            &hello("rt9", &["rt0"]),
            "10.10.1.9".parse().expect("ip"),
        );
        assert!(!outcome.adjacency_formed);
        assert!(state.detected_cost.is_empty());
        assert!(state.recognized_ip.is_empty());

        // A later valid HELLO is unaffected.
        let costs = oracle(&[("CUSTO_rt0_rt1_net", "5")]);
        let outcome = process_hello(
            &mut state,
            "rt0",
            &costs,
            &hello("rt1", &["rt0"]),
            "10.10.1.3".parse().expect("ip"),
        );
        assert!(outcome.adjacency_formed);
    }

    #[test]
    fn accepted_lsa_floods_to_everyone_but_the_sender() {
        let mut state = RouterState::default();
        let sender: Ipv4Addr = "10.10.1.3".parse().expect("ip");
        let other: Ipv4Addr = "10.10.2.3".parse().expect("ip");
        state.recognized_ip.insert("rt1".to_string(), sender);
        state.recognized_ip.insert("rt3".to_string(), other);

        let outcome = process_lsa(&mut state, "rt0", &lsa("rt2", 1, &[("rt1", 1)]), sender);
        assert!(outcome.accepted);
        assert_eq!(outcome.flood_targets, vec![other]);
    }

    #[test]
    fn stale_lsa_is_dropped_without_flooding() {
        let mut state = RouterState::default();
        let sender: Ipv4Addr = "10.10.1.3".parse().expect("ip");
        state.recognized_ip.insert("rt1".to_string(), sender);

        assert!(process_lsa(&mut state, "rt0", &lsa("rt2", 7, &[]), sender).accepted);
        let stale = process_lsa(&mut state, "rt0", &lsa("rt2", 5, &[]), sender);
        assert!(!stale.accepted);
        assert!(stale.flood_targets.is_empty());
        assert!(stale.routes.is_empty());
        assert_eq!(
            state.lsdb.get("rt2").map(|e| e.sequence_number),
            Some(7)
        );
    }

    #[test]
    fn own_lsa_echoed_back_is_ignored() {
        let mut state = RouterState::default();
        let outcome = process_lsa(
            &mut state,
            "rt0",
            &lsa("rt0", 99, &[]),
            "10.10.1.3".parse().expect("ip"),
        );
        assert!(!outcome.accepted);
        assert!(state.lsdb.is_empty());
    }

    #[test]
    fn local_refresh_recomputes_routes() {
        let mut state = RouterState::default();
        let source: Ipv4Addr = "10.10.1.3".parse().expect("ip");
        state.detected_cost.insert("rt1".to_string(), 5);
        state.recognized_ip.insert("rt1".to_string(), source);
        process_lsa(&mut state, "rt0", &lsa("rt1", 1, &[("rt0", 5)]), source);

        let mut links = HashMap::new();
        links.insert("rt1".to_string(), 5);
        let own = LsaPacket {
            router_id: "rt0".to_string(),
            timestamp: 2.0,
            sequence_number: 1,
            addresses: vec!["192.168.1.0/24".to_string()],
            links,
        };
        let batch = refresh_local_lsa(&mut state, "rt0", &own).expect("accepted");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].prefix, "192.168.2.0/24");
        assert_eq!(batch[0].gateway, source);
        assert_eq!(state.next_hop.get("rt1").map(String::as_str), Some("rt1"));
    }
}
