// Control-plane ingress: one UDP listener, dispatching on the packet type

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::net::UdpSocket;

use crate::types::{ControlPacket, HelloPacket, LsaPacket, Packet};
use crate::{lsa, neighbor, routes, tasks, AppState};

/// Receiver loop; never returns under normal operation. Every per-packet
/// failure is logged and the loop continues.
pub async fn main_loop(socket: Arc<UdpSocket>, state: Arc<AppState>) -> crate::error::Result<()> {
    let mut buf = vec![0u8; state.config.buffer_size];
    loop {
        let (len, src_addr) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                error!("[RECV] recvfrom failed: {}", e);
                continue;
            }
        };
        let value: serde_json::Value = match serde_json::from_slice(&buf[..len]) {
            Ok(value) => value,
            Err(e) => {
                warn!("[RECV] invalid JSON from {}: {}", src_addr, e);
                continue;
            }
        };
        let Some(kind) = value.get("type").and_then(|v| v.as_str()).map(|s| s.to_string()) else {
            warn!("[RECV] packet without type field from {}", src_addr);
            continue;
        };
        if !matches!(kind.as_str(), "HELLO" | "LSA" | "CONTROL") {
            warn!("[RECV] unknown packet type {:?} from {}", kind, src_addr);
            continue;
        }
        let packet: Packet = match serde_json::from_value(value) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("[RECV] malformed {} packet from {}: {}", kind, src_addr, e);
                continue;
            }
        };
        let IpAddr::V4(source_ip) = src_addr.ip() else {
            continue;
        };
        match packet {
            Packet::Hello(hello) => handle_hello(&state, hello, source_ip).await,
            Packet::Lsa(lsa) => handle_lsa(&socket, &state, lsa, source_ip).await,
            Packet::Control(control) => handle_control(&socket, &state, control, src_addr).await,
        }
    }
}

async fn handle_hello(state: &Arc<AppState>, packet: HelloPacket, source_ip: Ipv4Addr) {
    debug!("[RECV] HELLO from {} ({})", packet.router_id, source_ip);
    let outcome = {
        let mut router = state.router.lock().await;
        neighbor::process_hello(&mut router, &state.router_id, &state.costs, &packet, source_ip)
    };
    if outcome.adjacency_formed {
        tasks::start_lsa_task(state);
    }
}

async fn handle_lsa(
    socket: &Arc<UdpSocket>,
    state: &Arc<AppState>,
    packet: LsaPacket,
    source_ip: Ipv4Addr,
) {
    info!(
        "[RECV] LSA from {} seq {} ({})",
        packet.router_id, packet.sequence_number, source_ip
    );
    let outcome = {
        let mut router = state.router.lock().await;
        neighbor::process_lsa(&mut router, &state.router_id, &packet, source_ip)
    };
    if !outcome.accepted {
        return;
    }
    routes::install_routes(&outcome.routes).await;
    // Forward verbatim to every adjacency except the incoming one.
    lsa::send_to_each(
        socket,
        &Packet::Lsa(packet),
        &outcome.flood_targets,
        state.config.port,
        "[FLOOD] LSA",
    )
    .await;
}

async fn handle_control(
    socket: &Arc<UdpSocket>,
    state: &Arc<AppState>,
    packet: ControlPacket,
    src_addr: SocketAddr,
) {
    info!("[CLI] command {:?} from {}", packet.command, src_addr);
    let report = match packet.command.as_str() {
        "neighbors" => neighbors_report(state).await,
        "routing-table" => routing_table_report(state).await,
        "lsdb" => lsdb_report(state).await,
        other => format!(
            "unknown command {:?}; available: neighbors, routing-table, lsdb",
            other
        ),
    };
    if let Err(e) = socket.send_to(report.as_bytes(), src_addr).await {
        warn!("[CLI] failed to answer {}: {}", src_addr, e);
    }
}

async fn neighbors_report(state: &Arc<AppState>) -> String {
    let router = state.router.lock().await;
    if router.detected_cost.is_empty() {
        return "no neighbors detected".to_string();
    }
    let mut ids: Vec<&String> = router.detected_cost.keys().collect();
    ids.sort();
    ids.iter()
        .map(|id| {
            let cost = router.detected_cost[*id];
            match router.recognized_ip.get(*id) {
                Some(ip) => format!("{} cost {} recognized at {}", id, cost, ip),
                None => format!("{} cost {} detected", id, cost),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

async fn routing_table_report(state: &Arc<AppState>) -> String {
    let router = state.router.lock().await;
    if router.next_hop.is_empty() {
        return "routing table is empty".to_string();
    }
    router
        .next_hop
        .iter()
        .map(|(destination, first_hop)| format!("{} via {}", destination, first_hop))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn lsdb_report(state: &Arc<AppState>) -> String {
    let router = state.router.lock().await;
    if router.lsdb.is_empty() {
        return "lsdb is empty".to_string();
    }
    let mut entries: Vec<_> = router.lsdb.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
        .iter()
        .map(|(id, entry)| {
            let mut links: Vec<String> = entry
                .links
                .iter()
                .map(|(neighbor, cost)| format!("{}:{}", neighbor, cost))
                .collect();
            links.sort();
            format!(
                "{} seq {} addresses [{}] links [{}]",
                id,
                entry.sequence_number,
                entry.addresses.join(", "),
                links.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
