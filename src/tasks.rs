// Periodic emitter tasks

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::net::UdpSocket;

use crate::interfaces;
use crate::types::Packet;
use crate::{hello, lsa, neighbor, routes, AppState};

/// One HELLO broadcaster per inter-router link.
pub fn spawn_hello_tasks(state: &Arc<AppState>) {
    for (local_ip, broadcast_ip) in interfaces::router_links(&state.interfaces) {
        tokio::spawn(run_hello_emitter(
            Arc::clone(state),
            local_ip,
            broadcast_ip,
        ));
    }
}

async fn run_hello_emitter(state: Arc<AppState>, local_ip: Ipv4Addr, broadcast_ip: Ipv4Addr) {
    // The emitter socket is created once and reused for every tick.
    let socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(socket) => socket,
        Err(e) => {
            error!("[SEND] HELLO emitter on {} cannot bind: {}", local_ip, e);
            return;
        }
    };
    if let Err(e) = socket.set_broadcast(true) {
        error!("[SEND] HELLO emitter on {} cannot enable broadcast: {}", local_ip, e);
        return;
    }
    let addr = SocketAddr::new(IpAddr::V4(broadcast_ip), state.config.port);
    let mut interval =
        tokio::time::interval(Duration::from_secs(state.config.hello_interval_secs));
    loop {
        interval.tick().await;
        let known_neighbors = {
            let router = state.router.lock().await;
            let mut ids: Vec<String> = router.detected_cost.keys().cloned().collect();
            ids.sort();
            ids
        };
        let packet = Packet::Hello(hello::build_hello(
            &state.router_id,
            local_ip,
            known_neighbors,
        ));
        if let Err(e) = hello::send_packet(&socket, addr, &packet, "[SEND] HELLO").await {
            error!("[SEND] HELLO to {} failed: {}", addr, e);
        }
    }
}

/// Starts the LSA emitter on the first confirmed adjacency. Idempotent:
/// later calls are no-ops.
pub fn start_lsa_task(state: &Arc<AppState>) {
    if state.lsa_started.swap(true, Ordering::SeqCst) {
        return;
    }
    info!("[LSA] first adjacency confirmed, starting LSA emitter");
    tokio::spawn(run_lsa_emitter(Arc::clone(state)));
}

async fn run_lsa_emitter(state: Arc<AppState>) {
    let socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(socket) => socket,
        Err(e) => {
            error!("[LSA] emitter cannot bind: {}", e);
            return;
        }
    };
    let mut sequence_number: i64 = 0;
    let mut interval = tokio::time::interval(Duration::from_secs(state.config.lsa_interval_secs));
    loop {
        interval.tick().await;
        sequence_number += 1;
        let (packet, targets, batch) = {
            let mut router = state.router.lock().await;
            let packet = lsa::build_lsa(
                &state.router_id,
                sequence_number,
                interfaces::local_prefixes(&state.interfaces),
                router.detected_cost.clone(),
            );
            let batch = neighbor::refresh_local_lsa(&mut router, &state.router_id, &packet);
            let targets: Vec<Ipv4Addr> = router.recognized_ip.values().copied().collect();
            (packet, targets, batch)
        };
        if let Some(batch) = batch {
            routes::install_routes(&batch).await;
        }
        lsa::send_to_each(&socket, &Packet::Lsa(packet), &targets, state.config.port, "[SEND] LSA")
            .await;
    }
}
