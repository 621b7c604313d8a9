// HELLO emission

use std::net::{Ipv4Addr, SocketAddr};

use log::info;
use tokio::net::UdpSocket;

use crate::error::{AppError, Result};
use crate::types::{HelloPacket, Packet};
use crate::unix_now;

pub fn build_hello(router_id: &str, local_ip: Ipv4Addr, known_neighbors: Vec<String>) -> HelloPacket {
    HelloPacket {
        router_id: router_id.to_string(),
        timestamp: unix_now(),
        ip_address: local_ip.to_string(),
        known_neighbors,
    }
}

/// Serializes and sends one packet, logging with the given prefix.
pub async fn send_packet(
    socket: &UdpSocket,
    addr: SocketAddr,
    packet: &Packet,
    log_prefix: &str,
) -> Result<()> {
    let serialized = serde_json::to_vec(packet).map_err(AppError::from)?;
    socket
        .send_to(&serialized, addr)
        .await
        .map_err(|e| AppError::NetworkError(format!("failed to send to {}: {}", addr, e)))?;
    info!("{} sent to {}", log_prefix, addr);
    Ok(())
}
