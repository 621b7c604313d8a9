// LSA construction and fan-out

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use log::error;
use tokio::net::UdpSocket;

use crate::hello::send_packet;
use crate::types::{LsaPacket, Packet};
use crate::unix_now;

pub fn build_lsa(
    router_id: &str,
    sequence_number: i64,
    addresses: Vec<String>,
    links: HashMap<String, i32>,
) -> LsaPacket {
    LsaPacket {
        router_id: router_id.to_string(),
        timestamp: unix_now(),
        sequence_number,
        addresses,
        links,
    }
}

/// Unicasts one packet to each target on the control port. Send failures
/// are logged per destination; the fan-out always completes.
pub async fn send_to_each(
    socket: &UdpSocket,
    packet: &Packet,
    targets: &[Ipv4Addr],
    port: u16,
    log_prefix: &str,
) {
    for target in targets {
        let addr = SocketAddr::new(IpAddr::V4(*target), port);
        if let Err(e) = send_packet(socket, addr, packet, log_prefix).await {
            error!("{} to {} failed: {}", log_prefix, addr, e);
        }
    }
}
