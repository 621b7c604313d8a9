// Interface inventory, run once at startup

use std::net::Ipv4Addr;

use log::debug;
use pnet::datalink;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

use crate::error::{AppError, Result};

/// One entry per IPv4 address on an `eth*` interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interface {
    /// Participates in the protocol: HELLOs are broadcast here.
    RouterLink {
        local_ip: Ipv4Addr,
        broadcast_ip: Ipv4Addr,
    },
    /// Local-host subnet, advertised as a reachable prefix only.
    LocalPrefix { prefix: String },
}

/// Enumerates the node's interfaces. Only kernel names starting with `eth`
/// take part; addresses in the `192.` block are host subnets, everything
/// else is an inter-router link. An empty inventory is fatal.
pub fn discover() -> Result<Vec<Interface>> {
    let mut found = Vec::new();
    for iface in datalink::interfaces() {
        if !iface.name.starts_with("eth") {
            continue;
        }
        for ip_network in iface.ips {
            if let IpNetwork::V4(network) = ip_network {
                let entry = classify(network);
                debug!("[INIT] {} {:?} -> {:?}", iface.name, network, entry);
                found.push(entry);
            }
        }
    }
    if found.is_empty() {
        return Err(AppError::ConfigError(
            "no usable eth interface with an IPv4 address".to_string(),
        ));
    }
    Ok(found)
}

pub fn classify(network: Ipv4Network) -> Interface {
    let addr = network.ip();
    if addr.octets()[0] == 192 {
        // Advertise the /24 containing the address, not the host address.
        let base = Ipv4Addr::from(u32::from(addr) & 0xffff_ff00);
        Interface::LocalPrefix {
            prefix: format!("{}/24", base),
        }
    } else {
        Interface::RouterLink {
            local_ip: addr,
            broadcast_ip: network.broadcast(),
        }
    }
}

pub fn router_links(interfaces: &[Interface]) -> Vec<(Ipv4Addr, Ipv4Addr)> {
    interfaces
        .iter()
        .filter_map(|iface| match iface {
            Interface::RouterLink {
                local_ip,
                broadcast_ip,
            } => Some((*local_ip, *broadcast_ip)),
            Interface::LocalPrefix { .. } => None,
        })
        .collect()
}

pub fn local_prefixes(interfaces: &[Interface]) -> Vec<String> {
    interfaces
        .iter()
        .filter_map(|iface| match iface {
            Interface::LocalPrefix { prefix } => Some(prefix.clone()),
            Interface::RouterLink { .. } => None,
        })
        .collect()
}
