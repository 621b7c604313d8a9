// Kernel route installation from the derived next-hop table

use std::net::{IpAddr, Ipv4Addr};

use log::{debug, info, warn};
use net_route::{Handle, Route};
use pnet::ipnetwork::Ipv4Network;

use crate::error::{AppError, Result};
use crate::RouterState;

/// One kernel route to install: an advertised prefix reached via the first
/// hop's learned IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub prefix: String,
    pub gateway: Ipv4Addr,
}

/// Builds the installation batch from the next-hop table. Runs under the
/// daemon lock; the returned snapshot is installed outside it. Destinations
/// whose first hop has no confirmed adjacency yet are skipped.
pub fn plan_routes(state: &RouterState) -> Vec<RouteSpec> {
    let mut batch = Vec::new();
    for (destination, first_hop) in &state.next_hop {
        let Some(gateway) = state.recognized_ip.get(first_hop) else {
            debug!(
                "[ROUTE] skipping {} via {}: gateway not recognized yet",
                destination, first_hop
            );
            continue;
        };
        for prefix in state.lsdb.addresses(destination) {
            batch.push(RouteSpec {
                prefix: prefix.clone(),
                gateway: *gateway,
            });
        }
    }
    batch
}

/// Installs a batch. Per-prefix failures are logged and never abort the
/// batch; the next LSDB change will retry.
pub async fn install_routes(batch: &[RouteSpec]) {
    if batch.is_empty() {
        return;
    }
    let handle = match Handle::new() {
        Ok(handle) => handle,
        Err(e) => {
            warn!("[ROUTE] cannot open routing handle (permissions?): {}", e);
            return;
        }
    };
    for spec in batch {
        if let Err(e) = replace_route(&handle, spec).await {
            warn!("[ROUTE] failed to install {} via {}: {}", spec.prefix, spec.gateway, e);
        }
    }
}

/// `ip route replace` semantics: add, and when the entry already exists,
/// delete it and add again.
async fn replace_route(handle: &Handle, spec: &RouteSpec) -> Result<()> {
    let network: Ipv4Network = spec
        .prefix
        .parse()
        .map_err(|e| AppError::RouteError(format!("invalid prefix {}: {}", spec.prefix, e)))?;
    let route = Route::new(IpAddr::V4(network.network()), network.prefix())
        .with_gateway(IpAddr::V4(spec.gateway));
    match handle.add(&route).await {
        Ok(()) => {
            info!("[ROUTE] {} via {}", spec.prefix, spec.gateway);
            Ok(())
        }
        Err(_) => {
            let _ = handle.delete(&route).await;
            handle.add(&route).await.map_err(|e| {
                AppError::RouteError(format!("replace of {} failed: {}", spec.prefix, e))
            })?;
            info!("[ROUTE] replaced {} via {}", spec.prefix, spec.gateway);
            Ok(())
        }
    }
}
