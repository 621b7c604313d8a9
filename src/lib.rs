// Link-state routing daemon: HELLO-based adjacency formation, LSA flooding
// with monotonic sequence numbers, Dijkstra SPF, kernel route installation.

use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;
use std::sync::atomic::AtomicBool;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

pub mod config;
pub mod cost;
pub mod dijkstra;
pub mod error;
pub mod hello;
pub mod init;
pub mod interfaces;
pub mod lsa;
pub mod lsdb;
pub mod neighbor;
pub mod packet_loop;
pub mod routes;
pub mod tasks;
pub mod types;

pub use error::{AppError, Result};

/// Mutable protocol state, guarded by the single daemon mutex. Neighbor
/// tables and the LSDB only grow; there is no aging in this design.
#[derive(Debug, Default)]
pub struct RouterState {
    /// Cost to each neighbor a HELLO has been received from.
    pub detected_cost: HashMap<String, i32>,
    /// Link IP of each neighbor whose HELLO listed us in return. Only these
    /// adjacencies carry LSAs and resolve next hops.
    pub recognized_ip: HashMap<String, Ipv4Addr>,
    pub lsdb: lsdb::Lsdb,
    /// destination router id -> first hop router id, derived from the LSDB.
    pub next_hop: BTreeMap<String, String>,
}

impl RouterState {
    /// SPF plus next-hop derivation; called under the lock together with
    /// the LSDB update that made it necessary.
    pub fn recompute_routes(&mut self, local_id: &str) {
        let spf = dijkstra::shortest_paths(&self.lsdb, local_id);
        self.next_hop = dijkstra::next_hops(&spf, local_id);
    }
}

/// Process-wide daemon context shared by every task.
pub struct AppState {
    pub router_id: String,
    pub config: config::DaemonConfig,
    /// Inventory taken once at startup; immutable afterwards.
    pub interfaces: Vec<interfaces::Interface>,
    pub costs: cost::CostOracle,
    pub router: Mutex<RouterState>,
    /// Set by the first confirmed adjacency; keeps the LSA emitter a
    /// one-shot.
    pub lsa_started: AtomicBool,
}

/// Seconds since the Unix epoch, as carried in packet timestamps.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
