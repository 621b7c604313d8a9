// Startup wiring

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::Mutex;

use crate::config::DaemonConfig;
use crate::cost::CostOracle;
use crate::interfaces::Interface;
use crate::{AppState, RouterState};

pub fn init_logging_and_env() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}

/// Binds the control-plane receiver socket. Broadcast is enabled so the
/// same socket can answer on broadcast-facing links.
pub async fn init_socket(port: u16) -> crate::error::Result<Arc<UdpSocket>> {
    let socket = Arc::new(UdpSocket::bind(format!("0.0.0.0:{}", port)).await?);
    socket.set_broadcast(true)?;
    Ok(socket)
}

pub fn init_state(
    router_id: String,
    config: DaemonConfig,
    interfaces: Vec<Interface>,
    costs: CostOracle,
) -> Arc<AppState> {
    Arc::new(AppState {
        router_id,
        config,
        interfaces,
        costs,
        router: Mutex::new(RouterState::default()),
        lsa_started: AtomicBool::new(false),
    })
}
