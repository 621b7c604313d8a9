use log::info;

use linkstate_routing::cost::CostOracle;
use linkstate_routing::{config, init, interfaces, packet_loop, tasks};

#[tokio::main]
async fn main() -> linkstate_routing::Result<()> {
    init::init_logging_and_env();

    let router_id = config::router_id_from_env()?;
    let daemon_config = config::load()?;
    let inventory = interfaces::discover()?;
    let costs = CostOracle::from_env(&router_id);
    info!(
        "[INIT] router {} up: {} interfaces, {} configured link costs, port {}",
        router_id,
        inventory.len(),
        costs.len(),
        daemon_config.port
    );

    let state = init::init_state(router_id, daemon_config, inventory, costs);
    let socket = init::init_socket(state.config.port).await?;

    tasks::spawn_hello_tasks(&state);
    packet_loop::main_loop(socket, state).await
}
