use store_server::{Config, Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // dotenv must run before the config is read
    dotenv::dotenv().ok();
    let config = Config::from_env();

    setup_environment(&config)?;

    tracing::info!(
        work_dir = %config.work_dir,
        port = config.http_port,
        "Store server starting"
    );

    let state = ServerState::initialize(&config)?;
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
