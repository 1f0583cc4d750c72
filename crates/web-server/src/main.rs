use api_client::YahooClient;
use configuration::load_config;
use engine::DashboardEngine;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use web_server::AppState;

// Entry point for `cargo run -p web-server`: serves live data with the
// settings from `config.toml`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config(&PathBuf::from("config.toml"))?;
    let source = YahooClient::new(&config.provider)?;
    let engine = DashboardEngine::new(Arc::new(source), config.technicals)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    web_server::run_server(addr, AppState::new(engine, config, None)).await
}
