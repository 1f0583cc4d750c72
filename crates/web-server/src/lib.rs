use axum::{routing::get, Router};
use chrono::NaiveDate;
use configuration::Config;
use engine::DashboardEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub engine: DashboardEngine,
    pub config: Config,
    /// Fixed end date of every window; `None` means today (UTC).
    as_of: Option<NaiveDate>,
}

impl AppState {
    pub fn new(engine: DashboardEngine, config: Config, as_of: Option<NaiveDate>) -> Self {
        Self {
            engine,
            config,
            as_of,
        }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }
}

/// Builds the application routes around the given state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/assets", get(handlers::get_assets))
        .route("/api/snapshot", get(handlers::get_snapshot))
        .with_state(state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Serves the dashboard API until the process is stopped.
///
/// Tracing is initialized by the caller.
pub async fn run_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
