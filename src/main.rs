use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use ops_dashboard::{
    build_router,
    config::{get_config, init_config},
    middleware::cors::dashboard_cors,
    AppState,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    init_config()?;
    let config = get_config();

    let app_state = AppState::new(config)?;
    info!(
        backend = %app_state.backend_url,
        timezone = %config.timezone,
        layout = %config.calendar_layout,
        "Dashboard gateway configured"
    );

    {
        let wizards = app_state.wizard_service.clone();
        tokio::spawn(async move {
            let mut sweep = tokio::time::interval(Duration::from_secs(60));
            loop {
                sweep.tick().await;
                wizards.evict_stale();
            }
        });
    }

    let app = build_router(app_state)
        .layer(dashboard_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
