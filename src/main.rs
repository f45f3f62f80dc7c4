// src/main.rs

use employee_kpi::{build_router, config::Config, db, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();

    // Opened once, read-only, shared by every request
    let pool = db::connect(&config.database_url).await?;
    let state = AppState { pool };

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    info!(%addr, "KPI dashboard listening on http://127.0.0.1:{}", config.port);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
