// src/bin/kpi_report.rs

use anyhow::Context;
use employee_kpi::{aggregate::compute_views, config::Config, db, report};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env();

    let pool = db::connect(&config.database_url).await?;
    let dataset = db::load_dataset(&pool)
        .await
        .context("failed to load employee KPI data")?;
    pool.close().await;

    let views = compute_views(&dataset.rows);
    println!("{}", report::render_summary(&dataset, &views));

    let emitter = report::ReportEmitter::new(&config.output_dir);
    let written = emitter
        .emit(&views)
        .with_context(|| format!("failed to write report to {}", config.output_dir.display()))?;
    for path in &written {
        info!(path = %path.display(), "wrote");
    }

    println!("Saved CSVs and PNGs to {}/ directory.", emitter.output_dir().display());
    Ok(())
}
