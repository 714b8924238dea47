use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;

use scoreline_engine::api::{self, AppState};
use scoreline_engine::config::Config;
use scoreline_engine::reference::calibration;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let bounds = config.grid_bounds();
    let mut state = AppState::with_builtin_tables(bounds);

    if let Some(path) = &config.calibration_table {
        let table = calibration::load_table(path)?;
        info!(
            "Loaded {} calibration curve(s) from {}: {}",
            table.len(),
            path.display(),
            table.keys().join(", ")
        );
        state.calibration = Box::new(table);
    } else {
        info!("Using built-in calibration curves");
    }

    info!(
        "Scoreline grid: 0..={} home goals × 0..={} away goals",
        bounds.max_home_goals, bounds.max_away_goals
    );

    let app = api::router(state);
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
