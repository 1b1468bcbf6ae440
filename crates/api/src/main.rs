use anyhow::Result;
use tracing::info;

use prodesk_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging and metrics
    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting Prodesk API v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let pool = persistence::db::create_pool(&(&config.database).into()).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool)?;

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
