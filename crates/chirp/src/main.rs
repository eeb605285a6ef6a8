use anyhow::Context;
use chirp::settings;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let settings = settings::load_settings().context("Failed to load settings")?;
    chirp::init_tracing(&settings);
    let port = settings.port.unwrap_or(3000);

    if !settings.is_prod() {
        debug!("Running in DEV environment");
    }

    let app = chirp::setup_router(&settings).await?;
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }

    Ok(())
}
