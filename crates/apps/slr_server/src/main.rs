use std::time::Duration;

use clap::Parser;
use slr_server::config::ServerArgs;
use slr_server::overlay::{http_client, load_florida_overlay};
use slr_server::routes::{router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = ServerArgs::parse();
    let client = http_client(Duration::from_secs(args.fetch_timeout_secs))?;

    // Fetched once per start; clients re-read the cached copy.
    let overlay = load_florida_overlay(&client, args.overlay_url.as_deref()).await;
    let app = router(AppState::new(&overlay)?);

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!(
        overlay_features = overlay.len(),
        "sea-level server listening on http://{}", args.addr
    );
    axum::serve(listener, app).await?;
    Ok(())
}
