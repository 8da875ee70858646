use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod config;
mod error;
mod handlers;
mod importer;
mod merge;
mod models;
mod store;
mod youtube;

use config::Config;
use models::AppState;
use store::ManualStore;
use youtube::YouTubeClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local development; no-op when absent
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("video_dashboard_backend=debug,tower_http=debug")
        .init();

    // Load configuration; missing credentials abort startup
    let config = Config::load()?;

    // Connect storage and make sure the manual table exists
    let store = ManualStore::connect(&config.database_url).await?;
    store.init_schema().await?;

    let youtube = YouTubeClient::new(
        config.youtube_api_key.clone(),
        Duration::from_secs(config.http_timeout_secs),
    )?;

    let state = Arc::new(AppState {
        config: config.clone(),
        youtube,
        store,
    });

    let app = handlers::router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    info!("🚀 Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("{}", "=".repeat(60));
    println!("✅ Video dashboard backend running on http://localhost:{}", config.port);
    println!("{}", "=".repeat(60));
    println!("📊 Configuration:");
    println!("   Database: {}", config.database_url);
    println!("   Static Dir: {:?}", config.static_dir);
    println!("   HTTP timeout: {}s", config.http_timeout_secs);
    println!(
        "   Max upload size: {} MB",
        config.max_upload_size / 1024 / 1024
    );
    println!("{}", "=".repeat(60));

    info!("✅ Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
