use std::net::SocketAddr;

use fleet_catalog_backend::{api, config::AppConfig, database::Database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();
    let config = AppConfig::from_env();

    // Initialize database
    let database = Database::connect(&config.database_url).await?;

    let state = api::AppState::new(config.clone(), database);

    // 占位图缺失时生成
    let placeholder = state.storage().ensure_placeholder().await?;
    tracing::info!("Storage ready at {} (placeholder: {})", config.storage_dir.display(), placeholder.display());

    let app = api::router(state);

    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("🚀 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
