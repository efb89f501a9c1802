//! Helpline API server.

use database::Database;
use ingest::Ingestor;
use media_store::FsMediaStore;
use tracing::info;

use api::config::Config;
use api::routes;
use api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting Helpline API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Build the ingestor over the shared handles
    let media = FsMediaStore::new(&config.media_root);
    let ingestor = Ingestor::new(db.clone(), media);

    // Build application state
    let state = AppState::new(db, ingestor);

    // Build router
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %config.addr, "Helpline API listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
