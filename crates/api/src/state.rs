//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use ingest::Ingestor;
use media_store::FsMediaStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Message ingestion orchestrator.
    pub ingestor: Arc<Ingestor<FsMediaStore>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, ingestor: Ingestor<FsMediaStore>) -> Self {
        Self {
            db,
            ingestor: Arc::new(ingestor),
        }
    }
}
