//! SQLite persistence layer for Helpline.
//!
//! This crate provides async database operations for users, conversations,
//! messages, attachments, and assistance records using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{user, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:helpline.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Find or create a user by phone
//!     let user = user::insert_user(db.pool(), "+15550001", "Ana").await?;
//!     println!("user id: {}", user.id);
//!
//!     Ok(())
//! }
//! ```

pub mod assistance;
pub mod attachment;
pub mod cascade;
pub mod conversation;
pub mod error;
pub mod message;
pub mod models;
pub mod user;

pub use cascade::CascadeResult;
pub use error::{DatabaseError, Result};
pub use models::{
    Assistance, Attachment, Conversation, ConversationCategory, Message,
    MessageWithAttachments, Sender, User,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

pub use sqlx::SqlitePool;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Set high enough to handle concurrent message ingestion.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/helpline.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_user_conversation_message_flow() {
        let db = test_db().await;

        let user = user::insert_user(db.pool(), "+15550001", "Ana").await.unwrap();
        assert_eq!(user.phone, "+15550001");

        let conv = conversation::insert_conversation(db.pool(), &user.id, "+15550001 - Ana")
            .await
            .unwrap();
        assert_eq!(conv.user_id, user.id);

        let msg = message::insert_message(db.pool(), &conv.id, "Hello", Sender::User)
            .await
            .unwrap();
        assert_eq!(msg.content, "Hello");

        let messages = message::find_by_conversation_id(db.pool(), &conv.id)
            .await
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].attachments.is_empty());
    }
}
