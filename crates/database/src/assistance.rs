//! Assistance tracker operations.
//!
//! An assistance record flags a conversation as needing human attention.
//! Enabling human override on the conversation resolves the latest open
//! record.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::Assistance;

/// Raise a needs-human flag against a conversation.
pub async fn insert_assistance(
    pool: &SqlitePool,
    conversation_id: &str,
    reason: Option<&str>,
) -> Result<Assistance> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO conversation_assistances (id, conversation_id, needs_human, reason)
        VALUES (?, ?, 1, ?)
        "#,
    )
    .bind(&id)
    .bind(conversation_id)
    .bind(reason)
    .execute(pool)
    .await?;

    get_assistance(pool, &id).await
}

/// Get an assistance record by ID.
pub async fn get_assistance(pool: &SqlitePool, id: &str) -> Result<Assistance> {
    sqlx::query_as::<_, Assistance>(
        r#"
        SELECT id, conversation_id, needs_human, reason, created_at, resolved_at
        FROM conversation_assistances
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Assistance",
        id: id.to_string(),
    })
}

/// Find the latest open assistance record for a conversation, if any.
pub async fn find_open_by_conversation_id(
    pool: &SqlitePool,
    conversation_id: &str,
) -> Result<Option<Assistance>> {
    let assistance = sqlx::query_as::<_, Assistance>(
        r#"
        SELECT id, conversation_id, needs_human, reason, created_at, resolved_at
        FROM conversation_assistances
        WHERE conversation_id = ? AND needs_human = 1
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(conversation_id)
    .fetch_optional(pool)
    .await?;

    Ok(assistance)
}

/// Resolve an assistance record: clear the needs-human flag and stamp the
/// resolution time.
///
/// Returns whether a row was updated.
pub async fn resolve_assistance(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE conversation_assistances
        SET needs_human = 0, resolved_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
