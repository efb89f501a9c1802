//! Atomic message cascade.
//!
//! Performs find-or-create-user, find-or-create-conversation, and message
//! insert as a single transaction. This is the preferred path for end-user
//! ingestion: two concurrent first contacts from the same new phone number
//! cannot race into two users or two conversations, because the unique
//! constraints on `users.phone` and `conversations.user_id` are resolved
//! inside one transaction.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Conversation, User};

/// Identifiers produced by [`insert_message_cascade`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeResult {
    /// Inserted message.
    pub message_id: String,
    /// Conversation the message landed in.
    pub conversation_id: String,
    /// Resolved or created user.
    pub user_id: String,
    /// Timestamp the message was recorded with.
    pub sent_at: String,
    /// Whether the user was created by this call.
    pub created_user: bool,
}

/// Insert an end-user message, creating the user and conversation if needed,
/// all within one transaction.
///
/// `name` is only used when the user does not exist yet; empty names fall
/// back to a placeholder.
pub async fn insert_message_cascade(
    pool: &SqlitePool,
    phone: &str,
    name: &str,
    content: &str,
) -> Result<CascadeResult> {
    let mut tx = pool.begin().await?;

    // 1) Find or create the user. ON CONFLICT DO NOTHING keeps the insert
    //    harmless when the row already exists.
    let name = if name.is_empty() { "No name" } else { name };
    let user_insert = sqlx::query(
        r#"
        INSERT INTO users (id, phone, name)
        VALUES (?, ?, ?)
        ON CONFLICT(phone) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(phone)
    .bind(name)
    .execute(&mut *tx)
    .await?;

    let created_user = user_insert.rows_affected() > 0;

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, phone, name, created_at
        FROM users
        WHERE phone = ?
        "#,
    )
    .bind(phone)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: phone.to_string(),
    })?;

    // 2) Find or create the conversation keyed by user id.
    sqlx::query(
        r#"
        INSERT INTO conversations (id, user_id, title)
        VALUES (?, ?, ?)
        ON CONFLICT(user_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&user.id)
    .bind(format!("{} - {}", user.phone, user.name))
    .execute(&mut *tx)
    .await?;

    let conversation = sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, user_id, title, human_override, category, alerts, start_date, latest_date
        FROM conversations
        WHERE user_id = ?
        "#,
    )
    .bind(&user.id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Conversation",
        id: user.id.clone(),
    })?;

    // 3) Insert the message and bump the conversation's activity timestamp.
    let message_id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO messages (id, conversation_id, content, sender)
        VALUES (?, ?, ?, 'user')
        "#,
    )
    .bind(&message_id)
    .bind(&conversation.id)
    .bind(content)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE conversations
        SET latest_date = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&conversation.id)
    .execute(&mut *tx)
    .await?;

    let sent_at = sqlx::query_scalar::<_, String>(
        r#"
        SELECT sent_at FROM messages WHERE id = ?
        "#,
    )
    .bind(&message_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        phone,
        user_id = %user.id,
        conversation_id = %conversation.id,
        created_user,
        "message cascade committed"
    );

    Ok(CascadeResult {
        message_id,
        conversation_id: conversation.id,
        user_id: user.id,
        sent_at,
        created_user,
    })
}
