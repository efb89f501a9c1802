//! Message store operations.

use std::collections::HashMap;

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Attachment, Message, MessageWithAttachments, Sender};

/// Insert a message into a conversation and bump its latest-activity
/// timestamp.
pub async fn insert_message(
    pool: &SqlitePool,
    conversation_id: &str,
    content: &str,
    sender: Sender,
) -> Result<Message> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO messages (id, conversation_id, content, sender)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(conversation_id)
    .bind(content)
    .bind(sender)
    .execute(pool)
    .await?;

    crate::conversation::touch_latest_date(pool, conversation_id).await?;

    get_message(pool, &id).await
}

/// Get a message by ID.
pub async fn get_message(pool: &SqlitePool, id: &str) -> Result<Message> {
    sqlx::query_as::<_, Message>(
        r#"
        SELECT id, conversation_id, content, sender, sent_at
        FROM messages
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Message",
        id: id.to_string(),
    })
}

/// Delete a message by ID.
///
/// Idempotent: deleting a message that does not exist is not an error, so
/// compensation after a failed attachment upload can always run.
pub async fn delete_by_id(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM messages
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// List a conversation's messages oldest-first, each annotated with its
/// attachments.
pub async fn find_by_conversation_id(
    pool: &SqlitePool,
    conversation_id: &str,
) -> Result<Vec<MessageWithAttachments>> {
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, conversation_id, content, sender, sent_at
        FROM messages
        WHERE conversation_id = ?
        ORDER BY sent_at ASC, rowid ASC
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    let attachments = sqlx::query_as::<_, Attachment>(
        r#"
        SELECT a.id, a.message_id, a.file_path, a.mime_type, a.category, a.file_name, a.created_at
        FROM message_attachments a
        INNER JOIN messages m ON m.id = a.message_id
        WHERE m.conversation_id = ?
        ORDER BY a.created_at ASC
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    let mut by_message: HashMap<String, Vec<Attachment>> = HashMap::new();
    for attachment in attachments {
        by_message
            .entry(attachment.message_id.clone())
            .or_default()
            .push(attachment);
    }

    Ok(messages
        .into_iter()
        .map(|message| {
            let attachments = by_message.remove(&message.id).unwrap_or_default();
            MessageWithAttachments {
                message,
                attachments,
            }
        })
        .collect())
}
