//! Attachment metadata operations.
//!
//! Rows here only describe files already persisted to content storage; the
//! bytes themselves live in the media store.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::Attachment;

/// Fields for a new attachment record.
#[derive(Debug, Clone, Copy)]
pub struct NewAttachment<'a> {
    /// Message the file belongs to.
    pub message_id: &'a str,
    /// Path within content storage.
    pub file_path: &'a str,
    /// MIME type of the stored file.
    pub mime_type: &'a str,
    /// Media category ("image", "audio", "video" or "file").
    pub category: &'a str,
    /// Original file name as uploaded.
    pub file_name: &'a str,
}

/// Insert attachment metadata for an already-uploaded file.
pub async fn insert_attachment(
    pool: &SqlitePool,
    attachment: NewAttachment<'_>,
) -> Result<Attachment> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO message_attachments (id, message_id, file_path, mime_type, category, file_name)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(attachment.message_id)
    .bind(attachment.file_path)
    .bind(attachment.mime_type)
    .bind(attachment.category)
    .bind(attachment.file_name)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, Attachment>(
        r#"
        SELECT id, message_id, file_path, mime_type, category, file_name, created_at
        FROM message_attachments
        WHERE id = ?
        "#,
    )
    .bind(&id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Attachment",
        id,
    })
}

/// List attachments for a message, oldest first.
pub async fn find_by_message_id(pool: &SqlitePool, message_id: &str) -> Result<Vec<Attachment>> {
    let attachments = sqlx::query_as::<_, Attachment>(
        r#"
        SELECT id, message_id, file_path, mime_type, category, file_name, created_at
        FROM message_attachments
        WHERE message_id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(message_id)
    .fetch_all(pool)
    .await?;

    Ok(attachments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;
    use crate::{conversation, message, user, Database};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_insert_and_find_by_message_id() {
        let db = test_db().await;
        let user = user::insert_user(db.pool(), "+15550001", "Ana").await.unwrap();
        let conv = conversation::insert_conversation(db.pool(), &user.id, "t")
            .await
            .unwrap();
        let msg = message::insert_message(db.pool(), &conv.id, "", Sender::User)
            .await
            .unwrap();

        let inserted = insert_attachment(
            db.pool(),
            NewAttachment {
                message_id: &msg.id,
                file_path: "audios/456_note.ogg",
                mime_type: "audio/ogg",
                category: "audio",
                file_name: "note.ogg",
            },
        )
        .await
        .unwrap();
        assert_eq!(inserted.message_id, msg.id);
        assert_eq!(inserted.category, "audio");

        let attachments = find_by_message_id(db.pool(), &msg.id).await.unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].id, inserted.id);
    }

    #[tokio::test]
    async fn test_attachments_deleted_with_message() {
        let db = test_db().await;
        let user = user::insert_user(db.pool(), "+15550001", "Ana").await.unwrap();
        let conv = conversation::insert_conversation(db.pool(), &user.id, "t")
            .await
            .unwrap();
        let msg = message::insert_message(db.pool(), &conv.id, "", Sender::User)
            .await
            .unwrap();

        insert_attachment(
            db.pool(),
            NewAttachment {
                message_id: &msg.id,
                file_path: "files/789_doc.pdf",
                mime_type: "application/pdf",
                category: "file",
                file_name: "doc.pdf",
            },
        )
        .await
        .unwrap();

        message::delete_by_id(db.pool(), &msg.id).await.unwrap();

        let attachments = find_by_message_id(db.pool(), &msg.id).await.unwrap();
        assert!(attachments.is_empty());
    }
}
