//! Conversation directory operations, keyed by user ID.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Conversation, ConversationCategory};

const COLUMNS: &str =
    "id, user_id, title, human_override, category, alerts, start_date, latest_date";

/// Find the conversation belonging to a user.
pub async fn find_by_user_id(pool: &SqlitePool, user_id: &str) -> Result<Option<Conversation>> {
    let conversation = sqlx::query_as::<_, Conversation>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM conversations
        WHERE user_id = ?
        "#,
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(conversation)
}

/// Get a conversation by ID.
pub async fn get_conversation(pool: &SqlitePool, id: &str) -> Result<Conversation> {
    sqlx::query_as::<_, Conversation>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM conversations
        WHERE id = ?
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Conversation",
        id: id.to_string(),
    })
}

/// Create the conversation for a user.
///
/// The UNIQUE constraint on `user_id` guarantees at most one conversation
/// per user; a conflicting insert is folded into returning the existing row.
pub async fn insert_conversation(
    pool: &SqlitePool,
    user_id: &str,
    title: &str,
) -> Result<Conversation> {
    let id = Uuid::new_v4().to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO conversations (id, user_id, title)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(title)
    .execute(pool)
    .await;

    if let Err(e) = result {
        let unique = matches!(
            &e,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation()
        );
        if !unique {
            return Err(e.into());
        }
        tracing::debug!(user_id, "conversation already exists, returning existing row");
    }

    find_by_user_id(pool, user_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Conversation",
            id: user_id.to_string(),
        })
}

/// Update a conversation's title.
pub async fn update_title(pool: &SqlitePool, id: &str, title: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE conversations
        SET title = ?
        WHERE id = ?
        "#,
    )
    .bind(title)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Conversation",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Set the human-override flag on a conversation.
pub async fn update_human_override(pool: &SqlitePool, id: &str, value: bool) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE conversations
        SET human_override = ?
        WHERE id = ?
        "#,
    )
    .bind(value)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Conversation",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Update a conversation's category and alerts flag together.
pub async fn update_category_and_alerts(
    pool: &SqlitePool,
    id: &str,
    category: Option<ConversationCategory>,
    alerts: bool,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE conversations
        SET category = ?, alerts = ?
        WHERE id = ?
        "#,
    )
    .bind(category)
    .bind(alerts)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Conversation",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Bump a conversation's latest-activity timestamp.
pub async fn touch_latest_date(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE conversations
        SET latest_date = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// List all conversations, most recently active first.
pub async fn list_conversations(pool: &SqlitePool) -> Result<Vec<Conversation>> {
    let conversations = sqlx::query_as::<_, Conversation>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM conversations
        ORDER BY latest_date DESC
        "#,
    ))
    .fetch_all(pool)
    .await?;

    Ok(conversations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{user, Database};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_at_most_one_conversation_per_user() {
        let db = test_db().await;
        let user = user::insert_user(db.pool(), "+15550001", "Ana").await.unwrap();

        let first = insert_conversation(db.pool(), &user.id, "+15550001 - Ana")
            .await
            .unwrap();
        let second = insert_conversation(db.pool(), &user.id, "another title")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.title, "+15550001 - Ana");

        let all = list_conversations(db.pool()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_user_id_absent() {
        let db = test_db().await;
        let found = find_by_user_id(db.pool(), "no-such-user").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_update_title_and_human_override() {
        let db = test_db().await;
        let user = user::insert_user(db.pool(), "+15550001", "Ana").await.unwrap();
        let conv = insert_conversation(db.pool(), &user.id, "t").await.unwrap();

        update_title(db.pool(), &conv.id, "renamed").await.unwrap();
        update_human_override(db.pool(), &conv.id, true).await.unwrap();

        let fetched = get_conversation(db.pool(), &conv.id).await.unwrap();
        assert_eq!(fetched.title, "renamed");
        assert!(fetched.human_override);
    }

    #[tokio::test]
    async fn test_update_missing_conversation_is_not_found() {
        let db = test_db().await;
        let result = update_title(db.pool(), "no-such-id", "t").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_category_and_alerts() {
        let db = test_db().await;
        let user = user::insert_user(db.pool(), "+15550001", "Ana").await.unwrap();
        let conv = insert_conversation(db.pool(), &user.id, "t").await.unwrap();

        update_category_and_alerts(db.pool(), &conv.id, Some(ConversationCategory::Active), true)
            .await
            .unwrap();

        let fetched = get_conversation(db.pool(), &conv.id).await.unwrap();
        assert_eq!(fetched.category, Some(ConversationCategory::Active));
        assert!(fetched.alerts);
    }
}
