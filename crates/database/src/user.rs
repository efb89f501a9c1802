//! User directory operations, keyed by phone number.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::User;

/// Find a user by phone number.
pub async fn find_by_phone(pool: &SqlitePool, phone: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, phone, name, created_at
        FROM users
        WHERE phone = ?
        "#,
    )
    .bind(phone)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Find a user by ID.
pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, phone, name, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Create a new user.
///
/// A duplicate-phone insert is folded into returning the existing row, so
/// two concurrent first contacts from the same phone cannot produce two
/// users.
pub async fn insert_user(pool: &SqlitePool, phone: &str, name: &str) -> Result<User> {
    let id = Uuid::new_v4().to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO users (id, phone, name)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(phone)
    .bind(name)
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
        tracing::debug!(phone, "duplicate phone, returning existing user");
    }

    find_by_phone(pool, phone)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "User",
            id: phone.to_string(),
        })
}

/// List all users, most recent first.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, phone, name, created_at
        FROM users
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_insert_and_find_by_phone() {
        let db = test_db().await;

        let user = insert_user(db.pool(), "+15550001", "Ana").await.unwrap();
        assert_eq!(user.name, "Ana");

        let found = find_by_phone(db.pool(), "+15550001").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);

        let missing = find_by_phone(db.pool(), "+19990000").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_phone_returns_existing_row() {
        let db = test_db().await;

        let first = insert_user(db.pool(), "+15550001", "Ana").await.unwrap();
        let second = insert_user(db.pool(), "+15550001", "Someone Else").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Ana");

        let users = list_users(db.pool()).await.unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let db = test_db().await;

        let user = insert_user(db.pool(), "+15550001", "Ana").await.unwrap();
        let found = find_by_id(db.pool(), &user.id).await.unwrap().unwrap();
        assert_eq!(found.phone, "+15550001");
    }
}
