use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{AuthError, Result};
use crate::models::User;

/// Create a new user. A second signup for the same email trips the unique
/// constraint atomically with the insert and surfaces as `DuplicateIdentity`.
pub async fn create_user(pool: &SqlitePool, email: &str, password_hash: &str) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash, created_at)
        VALUES (?, ?, ?)
        RETURNING id, email, password_hash, created_at
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint") {
            AuthError::DuplicateIdentity
        } else {
            AuthError::Database(e.to_string())
        }
    })?;

    Ok(user)
}

/// Look up a user by email. Absence is not an error here; the service layer
/// folds it into the uniform credential rejection.
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password_hash, created_at FROM users WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Update a user's password hash
pub async fn update_password(pool: &SqlitePool, user_id: i64, password_hash: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users SET password_hash = ? WHERE id = ?
        "#,
    )
    .bind(password_hash)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let pool = test_pool().await;

        let user = create_user(&pool, "a@x.com", "hash-1").await.unwrap();
        assert_eq!(user.email, "a@x.com");

        let err = create_user(&pool, "a@x.com", "hash-2").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn lookup_and_password_update() {
        let pool = test_pool().await;

        assert!(get_user_by_email(&pool, "a@x.com").await.unwrap().is_none());

        let created = create_user(&pool, "a@x.com", "old-hash").await.unwrap();
        update_password(&pool, created.id, "new-hash").await.unwrap();

        let fetched = get_user_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.password_hash, "new-hash");
    }
}
