//! Revocation ledger operations.
//!
//! The ledger is an append-only set of revoked `jti`s persisted in the
//! database so a revoked token stays rejected across restarts, until its
//! natural expiry.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::RevokedToken;

/// Record a token as revoked. Idempotent: the insert-if-absent is atomic,
/// so concurrent duplicate revocations of the same token are a no-op.
pub async fn revoke(pool: &SqlitePool, jti: &str, expires_at: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO revoked_tokens (jti, revoked_at, expires_at)
        VALUES (?, ?, ?)
        ON CONFLICT (jti) DO NOTHING
        "#,
    )
    .bind(jti)
    .bind(Utc::now().timestamp())
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Check whether a token's `jti` is in the ledger. Presence alone marks the
/// token invalid; expiry of the entry is the cleanup job's concern.
pub async fn is_revoked(pool: &SqlitePool, jti: &str) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = ?)
        "#,
    )
    .bind(jti)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Fetch a ledger entry by `jti`.
pub async fn get(pool: &SqlitePool, jti: &str) -> Result<Option<RevokedToken>> {
    let entry = sqlx::query_as::<_, RevokedToken>(
        r#"
        SELECT jti, revoked_at, expires_at FROM revoked_tokens WHERE jti = ?
        "#,
    )
    .bind(jti)
    .fetch_optional(pool)
    .await?;

    Ok(entry)
}

/// Delete entries whose recorded expiry has passed (maintenance operation;
/// an expired token is already rejected by the expiry check).
pub async fn cleanup_expired(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM revoked_tokens WHERE expires_at <= ?
        "#,
    )
    .bind(Utc::now().timestamp())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Count of entries still covering unexpired tokens.
pub async fn count_active(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM revoked_tokens WHERE expires_at > ?
        "#,
    )
    .bind(Utc::now().timestamp())
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let pool = test_pool().await;
        let exp = Utc::now().timestamp() + 3600;

        assert!(!is_revoked(&pool, "jti-1").await.unwrap());

        revoke(&pool, "jti-1", exp).await.unwrap();
        assert!(is_revoked(&pool, "jti-1").await.unwrap());

        // second call is a no-op, not an error, and does not touch the entry
        let first = get(&pool, "jti-1").await.unwrap().unwrap();
        revoke(&pool, "jti-1", exp + 999).await.unwrap();
        let second = get(&pool, "jti-1").await.unwrap().unwrap();
        assert_eq!(first.revoked_at, second.revoked_at);
        assert_eq!(second.expires_at, exp);
        assert!(!second.is_expired());
        assert_eq!(count_active(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn cleanup_removes_only_expired_entries() {
        let pool = test_pool().await;
        let now = Utc::now().timestamp();

        revoke(&pool, "expired", now - 10).await.unwrap();
        revoke(&pool, "live", now + 3600).await.unwrap();

        let removed = cleanup_expired(&pool).await.unwrap();
        assert_eq!(removed, 1);
        assert!(!is_revoked(&pool, "expired").await.unwrap());
        assert!(is_revoked(&pool, "live").await.unwrap());
    }
}
