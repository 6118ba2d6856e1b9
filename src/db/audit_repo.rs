use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::AuditLog;

/// Append one audit record. Callers go through `services::audit`, which
/// absorbs failures; this function itself reports them normally.
pub async fn append(
    pool: &SqlitePool,
    email: Option<&str>,
    action: &str,
    ip_address: Option<&str>,
    details: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (email, action, timestamp, ip_address, details)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(email)
    .bind(action)
    .bind(Utc::now())
    .bind(ip_address)
    .bind(details)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch all records for one identity, oldest first.
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Vec<AuditLog>> {
    let logs = sqlx::query_as::<_, AuditLog>(
        r#"
        SELECT id, email, action, timestamp, ip_address, details
        FROM audit_logs
        WHERE email = ?
        ORDER BY id
        "#,
    )
    .bind(email)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}
