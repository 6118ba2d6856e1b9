//! Best-effort audit recording.
//!
//! Audit appends are a side effect of lifecycle operations, never part of
//! their outcome: a failure here is logged and swallowed so it cannot abort
//! or roll back the operation that triggered it.

use sqlx::SqlitePool;

use crate::db::audit_repo;
use crate::models::AuditAction;

pub async fn record(
    pool: &SqlitePool,
    email: Option<&str>,
    action: AuditAction,
    ip_address: Option<&str>,
    details: Option<&str>,
) {
    if let Err(e) = audit_repo::append(pool, email, action.as_str(), ip_address, details).await {
        tracing::warn!(action = action.as_str(), "failed to append audit record: {}", e);
    }
}
