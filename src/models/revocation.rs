/// Revocation ledger entry for an invalidated token
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One revoked token, keyed by its `jti`. Entries are inserted once and
/// never updated; they only leave the ledger through expiry-based cleanup.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RevokedToken {
    pub jti: String,
    /// Epoch seconds at which the token was revoked
    pub revoked_at: i64,
    /// The token's original embedded expiry, epoch seconds
    pub expires_at: i64,
}

impl RevokedToken {
    /// Whether the underlying token has passed its natural expiry, making
    /// this entry eligible for cleanup.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now().timestamp()
    }
}
