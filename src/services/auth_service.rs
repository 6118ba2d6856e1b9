//! Lifecycle composition: signup, login, logout, change-password, and the
//! session authenticator that every protected operation goes through.

use sqlx::SqlitePool;

use crate::db::{revocation_repo, user_repo};
use crate::error::{AuthError, Result};
use crate::models::AuditAction;
use crate::security::jwt::{Claims, IssuedToken, TokenIssuer};
use crate::security::password;
use crate::services::audit;

#[derive(Clone)]
pub struct AuthService {
    db: SqlitePool,
    issuer: TokenIssuer,
}

impl AuthService {
    pub fn new(db: SqlitePool, issuer: TokenIssuer) -> Self {
        Self { db, issuer }
    }

    /// Verify an inbound bearer token and resolve it to its claims.
    ///
    /// Check order is fixed: structure, signature, and expiry first (all
    /// local), then the ledger lookup. A token that is both expired and
    /// revoked therefore surfaces as `TokenExpired`.
    pub async fn authenticate(&self, token: &str) -> Result<Claims> {
        let claims = self.issuer.verify(token)?;

        if revocation_repo::is_revoked(&self.db, &claims.jti).await? {
            return Err(AuthError::TokenRevoked);
        }

        Ok(claims)
    }

    /// Register a new identity. Duplicate emails are rejected atomically by
    /// the store's unique constraint.
    pub async fn signup(&self, email: &str, plaintext: &str, origin: Option<&str>) -> Result<i64> {
        let password_hash = password::hash_password(plaintext)?;
        let user = user_repo::create_user(&self.db, email, &password_hash).await?;

        audit::record(&self.db, Some(email), AuditAction::Signup, origin, None).await;
        tracing::info!(email, "user signed up");

        Ok(user.id)
    }

    /// Verify credentials and mint a token. Unknown email and wrong password
    /// both return the uniform `InvalidCredentials`.
    pub async fn login(
        &self,
        email: &str,
        plaintext: &str,
        origin: Option<&str>,
    ) -> Result<IssuedToken> {
        let user = user_repo::get_user_by_email(&self.db, email).await?;

        let verified = match &user {
            Some(user) => password::verify_password(plaintext, &user.password_hash),
            None => false,
        };

        if !verified {
            // identity is unresolved for a failed attempt; the attempted
            // email goes in the details column instead
            audit::record(
                &self.db,
                None,
                AuditAction::LoginFailed,
                origin,
                Some(&format!("failed login for {email}")),
            )
            .await;
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.issuer.issue(email)?;
        audit::record(&self.db, Some(email), AuditAction::Login, origin, None).await;
        tracing::info!(email, "user logged in");

        Ok(issued)
    }

    /// Revoke the presented token. Requires a currently-valid token: a
    /// malformed, expired, or already-revoked token fails with the same
    /// rejection `authenticate` produces.
    pub async fn logout(&self, token: &str, origin: Option<&str>) -> Result<()> {
        let claims = self.authenticate(token).await?;

        revocation_repo::revoke(&self.db, &claims.jti, claims.exp).await?;
        audit::record(&self.db, Some(&claims.sub), AuditAction::Logout, origin, None).await;
        tracing::info!(email = %claims.sub, "user logged out");

        Ok(())
    }

    /// Change the stored password. Identity is re-proven with the old
    /// plaintext password, not the token: a stolen bearer token alone cannot
    /// rotate credentials. If a bearer token accompanies the request it is
    /// revoked as well, using its real embedded expiry for the ledger entry.
    /// Other outstanding tokens for the identity are left untouched.
    pub async fn change_password(
        &self,
        email: &str,
        old_plaintext: &str,
        new_plaintext: &str,
        bearer: Option<&str>,
        origin: Option<&str>,
    ) -> Result<IssuedToken> {
        let user = match user_repo::get_user_by_email(&self.db, email).await? {
            Some(user) if password::verify_password(old_plaintext, &user.password_hash) => user,
            _ => return Err(AuthError::InvalidCredentials),
        };

        if let Some(token) = bearer {
            let claims = self.issuer.verify(token)?;
            revocation_repo::revoke(&self.db, &claims.jti, claims.exp).await?;
        }

        let password_hash = password::hash_password(new_plaintext)?;
        user_repo::update_password(&self.db, user.id, &password_hash).await?;

        let issued = self.issuer.issue(email)?;
        audit::record(
            &self.db,
            Some(email),
            AuditAction::ChangePassword,
            origin,
            None,
        )
        .await;
        tracing::info!(email, "password changed");

        Ok(issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{audit_repo, test_pool};

    const SECRET: &str = "an-adequately-long-signing-secret-for-tests";

    async fn service() -> AuthService {
        AuthService::new(test_pool().await, TokenIssuer::new(SECRET, 3600))
    }

    #[tokio::test]
    async fn signup_twice_rejects_the_second() {
        let svc = service().await;

        svc.signup("a@x.com", "pw1", None).await.unwrap();
        let err = svc.signup("a@x.com", "pw2", None).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn login_is_uniform_for_unknown_and_wrong() {
        let svc = service().await;
        svc.signup("a@x.com", "pw1", None).await.unwrap();

        let unknown = svc.login("b@x.com", "pw1", None).await.unwrap_err();
        let wrong = svc.login("a@x.com", "nope", None).await.unwrap_err();
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn issued_token_authenticates_until_logout() {
        let svc = service().await;
        svc.signup("a@x.com", "pw1", None).await.unwrap();

        let issued = svc.login("a@x.com", "pw1", None).await.unwrap();
        let claims = svc.authenticate(&issued.token).await.unwrap();
        assert_eq!(claims.sub, "a@x.com");

        svc.logout(&issued.token, None).await.unwrap();

        let err = svc.authenticate(&issued.token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRevoked));

        // logging out again with the revoked token fails the same way
        let err = svc.logout(&issued.token, None).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRevoked));
    }

    #[tokio::test]
    async fn expired_wins_over_revoked() {
        let svc = service().await;
        // same pool and secret, zero ttl: the token is expired on arrival
        let expired_issuer = TokenIssuer::new(SECRET, 0);
        let issued = expired_issuer.issue("a@x.com").unwrap();

        revocation_repo::revoke(&svc.db, &issued.claims.jti, issued.claims.exp)
            .await
            .unwrap();

        let err = svc.authenticate(&issued.token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn change_password_swaps_hash_and_revokes_presented_token() {
        let svc = service().await;
        svc.signup("a@x.com", "pw1", None).await.unwrap();
        let t1 = svc.login("a@x.com", "pw1", None).await.unwrap();

        let t2 = svc
            .change_password("a@x.com", "pw1", "pw2", Some(&t1.token), None)
            .await
            .unwrap();

        // the presented token is revoked; the fresh one is active
        let err = svc.authenticate(&t1.token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRevoked));
        assert!(svc.authenticate(&t2.token).await.is_ok());

        // old password no longer logs in, new one does
        let err = svc.login("a@x.com", "pw1", None).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        svc.login("a@x.com", "pw2", None).await.unwrap();
    }

    #[tokio::test]
    async fn change_password_without_bearer_revokes_nothing() {
        let svc = service().await;
        svc.signup("a@x.com", "pw1", None).await.unwrap();
        let t1 = svc.login("a@x.com", "pw1", None).await.unwrap();

        svc.change_password("a@x.com", "pw1", "pw2", None, None)
            .await
            .unwrap();

        // outstanding token is untouched (documented limitation)
        assert!(svc.authenticate(&t1.token).await.is_ok());
    }

    #[tokio::test]
    async fn change_password_wrong_old_password_changes_nothing() {
        let svc = service().await;
        svc.signup("a@x.com", "pw1", None).await.unwrap();

        let err = svc
            .change_password("a@x.com", "wrong", "pw2", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        svc.login("a@x.com", "pw1", None).await.unwrap();
    }

    #[tokio::test]
    async fn lifecycle_actions_reach_the_audit_trail() {
        let svc = service().await;
        svc.signup("a@x.com", "pw1", Some("127.0.0.1")).await.unwrap();
        let issued = svc.login("a@x.com", "pw1", Some("127.0.0.1")).await.unwrap();
        svc.change_password("a@x.com", "pw1", "pw2", None, Some("127.0.0.1"))
            .await
            .unwrap();
        svc.logout(&issued.token, Some("127.0.0.1")).await.unwrap();

        let logs = audit_repo::find_by_email(&svc.db, "a@x.com").await.unwrap();
        let actions: Vec<&str> = logs.iter().map(|l| l.action.as_str()).collect();
        assert_eq!(actions, ["SIGNUP", "LOGIN", "CHANGE_PASSWORD", "LOGOUT"]);
    }

    #[tokio::test]
    async fn failed_login_is_audited_without_identity() {
        let svc = service().await;

        let _ = svc.login("ghost@x.com", "pw", None).await;

        let logs = audit_repo::find_by_email(&svc.db, "ghost@x.com").await.unwrap();
        assert!(logs.is_empty(), "failed attempt must not resolve an identity");
    }

    #[tokio::test]
    async fn audit_outage_does_not_block_login() {
        let svc = service().await;
        svc.signup("a@x.com", "pw1", None).await.unwrap();

        sqlx::query("DROP TABLE audit_logs")
            .execute(&svc.db)
            .await
            .unwrap();

        // primary operation still succeeds
        let issued = svc.login("a@x.com", "pw1", None).await.unwrap();
        assert!(svc.authenticate(&issued.token).await.is_ok());
    }
}
