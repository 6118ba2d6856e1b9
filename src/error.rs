use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("identity already exists")]
    DuplicateIdentity,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("malformed token")]
    TokenMalformed,

    #[error("token signature invalid")]
    TokenSignatureInvalid,

    #[error("token expired")]
    TokenExpired,

    #[error("token revoked")]
    TokenRevoked,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Stable machine-checkable kind, carried in every error response body.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::DuplicateIdentity => "duplicate_identity",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::TokenMalformed => "token_malformed",
            AuthError::TokenSignatureInvalid => "token_signature_invalid",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenRevoked => "token_revoked",
            AuthError::RateLimited => "rate_limited",
            AuthError::Config(_) => "configuration_error",
            AuthError::Database(_) => "database_error",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Generic human message. Credential and token failures share wording so
    /// the response never reveals which check rejected the request.
    fn public_message(&self) -> &'static str {
        match self {
            AuthError::DuplicateIdentity => "User already exists",
            AuthError::InvalidCredentials => "Invalid email or password",
            AuthError::TokenMalformed
            | AuthError::TokenSignatureInvalid
            | AuthError::TokenExpired
            | AuthError::TokenRevoked => "Could not validate credentials",
            AuthError::RateLimited => "Too many requests",
            AuthError::Config(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                "Internal server error"
            }
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::DuplicateIdentity => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::TokenMalformed
            | AuthError::TokenSignatureInvalid
            | AuthError::TokenExpired
            | AuthError::TokenRevoked => StatusCode::UNAUTHORIZED,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Config(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": self.public_message(),
        }))
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Database(err.to_string())
    }
}
