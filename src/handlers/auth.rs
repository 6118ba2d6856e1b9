/// HTTP handlers for the credential endpoints
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::{
    error::AuthError,
    models::user::{ChangePasswordRequest, LoginRequest, SignupRequest},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChangePasswordResponse {
    pub message: String,
    pub access_token: String,
    pub token_type: String,
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn origin_address(req: &HttpRequest) -> Option<String> {
    req.connection_info()
        .realip_remote_addr()
        .map(str::to_string)
}

pub async fn signup(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse, AuthError> {
    let origin = origin_address(&req);
    let user_id = state
        .auth
        .signup(&payload.email, &payload.password, origin.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(SignupResponse {
        message: "Signup successful".to_string(),
        user_id,
    }))
}

pub async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    let origin = origin_address(&req);
    let issued = state
        .auth
        .login(&payload.email, &payload.password, origin.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token: issued.token,
        token_type: "bearer".to_string(),
    }))
}

pub async fn logout(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AuthError> {
    let token = bearer_token(&req).ok_or(AuthError::TokenMalformed)?;
    let origin = origin_address(&req);

    state.auth.logout(token, origin.as_deref()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

pub async fn change_password(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AuthError> {
    let bearer = bearer_token(&req);
    let origin = origin_address(&req);

    let issued = state
        .auth
        .change_password(
            &payload.email,
            &payload.old_password,
            &payload.new_password,
            bearer,
            origin.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ChangePasswordResponse {
        message: "Password changed successfully".to_string(),
        access_token: issued.token,
        token_type: "bearer".to_string(),
    }))
}
