use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, error};

use crate::auth::{User, UserPatch};
use crate::error::{AppError, AuthError};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for email: {}", req.email);
    match state.dashboard.session.write().await.login(&req.email, &req.password) {
        Ok((user, token)) => Ok(HttpResponse::Ok().json(AuthResponse { token, user })),
        Err(e) => {
            error!("Login failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received registration request for email: {}", req.email);
    match state.dashboard.session.write().await.register(&req.email, &req.password, req.name.as_deref()) {
        Ok((user, token)) => Ok(HttpResponse::Created().json(AuthResponse { token, user })),
        Err(e) => {
            error!("Registration failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

pub async fn logout(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.dashboard.session.write().await.logout()?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "You've been logged out."
    })))
}

pub async fn me(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let snapshot = state.dashboard.session.write().await.load_user()?;
    Ok(HttpResponse::Ok().json(snapshot))
}

pub async fn update_me(
    req: web::Json<UserPatch>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let mut session = state.dashboard.session.write().await;
    session.require_user()?;

    let user = session
        .update_user(req.into_inner())?
        .ok_or(AuthError::NotLoggedIn)?;
    Ok(HttpResponse::Ok().json(user))
}
