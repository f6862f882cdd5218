//! Authentication Handlers
//!
//! Single-administrator login: credentials come from the environment,
//! a successful login returns a bearer JWT.

use std::time::Duration;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::AppError;
use crate::auth;
use crate::core::ServerState;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    // Fixed delay before any verdict (uniform for all failure modes)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let Some(hash) = state.config.admin_password_hash.clone() else {
        tracing::warn!("Login attempted but ADMIN_PASSWORD_HASH is not configured");
        return Err(AppError::unauthorized());
    };

    let username_ok = req.username == state.config.admin_username;

    // Always run the verifier so the reply time does not leak which
    // field was wrong
    let password_ok = auth::verify_password(&hash, &req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;

    if !username_ok || !password_ok {
        tracing::warn!(username = %req.username, "Login failed - invalid credentials");
        return Err(AppError::validation("Invalid username or password"));
    }

    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token("admin", &req.username)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(username = %req.username, "Administrator logged in");

    Ok(Json(LoginResponse {
        token,
        username: req.username,
    }))
}
