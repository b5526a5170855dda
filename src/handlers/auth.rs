use crate::auth::authenticate_user;
use crate::error::{AppError, AppResult};
use crate::models::{DebugLoginResponse, LoginRequest, LoginResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use tracing::{info, warn};

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    info!("Login attempt for user: {}", request.username);

    if !authenticate_user(&request.username, &request.password) {
        warn!("Failed login attempt for user: {}", request.username);
        return Err(AppError::InvalidCredentials);
    }

    let access_token = state.tokens.issue(&request.username)?;
    info!("Successful login for user: {}", request.username);

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Same credential check as `login`, but failures are reported in the body.
pub async fn debug_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<DebugLoginResponse>> {
    info!(
        "Debug login attempt - Username: '{}', Password length: {}",
        request.username,
        request.password.len()
    );

    if !authenticate_user(&request.username, &request.password) {
        warn!("Authentication failed for user: {}", request.username);
        return Ok(Json(DebugLoginResponse {
            success: false,
            access_token: None,
            token_type: None,
            message: Some("Invalid credentials".to_string()),
        }));
    }

    let access_token = state.tokens.issue(&request.username)?;
    info!("Token created for user: {}", request.username);

    Ok(Json(DebugLoginResponse {
        success: true,
        access_token: Some(access_token),
        token_type: Some("bearer".to_string()),
        message: None,
    }))
}
