use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::models::AnalysisResult;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, info};

pub async fn portfolio_analysis(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> AppResult<Json<AnalysisResult>> {
    info!("Portfolio analysis requested by user: {}", username);

    let result = state.broker.portfolio_analysis().await.map_err(|e| {
        error!("Portfolio analysis failed: {}", e);
        e
    })?;

    info!("Portfolio analysis completed successfully");
    Ok(Json(result))
}

pub async fn holdings(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
) -> AppResult<Json<Vec<Value>>> {
    Ok(Json(state.broker.holdings_detail().await?))
}

/// Unauthenticated analysis; errors are returned as `{"error": ...}` with 200.
pub async fn debug_portfolio(
    State(state): State<AppState>,
) -> Result<Json<AnalysisResult>, Json<Value>> {
    info!("Debug portfolio endpoint called");

    state.broker.portfolio_analysis().await.map(Json).map_err(|e| {
        error!("Debug portfolio failed: {}", e);
        Json(json!({ "error": e.to_string() }))
    })
}
