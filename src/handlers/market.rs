use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::{QuoteMap, QuotesRequest, TechnicalAnalysis, TechnicalAnalysisRequest};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;

pub async fn market_quotes(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
    Json(request): Json<QuotesRequest>,
) -> AppResult<Json<QuoteMap>> {
    let symbols: Vec<String> = request
        .symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(Json(state.broker.quotes(&symbols).await?))
}

pub async fn technical_analysis(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
    Json(request): Json<TechnicalAnalysisRequest>,
) -> AppResult<Json<TechnicalAnalysis>> {
    let symbol = request
        .symbol
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("symbol is required".to_string()))?;

    Ok(Json(state.broker.technical_analysis(&symbol).await?))
}
