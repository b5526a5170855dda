use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::models::{OrderReceipt, OrderRequest};
use crate::services::orders;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::info;

pub async fn place_order(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    Json(request): Json<OrderRequest>,
) -> AppResult<Json<OrderReceipt>> {
    info!("Order request from {}: {:?}", username, request);
    let receipt = orders::place_order(state.broker.as_ref(), request).await?;
    Ok(Json(receipt))
}

pub async fn list_orders(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
) -> AppResult<Json<Vec<Value>>> {
    Ok(Json(state.broker.orders().await?))
}
