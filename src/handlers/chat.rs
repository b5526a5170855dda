use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::{
    AllResponses, ChatEntry, ChatRequest, ChatResponse, MessageResponse, SearchRequest,
    SearchResponse, TodayResponses,
};
use crate::services::chat;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use chrono::Local;

pub async fn chat(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let response = chat::process_message(
        state.broker.as_ref(),
        &state.chat_history,
        &state.responses,
        &request.message,
    )
    .await;

    Ok(Json(ChatResponse {
        response,
        timestamp: Local::now().to_rfc3339(),
    }))
}

pub async fn chat_history(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
) -> Json<Vec<ChatEntry>> {
    Json(state.chat_history.all().await)
}

pub async fn clear_chat(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
) -> Json<MessageResponse> {
    state.chat_history.clear().await;
    Json(MessageResponse::new("Chat history cleared"))
}

pub async fn all_responses(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
) -> Json<AllResponses> {
    let responses = state.responses.all().await;
    Json(AllResponses {
        total_responses: responses.len(),
        responses,
        last_updated: Local::now().to_rfc3339(),
    })
}

pub async fn today_responses(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
) -> Json<TodayResponses> {
    let today = Local::now().date_naive();
    let responses = state.responses.for_session(today).await;
    Json(TodayResponses {
        date: today.format("%Y-%m-%d").to_string(),
        total_responses: responses.len(),
        responses,
    })
}

pub async fn clear_responses(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
) -> Json<MessageResponse> {
    state.responses.clear().await;
    Json(MessageResponse::new("All response history cleared"))
}

pub async fn search_responses(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let search_term = request.query.to_lowercase();
    let responses = state.responses.search(&search_term).await;
    Json(SearchResponse {
        search_term,
        total_matches: responses.len(),
        responses,
    })
}
