use crate::config::Config;
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub fn create_router(state: AppState, config: &Config) -> Router {
    let dashboard = ServeDir::new(&config.static_dir)
        .fallback(ServeFile::new(config.static_dir.join("index.html")));

    Router::new()
        .route("/api/login", post(handlers::auth::login))
        .route("/api/debug/login", post(handlers::auth::debug_login))
        .route("/api/health", get(handlers::health::health_check))
        .route("/api/debug/portfolio", get(handlers::portfolio::debug_portfolio))
        .route("/api/portfolio/analysis", get(handlers::portfolio::portfolio_analysis))
        .route("/api/portfolio/holdings", get(handlers::portfolio::holdings))
        .route("/api/market/quotes", post(handlers::market::market_quotes))
        .route("/api/market/technical-analysis", post(handlers::market::technical_analysis))
        .route("/api/trading/place-order", post(handlers::orders::place_order))
        .route("/api/trading/orders", get(handlers::orders::list_orders))
        .route("/api/chat", post(handlers::chat::chat))
        .route(
            "/api/chat/history",
            get(handlers::chat::chat_history).delete(handlers::chat::clear_chat),
        )
        .route("/api/responses/all", get(handlers::chat::all_responses))
        .route("/api/responses/today", get(handlers::chat::today_responses))
        .route("/api/responses/clear", delete(handlers::chat::clear_responses))
        .route("/api/responses/search", post(handlers::chat::search_responses))
        .fallback_service(dashboard)
        .with_state(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
