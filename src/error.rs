use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures of the analytics pipeline itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("No holdings found")]
    NoHoldings,
    #[error("Portfolio current value is zero or negative; weights are undefined")]
    DegenerateInput,
}

/// Failures reported by a brokerage source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("Brokerage data unavailable: {0}")]
    DataUnavailable(String),
    #[error("Brokerage rejected the request: {0}")]
    Rejected(String),
    #[error("Unexpected brokerage response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BrokerError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            BrokerError::Decode(value.to_string())
        } else {
            BrokerError::DataUnavailable(value.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid token")]
    Unauthorized,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Analysis(AnalysisError::NoHoldings) => StatusCode::NOT_FOUND,
            AppError::Analysis(AnalysisError::DegenerateInput) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Broker(BrokerError::Rejected(_)) => StatusCode::BAD_REQUEST,
            AppError::Broker(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
