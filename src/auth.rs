use crate::error::AppError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const USERS: [(&str, &str); 2] = [("trader", "secure123"), ("admin", "admin123")];

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

pub fn authenticate_user(username: &str, password: &str) -> bool {
    USERS
        .iter()
        .any(|(user, secret)| *user == username && *secret == password)
}

/// Issues and checks HS256 bearer tokens bound to a username.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        self.issue_with_ttl(username, self.ttl)
    }

    fn issue_with_ttl(&self, username: &str, ttl: Duration) -> Result<String, AppError> {
        let claims = Claims {
            sub: username.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("token encoding failed: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<String, AppError> {
        let preview: String = token.chars().take(20).collect();
        debug!("Verifying token: {}...", preview);

        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                warn!("Token verification failed: {}", e);
                AppError::Unauthorized
            })?;

        if data.claims.sub.is_empty() {
            warn!("Token verification failed: no username in payload");
            return Err(AppError::Unauthorized);
        }

        debug!("Token verified for user: {}", data.claims.sub);
        Ok(data.claims.sub)
    }
}

/// Username of the caller, taken from a valid `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        state.tokens.verify(token.trim()).map(AuthUser)
    }
}
