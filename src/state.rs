use crate::auth::TokenService;
use crate::config::Config;
use crate::services::broker::Broker;
use crate::services::chat::ChatHistory;
use crate::services::responses::ResponseLog;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<dyn Broker>,
    pub tokens: Arc<TokenService>,
    pub chat_history: Arc<ChatHistory>,
    pub responses: Arc<ResponseLog>,
}

impl AppState {
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let broker = crate::services::broker::connect(config).await?;
        Ok(Self::with_broker(config, broker).await)
    }

    pub async fn with_broker(config: &Config, broker: Arc<dyn Broker>) -> Self {
        Self {
            broker,
            tokens: Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl_hours)),
            chat_history: Arc::new(ChatHistory::new()),
            responses: Arc::new(ResponseLog::open(&config.response_log_path).await),
        }
    }
}
