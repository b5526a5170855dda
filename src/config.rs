use std::env;
use std::path::PathBuf;

const DEFAULT_JWT_SECRET: &str = "unified-trading-dashboard-secret-key";

#[derive(Debug, Clone)]
pub struct KiteCredentials {
    pub api_key: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// `None` selects demo mode.
    pub kite: Option<KiteCredentials>,
    pub kite_base_url: String,
    pub kite_timeout_secs: u64,
    pub response_log_path: PathBuf,
    pub static_dir: PathBuf,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("Invalid PORT value"))?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());

        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("Invalid TOKEN_TTL_HOURS value"))?;

        let kite = match (non_empty_var("KITE_API_KEY"), non_empty_var("KITE_ACCESS_TOKEN")) {
            (Some(api_key), Some(access_token)) => Some(KiteCredentials {
                api_key,
                access_token,
            }),
            _ => None,
        };

        let kite_base_url =
            env::var("KITE_BASE_URL").unwrap_or_else(|_| "https://api.kite.trade".to_string());
        url::Url::parse(&kite_base_url)
            .map_err(|e| anyhow::anyhow!("Invalid KITE_BASE_URL value: {}", e))?;

        let kite_timeout_secs = env::var("KITE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("Invalid KITE_TIMEOUT_SECS value"))?;

        let response_log_path = env::var("RESPONSE_LOG_PATH")
            .unwrap_or_else(|_| "ai_responses.json".to_string())
            .into();
        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "web".to_string()).into();

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8080,http://127.0.0.1:8080".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Config {
            host,
            port,
            jwt_secret,
            token_ttl_hours,
            kite,
            kite_base_url,
            kite_timeout_secs,
            response_log_path,
            static_dir,
            cors_origins,
        })
    }

    /// Demo-mode configuration with a throwaway response log; used by tests.
    pub fn demo(response_log_path: impl Into<PathBuf>) -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
            kite: None,
            kite_base_url: "https://api.kite.trade".to_string(),
            kite_timeout_secs: 10,
            response_log_path: response_log_path.into(),
            static_dir: "web".into(),
            cors_origins: vec!["http://localhost:8080".to_string()],
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|raw| clean_value(&raw))
}

/// Strip whitespace and the quotes `.env` editors tend to leave around secrets.
fn clean_value(raw: &str) -> Option<String> {
    let value = raw.trim().trim_matches('"').trim_matches('\'').trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
