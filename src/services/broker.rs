use crate::config::{Config, KiteCredentials};
use crate::error::{AppError, BrokerError};
use crate::models::{AnalysisResult, Holding, OrderReceipt, OrderRequest, QuoteMap, RawQuote, TechnicalAnalysis};
use crate::services::{market, portfolio};
use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

/// Source of brokerage data. Selected once at startup from configuration.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Whether this source talks to a live account.
    fn is_live(&self) -> bool;

    async fn holdings(&self) -> Result<Vec<Holding>, BrokerError>;

    /// Holdings as the brokerage reports them, every field intact.
    async fn holdings_detail(&self) -> Result<Vec<Value>, BrokerError> {
        self.holdings()
            .await?
            .iter()
            .map(|holding| serde_json::to_value(holding).map_err(|e| BrokerError::Decode(e.to_string())))
            .collect()
    }

    async fn portfolio_analysis(&self) -> Result<AnalysisResult, AppError>;

    async fn quotes(&self, symbols: &[String]) -> Result<QuoteMap, BrokerError>;

    async fn technical_analysis(&self, symbol: &str) -> Result<TechnicalAnalysis, BrokerError>;

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderReceipt, BrokerError>;

    async fn orders(&self) -> Result<Vec<Value>, BrokerError>;
}

/// Pick the live broker when credentials are configured and reachable,
/// otherwise fall back to demo data.
pub async fn connect(config: &Config) -> anyhow::Result<Arc<dyn Broker>> {
    let Some(credentials) = &config.kite else {
        warn!("Kite credentials not configured - using demo mode");
        return Ok(Arc::new(DemoBroker));
    };

    let broker = KiteBroker::new(
        &config.kite_base_url,
        credentials.clone(),
        Duration::from_secs(config.kite_timeout_secs),
    )?;

    match broker.profile_name().await {
        Ok(name) => {
            info!("✅ Connected to Zerodha as: {}", name);
            Ok(Arc::new(broker))
        }
        Err(e) => {
            error!("❌ Kite connection failed: {} - using demo mode", e);
            Ok(Arc::new(DemoBroker))
        }
    }
}

/// Fixed fixtures so the dashboard works without credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoBroker;

#[async_trait]
impl Broker for DemoBroker {
    fn is_live(&self) -> bool {
        false
    }

    async fn holdings(&self) -> Result<Vec<Holding>, BrokerError> {
        Ok(Vec::new())
    }

    async fn portfolio_analysis(&self) -> Result<AnalysisResult, AppError> {
        Ok(portfolio::demo_analysis())
    }

    async fn quotes(&self, symbols: &[String]) -> Result<QuoteMap, BrokerError> {
        Ok(symbols
            .iter()
            .map(|symbol| (format!("NSE:{}", symbol), market::demo_quote(symbol)))
            .collect())
    }

    async fn technical_analysis(&self, symbol: &str) -> Result<TechnicalAnalysis, BrokerError> {
        Ok(market::demo_technical_analysis(symbol))
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderReceipt, BrokerError> {
        let order_id = format!("DEMO{}", Local::now().format("%Y%m%d%H%M%S"));
        info!("🧪 Demo order {} {} x{} -> {}", order.transaction_type, order.symbol, order.quantity, order_id);
        Ok(OrderReceipt {
            order_id,
            status: "Order placed successfully (DEMO MODE)".to_string(),
            symbol: order.symbol.clone(),
            quantity: order.quantity,
            transaction_type: order.transaction_type.clone(),
        })
    }

    async fn orders(&self) -> Result<Vec<Value>, BrokerError> {
        Ok(Vec::new())
    }
}

/// Kite Connect v3 REST envelope: `{"status": "success", "data": ...}`.
#[derive(Debug, Deserialize)]
struct KiteEnvelope<T> {
    status: String,
    data: Option<T>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KiteProfile {
    user_name: String,
}

#[derive(Debug, Deserialize)]
struct KiteOrderId {
    order_id: String,
}

pub struct KiteBroker {
    http_client: Client,
    base_url: Url,
    credentials: KiteCredentials,
}

impl KiteBroker {
    pub fn new(base_url: &str, credentials: KiteCredentials, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            credentials,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BrokerError> {
        self.base_url
            .join(path)
            .map_err(|e| BrokerError::DataUnavailable(format!("bad endpoint {}: {}", path, e)))
    }

    fn authorization(&self) -> String {
        format!("token {}:{}", self.credentials.api_key, self.credentials.access_token)
    }

    async fn unwrap_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BrokerError> {
        let status = response.status();
        let envelope: KiteEnvelope<T> = response.json().await?;

        if envelope.status != "success" {
            let message = envelope.message.unwrap_or_else(|| format!("HTTP {}", status));
            // 4xx from Kite means the request itself was refused.
            return Err(if status.is_client_error() {
                BrokerError::Rejected(message)
            } else {
                BrokerError::DataUnavailable(message)
            });
        }

        envelope
            .data
            .ok_or_else(|| BrokerError::Decode("missing data field".to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, BrokerError> {
        let response = self
            .http_client
            .get(self.endpoint(path)?)
            .header("X-Kite-Version", "3")
            .header("Authorization", self.authorization())
            .query(query)
            .send()
            .await?;
        Self::unwrap_envelope(response).await
    }

    /// Connectivity check used at startup and by the `check_broker` binary.
    pub async fn profile_name(&self) -> Result<String, BrokerError> {
        let profile: KiteProfile = self.get("user/profile", &[]).await?;
        Ok(profile.user_name)
    }

    async fn raw_quotes(&self, instruments: &[String]) -> Result<BTreeMap<String, RawQuote>, BrokerError> {
        let query: Vec<(&str, &str)> = instruments.iter().map(|i| ("i", i.as_str())).collect();
        self.get("quote", &query).await
    }
}

#[async_trait]
impl Broker for KiteBroker {
    fn is_live(&self) -> bool {
        true
    }

    async fn holdings(&self) -> Result<Vec<Holding>, BrokerError> {
        self.get("portfolio/holdings", &[]).await
    }

    async fn holdings_detail(&self) -> Result<Vec<Value>, BrokerError> {
        self.get("portfolio/holdings", &[]).await.map_err(|e| {
            error!("Holdings fetch error: {}", e);
            e
        })
    }

    async fn portfolio_analysis(&self) -> Result<AnalysisResult, AppError> {
        let holdings = self.holdings().await.map_err(|e| {
            error!("Portfolio analysis error: {}", e);
            e
        })?;
        Ok(portfolio::analyze(&holdings)?)
    }

    async fn quotes(&self, symbols: &[String]) -> Result<QuoteMap, BrokerError> {
        let instruments: Vec<String> = symbols.iter().map(|s| market::instrument(s)).collect();
        if instruments.is_empty() {
            return Ok(QuoteMap::new());
        }

        let raw = self.raw_quotes(&instruments).await.map_err(|e| {
            error!("Market data error: {}", e);
            e
        })?;

        Ok(raw
            .into_iter()
            .map(|(instrument, quote)| (instrument, market::enrich_quote(quote)))
            .collect())
    }

    async fn technical_analysis(&self, symbol: &str) -> Result<TechnicalAnalysis, BrokerError> {
        let instrument = market::instrument(symbol);
        let mut raw = self.raw_quotes(std::slice::from_ref(&instrument)).await?;
        let quote = raw
            .remove(&instrument)
            .ok_or_else(|| BrokerError::DataUnavailable(format!("no quote for {}", instrument)))?;
        Ok(market::technical_analysis(symbol, &quote))
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderReceipt, BrokerError> {
        let quantity = order.quantity.to_string();
        let price = order.price.map(|p| p.to_string());

        let mut form = vec![
            ("exchange", "NSE"),
            ("tradingsymbol", order.symbol.as_str()),
            ("transaction_type", order.transaction_type.as_str()),
            ("quantity", quantity.as_str()),
            ("product", "CNC"),
            ("order_type", order.order_type.as_str()),
        ];
        if let Some(price) = price.as_deref() {
            form.push(("price", price));
        }

        let response = self
            .http_client
            .post(self.endpoint("orders/regular")?)
            .header("X-Kite-Version", "3")
            .header("Authorization", self.authorization())
            .form(&form)
            .send()
            .await?;
        let placed: KiteOrderId = Self::unwrap_envelope(response).await.map_err(|e| {
            error!("Order placement error: {}", e);
            e
        })?;

        info!("📨 Order {} placed: {} {} x{}", placed.order_id, order.transaction_type, order.symbol, order.quantity);

        Ok(OrderReceipt {
            order_id: placed.order_id,
            status: "Order placed successfully".to_string(),
            symbol: order.symbol.clone(),
            quantity: order.quantity,
            transaction_type: order.transaction_type.clone(),
        })
    }

    async fn orders(&self) -> Result<Vec<Value>, BrokerError> {
        self.get("orders", &[]).await.map_err(|e| {
            error!("Get orders error: {}", e);
            e
        })
    }
}
