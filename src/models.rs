use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DebugLoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub trading_connected: bool,
}

/// One brokerage position as reported by the broker.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Holding {
    #[serde(rename = "tradingsymbol", alias = "symbol")]
    pub symbol: String,
    pub quantity: i64,
    pub average_price: Decimal,
    pub last_price: Decimal,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, quantity: i64, average_price: Decimal, last_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            average_price,
            last_price,
        }
    }

    pub fn invested_value(&self) -> Decimal {
        self.average_price * Decimal::from(self.quantity)
    }

    pub fn current_value(&self) -> Decimal {
        self.last_price * Decimal::from(self.quantity)
    }

    pub fn pnl(&self) -> Decimal {
        (self.last_price - self.average_price) * Decimal::from(self.quantity)
    }

    pub fn pnl_percent(&self) -> Decimal {
        if self.average_price.is_zero() {
            return Decimal::ZERO;
        }
        (self.last_price - self.average_price) / self.average_price * Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisResult {
    pub portfolio_metrics: PortfolioMetrics,
    pub holdings_analysis: Vec<HoldingAnalysis>,
    pub risk_analysis: RiskAnalysis,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PortfolioMetrics {
    pub total_investment: Decimal,
    pub current_value: Decimal,
    pub total_pnl: Decimal,
    pub total_pnl_percent: Decimal,
    pub total_holdings: usize,
    pub profitable_holdings: usize,
    pub loss_making_holdings: usize,
}

/// Per-holding row. The demo fixture only carries symbol, P&L% and value,
/// so the remaining columns are optional on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HoldingAnalysis {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ltp: Option<Decimal>,
    pub current_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<Decimal>,
    pub pnl_percent: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RiskAnalysis {
    pub risk_level: RiskLevel,
    pub concentration_index: Decimal,
    pub diversification_score: Decimal,
    pub largest_position: LargestPosition,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LargestPosition {
    pub symbol: String,
    pub weight: Decimal,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuotesRequest {
    #[serde(default)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Ohlc {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

/// Raw quote as returned by the broker's quote endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawQuote {
    pub last_price: Decimal,
    #[serde(default)]
    pub volume: i64,
    pub ohlc: Ohlc,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Quote {
    pub last_price: Decimal,
    pub volume: i64,
    pub ohlc: Ohlc,
    pub change_percent: Decimal,
    pub day_range: String,
    pub volume_status: String,
    pub price_trend: String,
}

pub type QuoteMap = BTreeMap<String, Quote>;

#[derive(Debug, Deserialize, Serialize)]
pub struct TechnicalAnalysisRequest {
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Macd {
    pub macd_line: Decimal,
    pub signal_line: Decimal,
    pub histogram: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SupportResistance {
    pub resistance_1: Decimal,
    pub support_1: Decimal,
    pub pivot_point: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TechnicalAnalysis {
    pub symbol: String,
    pub current_price: Decimal,
    pub rsi: Decimal,
    pub macd: Macd,
    pub support_resistance: SupportResistance,
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub transaction_type: String,
    pub quantity: i64,
    #[serde(default = "default_order_type")]
    pub order_type: String,
    pub price: Option<Decimal>,
}

fn default_order_type() -> String {
    "MARKET".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub status: String,
    pub symbol: String,
    pub quantity: i64,
    pub transaction_type: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatEntry {
    pub message: String,
    #[serde(rename = "type")]
    pub role: ChatRole,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResponseEntry {
    pub id: usize,
    pub timestamp: String,
    pub prompt: String,
    pub response: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub session: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AllResponses {
    pub total_responses: usize,
    pub responses: Vec<ResponseEntry>,
    pub last_updated: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TodayResponses {
    pub date: String,
    pub total_responses: usize,
    pub responses: Vec<ResponseEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchResponse {
    pub search_term: String,
    pub total_matches: usize,
    pub responses: Vec<ResponseEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
