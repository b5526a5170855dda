use crate::error::AppError;
use crate::models::{AnalysisResult, ChatEntry, ChatRole};
use crate::services::broker::Broker;
use crate::services::responses::ResponseLog;
use crate::utils::{format_currency, round_decimal};
use chrono::Local;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::error;

pub const FALLBACK_REPLY: &str =
    "I encountered an error. Please try asking about your portfolio or market data.";

const PORTFOLIO_WORDS: [&str; 3] = ["portfolio", "holdings", "pnl"];
const MARKET_WORDS: [&str; 3] = ["price", "quote", "market"];
const TRADING_WORDS: [&str; 4] = ["buy", "sell", "order", "trade"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Portfolio,
    Market,
    Trading,
    Help,
}

/// First matching keyword group wins, in the order portfolio, market, trading.
pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|word| lower.contains(word));

    if mentions(&PORTFOLIO_WORDS) {
        Intent::Portfolio
    } else if mentions(&MARKET_WORDS) {
        Intent::Market
    } else if mentions(&TRADING_WORDS) {
        Intent::Trading
    } else {
        Intent::Help
    }
}

/// Conversation transcript for the running process.
#[derive(Default)]
pub struct ChatHistory {
    entries: Mutex<Vec<ChatEntry>>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, role: ChatRole, message: &str) {
        self.entries.lock().await.push(ChatEntry {
            message: message.to_string(),
            role,
            timestamp: Local::now(),
        });
    }

    pub async fn all(&self) -> Vec<ChatEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

fn signed_percent(value: Decimal) -> String {
    let rounded = round_decimal(value, 2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "+" };
    format!("{}{:.2}%", sign, rounded.abs())
}

pub fn portfolio_summary(analysis: &AnalysisResult) -> String {
    let metrics = &analysis.portfolio_metrics;
    let risk = &analysis.risk_analysis;
    let recommendations: Vec<String> = analysis
        .recommendations
        .iter()
        .take(3)
        .map(|rec| format!("• {}", rec))
        .collect();

    format!(
        "📊 **Portfolio Summary**\n\n\
         💰 Current Value: {}\n\
         📈 Total P&L: {} ({})\n\
         🏦 Holdings: {} | ✅ Profitable: {} | ❌ Loss: {}\n\n\
         🎯 **Risk Level:** {}\n\
         📊 **Diversification:** {}%\n\n\
         💡 **Recommendations:**\n{}",
        format_currency(metrics.current_value),
        format_currency(metrics.total_pnl),
        signed_percent(metrics.total_pnl_percent),
        metrics.total_holdings,
        metrics.profitable_holdings,
        metrics.loss_making_holdings,
        risk.risk_level,
        risk.diversification_score.normalize(),
        recommendations.join("\n"),
    )
}

fn market_help() -> String {
    "📈 **Market Data Available**\n\n\
     I can provide live quotes for any stock. Try:\n\
     • \"RELIANCE price\"\n\
     • \"TCS quote\"\n\
     • \"Market data for INFY\"\n\n\
     Or ask for technical analysis:\n\
     • \"Technical analysis for RELIANCE\"\n\
     • \"RSI for TCS\"\n"
        .to_string()
}

fn trading_help() -> String {
    "💼 **Trading Operations**\n\n\
     I can help with trading:\n\
     • View your current orders\n\
     • Get order status\n\
     • Provide market insights for trading decisions\n\n\
     ⚠️ **Note:** Actual order placement requires manual confirmation for safety.\n"
        .to_string()
}

fn general_help(message: &str) -> String {
    format!(
        "🤖 I understand: \"{}\"\n\n\
         I'm your AI trading assistant! I can help with:\n\n\
         📊 **Portfolio:** \"Show my portfolio\", \"Portfolio analysis\"\n\
         📈 **Market Data:** \"RELIANCE price\", \"Technical analysis for TCS\"\n\
         💼 **Trading:** \"Show my orders\", \"Trading advice\"\n\
         ⚖️ **Risk:** \"Risk analysis\", \"Diversification advice\"\n\n\
         What would you like to know?",
        message
    )
}

async fn compose_reply(broker: &dyn Broker, message: &str) -> Result<String, AppError> {
    let reply = match classify(message) {
        Intent::Portfolio => portfolio_summary(&broker.portfolio_analysis().await?),
        Intent::Market => market_help(),
        Intent::Trading => trading_help(),
        Intent::Help => general_help(message),
    };
    Ok(reply)
}

/// Answer one chat message, recording both sides in the transcript and the reply in the response log.
/// A failed lookup answers with [`FALLBACK_REPLY`] and records only the user's side.
pub async fn process_message(
    broker: &dyn Broker,
    history: &ChatHistory,
    log: &ResponseLog,
    message: &str,
) -> String {
    history.push(ChatRole::User, message).await;

    let reply = match compose_reply(broker, message).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Chat processing error: {}", e);
            return FALLBACK_REPLY.to_string();
        }
    };

    history.push(ChatRole::Ai, &reply).await;
    log.record(message, &reply, "chat").await;

    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::broker::DemoBroker;
    use rust_decimal_macros::dec;

    #[test]
    fn classifies_by_keyword_priority() {
        assert_eq!(classify("Show my PORTFOLIO"), Intent::Portfolio);
        assert_eq!(classify("what is my pnl today"), Intent::Portfolio);
        assert_eq!(classify("RELIANCE price"), Intent::Market);
        // "market order" mentions both; market data wins.
        assert_eq!(classify("place a market order"), Intent::Market);
        assert_eq!(classify("should I sell"), Intent::Trading);
        assert_eq!(classify("hello there"), Intent::Help);
    }

    #[test]
    fn signed_percent_formatting() {
        assert_eq!(signed_percent(dec!(-8.37)), "-8.37%");
        assert_eq!(signed_percent(dec!(12.5)), "+12.50%");
        assert_eq!(signed_percent(dec!(0)), "+0.00%");
    }

    #[test]
    fn summary_renders_demo_metrics() {
        let summary = portfolio_summary(&crate::services::portfolio::demo_analysis());
        assert!(summary.contains("💰 Current Value: ₹91.08"));
        assert!(summary.contains("📈 Total P&L: -₹7.62 (-8.37%)"));
        assert!(summary.contains("🏦 Holdings: 7 | ✅ Profitable: 2 | ❌ Loss: 5"));
        assert!(summary.contains("🎯 **Risk Level:** High"));
        assert!(summary.contains("📊 **Diversification:** 65%"));
        assert_eq!(summary.matches("• ").count(), 3);
    }

    #[tokio::test]
    async fn process_message_records_both_sides() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResponseLog::open(dir.path().join("responses.json")).await;
        let history = ChatHistory::new();

        let reply = process_message(&DemoBroker, &history, &log, "hello").await;
        assert!(reply.starts_with("🤖 I understand: \"hello\""));

        let entries = history.all().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, ChatRole::User);
        assert_eq!(entries[1].role, ChatRole::Ai);
        assert_eq!(entries[1].message, reply);

        let stored = log.all().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].prompt, "hello");
        assert_eq!(stored[0].kind, "chat");
    }

    #[tokio::test]
    async fn failed_portfolio_lookup_is_not_recorded() {
        use crate::config::KiteCredentials;
        use crate::services::broker::KiteBroker;
        use std::time::Duration;

        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let offline = KiteBroker::new(
            &format!("http://127.0.0.1:{}", port),
            KiteCredentials {
                api_key: "key".to_string(),
                access_token: "token".to_string(),
            },
            Duration::from_secs(2),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let log = ResponseLog::open(dir.path().join("responses.json")).await;
        let history = ChatHistory::new();

        let reply = process_message(&offline, &history, &log, "show my portfolio").await;
        assert_eq!(reply, FALLBACK_REPLY);

        let entries = history.all().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].role, ChatRole::User);
        assert!(log.all().await.is_empty());
    }

    #[tokio::test]
    async fn clear_empties_history() {
        let history = ChatHistory::new();
        history.push(ChatRole::User, "hi").await;
        history.clear().await;
        assert!(history.all().await.is_empty());
    }
}
