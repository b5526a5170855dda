use std::time::Duration;
use trading_dashboard::config::Config;
use trading_dashboard::error::BrokerError;
use trading_dashboard::services::broker::KiteBroker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let Some(credentials) = config.kite.clone() else {
        println!("⚠️ KITE_API_KEY / KITE_ACCESS_TOKEN not set - the dashboard will run in demo mode.");
        return Ok(());
    };

    println!("🔍 Testing brokerage connection...");
    println!("  Endpoint: {}", config.kite_base_url);
    println!("  API key:  {}", redact(&credentials.api_key));
    println!("  Token:    {}", redact(&credentials.access_token));

    let broker = KiteBroker::new(
        &config.kite_base_url,
        credentials,
        Duration::from_secs(config.kite_timeout_secs),
    )?;

    println!("\n📡 Attempting to connect...");

    match broker.profile_name().await {
        Ok(name) => {
            println!("✅ SUCCESS! Connected as {}", name);
            println!("   The dashboard will serve live data. Try running: cargo run");
            Ok(())
        }
        Err(e) => {
            println!("❌ Connection failed!");
            println!("\nError details:");
            println!("  {}", e);

            match &e {
                BrokerError::Rejected(_) => {
                    println!("\n💡 Suggestions:");
                    println!("  1. Access tokens expire daily - generate a fresh KITE_ACCESS_TOKEN");
                    println!("  2. Check that KITE_API_KEY belongs to the same app as the token");
                }
                BrokerError::DataUnavailable(msg) if msg.contains("timed out") => {
                    println!("\n💡 Suggestions:");
                    println!("  1. Check your internet connection");
                    println!("  2. Raise KITE_TIMEOUT_SECS");
                }
                _ => {}
            }

            Err(format!("Connection error: {}", e).into())
        }
    }
}

fn redact(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}********", visible)
}
