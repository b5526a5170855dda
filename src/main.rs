use tracing_subscriber::EnvFilter;
use trading_dashboard::app::create_router;
use trading_dashboard::config::Config;
use trading_dashboard::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trading_dashboard=debug,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config).await?;
    let app = create_router(state, &config);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("🚀 Trading dashboard running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
