use std::sync::Arc;

use whalescan::api::router::create_router;
use whalescan::config::AppConfig;
use whalescan::etherscan::EtherscanClient;
use whalescan::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = config.listen_addr();

    let metrics_handle = whalescan::metrics::init_metrics()?;

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;
    let client = EtherscanClient::with_base_url(
        http,
        config.etherscan_base_url.clone(),
        config.etherscan_api_key.clone(),
        config.rate_limit,
    );

    tracing::info!(
        base_url = %config.etherscan_base_url,
        rate_limit = config.rate_limit,
        auth = config.api_token.is_some(),
        "Etherscan client ready"
    );

    let state = AppState {
        chain: Arc::new(client),
        pacing: config.pacing,
        metrics_handle,
        api_token: config.api_token.clone(),
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
