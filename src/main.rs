//! Storefront Pricing - pricing-preview service

use anyhow::Result;
use storefront_pricing::{api, AppConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = AppConfig::from_env()?;
    let state = api::AppState::from_config(&config)?;
    if config.exchange_rate.is_none() {
        tracing::warn!("FX_RATE not set; foreign-currency costs price at zero until a rate is pushed");
    }
    let app = api::router(state);

    tracing::info!(schedule = ?config.fee_schedule, "🚀 Storefront pricing listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
