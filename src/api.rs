//! Pricing-preview HTTP API

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;
use crate::config::{AppConfig, FeeScheduleSource, SharedFeeSchedule};
use crate::display::BreakdownLabels;
use crate::domain::exchange::{CachedRate, ExchangeRateQuote, ExchangeRateSource};
use crate::domain::fee_schedule::FeeSchedule;
use crate::domain::pricing::{calculate, PriceBreakdown, PriceInput};
use crate::PricingError;

#[derive(Clone)]
pub struct AppState { pub fee_schedule: SharedFeeSchedule, pub exchange_rate: Arc<CachedRate>, pub currency_symbol: Arc<str> }

impl AppState {
    pub fn from_config(config: &AppConfig) -> crate::Result<Self> {
        let cache = match config.exchange_rate {
            Some(rate) => CachedRate::with_quote(config.exchange_rate_ttl, ExchangeRateQuote::new(rate, Utc::now())),
            None => CachedRate::new(config.exchange_rate_ttl),
        };
        Ok(Self {
            fee_schedule: SharedFeeSchedule::new(config.fee_schedule.clone())?,
            exchange_rate: Arc::new(cache),
            currency_symbol: config.currency_symbol.as_str().into(),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-pricing"})) }))
        .route("/api/v1/pricing/preview", post(preview))
        .route("/api/v1/pricing/fee-schedule", get(get_fee_schedule).put(update_fee_schedule))
        .route("/api/v1/pricing/exchange-rate", get(get_exchange_rate).put(set_exchange_rate))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

fn unprocessable(e: PricingError) -> (StatusCode, String) { (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()) }

#[derive(Debug, Serialize)]
pub struct PricePreview {
    pub quote_id: Uuid,
    /// Cached quote the cost was converted with, when one was used.
    pub exchange_rate: Option<ExchangeRateQuote>,
    pub exchange_rate_stale: bool,
    pub breakdown: PriceBreakdown,
    pub labels: BreakdownLabels,
}

async fn preview(State(s): State<AppState>, Json(input): Json<PriceInput>) -> Json<PricePreview> {
    let schedule = s.fee_schedule.get_config();
    let uses_cached_rate = input.exchange_rate.is_none() && input.price_in_foreign_currency.is_some_and(|p| p > 0.0);
    let quote = if uses_cached_rate { s.exchange_rate.get_rate() } else { None };
    let exchange_rate_stale = uses_cached_rate && s.exchange_rate.is_stale(Utc::now());
    if exchange_rate_stale {
        tracing::warn!(as_of = ?quote.map(|q| q.as_of), "pricing with a stale or missing exchange rate");
    }

    let breakdown = calculate(&input, &schedule, quote.map(|q| q.rate));
    tracing::debug!(device_value = %breakdown.device_value, installments = breakdown.installments.len(), "price previewed");
    let labels = BreakdownLabels::new(&breakdown, &s.currency_symbol);
    Json(PricePreview { quote_id: Uuid::now_v7(), exchange_rate: quote, exchange_rate_stale, breakdown, labels })
}

async fn get_fee_schedule(State(s): State<AppState>) -> Json<FeeSchedule> { Json(s.fee_schedule.get_config()) }

async fn update_fee_schedule(State(s): State<AppState>, Json(schedule): Json<FeeSchedule>) -> Result<Json<FeeSchedule>, (StatusCode, String)> {
    s.fee_schedule.replace(schedule).map_err(unprocessable)?;
    Ok(Json(s.fee_schedule.get_config()))
}

#[derive(Debug, Serialize)]
pub struct ExchangeRateView { #[serde(flatten)] pub quote: ExchangeRateQuote, pub stale: bool, pub ttl_secs: i64 }

async fn get_exchange_rate(State(s): State<AppState>) -> Result<Json<ExchangeRateView>, (StatusCode, String)> {
    let quote = s.exchange_rate.get_rate().ok_or((StatusCode::NOT_FOUND, "No exchange rate quoted".to_string()))?;
    Ok(Json(ExchangeRateView { quote, stale: s.exchange_rate.is_stale(Utc::now()), ttl_secs: s.exchange_rate.ttl().num_seconds() }))
}

#[derive(Debug, Deserialize)] pub struct SetExchangeRateRequest { pub rate: f64, pub as_of: Option<DateTime<Utc>> }

async fn set_exchange_rate(State(s): State<AppState>, Json(r): Json<SetExchangeRateRequest>) -> Result<Json<ExchangeRateView>, (StatusCode, String)> {
    if !(r.rate.is_finite() && r.rate > 0.0) { return Err(unprocessable(PricingError::InvalidExchangeRate(r.rate))); }
    let quote = ExchangeRateQuote::new(r.rate, r.as_of.unwrap_or_else(Utc::now));
    s.exchange_rate.store(quote);
    tracing::info!(rate = quote.rate, as_of = %quote.as_of, "exchange rate updated");
    Ok(Json(ExchangeRateView { quote, stale: s.exchange_rate.is_stale(Utc::now()), ttl_secs: s.exchange_rate.ttl().num_seconds() }))
}
