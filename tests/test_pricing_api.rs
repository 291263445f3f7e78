//! Tests for the pricing-preview HTTP API.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashMap;
use storefront_pricing::api::{router, AppState};
use storefront_pricing::AppConfig;
use tower::ServiceExt;

/// Helper: router configured like the reference merchant (15% tax, 3.99% + 0.39, 30% margin).
fn app(extra: &[(&str, &str)]) -> Router {
    let mut vars: HashMap<String, String> = [
        ("PRICING_TAX_RATE", "15"),
        ("PRICING_PROCESSOR_RATE", "3.99"),
        ("PRICING_PROCESSOR_FIXED_FEE", "0.39"),
        ("PRICING_PROFIT_MARGIN", "30"),
        ("PRICING_MAX_INSTALLMENTS", "12"),
        ("PRICING_NO_FEE_INSTALLMENTS", "3"),
        ("PRICING_MIN_INSTALLMENT_VALUE", "50"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    let config = AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
    router(AppState::from_config(&config).unwrap())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ─── Preview ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_preview_reference_price() {
    let app = app(&[]);
    let (status, body) = send(&app, "POST", "/api/v1/pricing/preview", Some(json!({"cost_price": 1000}))).await;

    assert_eq!(status, StatusCode::OK);
    let b = &body["breakdown"];
    assert_eq!(b["ideal_value"], "1557.54");
    assert_eq!(b["device_value"], "1557.54");
    assert_eq!(b["real_value"], "1300.00");
    assert_eq!(b["profit_margin_actual"], "30.00");
    assert_eq!(b["installments"].as_array().unwrap().len(), 12);
    assert_eq!(body["labels"]["device_value"], "$1,557.54");
    assert_eq!(body["labels"]["installments"][0], "1x $1,557.54 (fee-free)");
    assert_eq!(body["exchange_rate_stale"], false);
    assert!(body["quote_id"].is_string());
}

#[tokio::test]
async fn test_preview_discount_and_minimum_installment() {
    let app = app(&[]);
    let (_, body) = send(&app, "POST", "/api/v1/pricing/preview", Some(json!({"cost_price": 1000, "discount_percent": 10}))).await;
    assert_eq!(body["breakdown"]["device_value"], "1401.78");
    assert_eq!(body["labels"]["profit_margin"], "17.00%");

    // 300 charged, 50 minimum → six plans even though twelve are allowed
    let input = json!({"cost_price": 300, "overrides": {"tax_rate": 0, "processor_rate": 0, "processor_fixed_fee": 0, "desired_profit_margin": 0}});
    let (_, body) = send(&app, "POST", "/api/v1/pricing/preview", Some(input)).await;
    let counts: Vec<u64> = body["breakdown"]["installments"].as_array().unwrap().iter().map(|o| o["count"].as_u64().unwrap()).collect();
    assert_eq!(counts, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn test_preview_non_numeric_cost_is_zero_breakdown() {
    let app = app(&[]);
    let (status, body) = send(&app, "POST", "/api/v1/pricing/preview", Some(json!({"cost_price": "tbd"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["breakdown"]["device_value"], "0.00");
    assert!(body["breakdown"]["installments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_preview_foreign_cost_uses_cached_rate() {
    let app = app(&[("FX_RATE", "5.2")]);
    let (_, body) = send(&app, "POST", "/api/v1/pricing/preview", Some(json!({"price_in_foreign_currency": 50}))).await;
    assert_eq!(body["breakdown"]["cost_price"], "260.00");
    assert_eq!(body["exchange_rate"]["rate"], 5.2);
    assert_eq!(body["exchange_rate_stale"], false);
}

#[tokio::test]
async fn test_preview_foreign_cost_without_rate_is_flagged() {
    let app = app(&[]);
    let (_, body) = send(&app, "POST", "/api/v1/pricing/preview", Some(json!({"price_in_foreign_currency": 50}))).await;
    assert_eq!(body["breakdown"]["cost_price"], "0.00");
    assert_eq!(body["exchange_rate_stale"], true);
}

#[tokio::test]
async fn test_preview_huge_installment_override_is_bounded() {
    let app = app(&[]);
    let input = json!({"cost_price": 10, "overrides": {"max_installments": 1e12, "min_installment_value": 5}});
    let started = std::time::Instant::now();
    let (status, body) = send(&app, "POST", "/api/v1/pricing/preview", Some(input)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["breakdown"]["device_value"], "15.98");
    let counts: Vec<u64> = body["breakdown"]["installments"].as_array().unwrap().iter().map(|o| o["count"].as_u64().unwrap()).collect();
    assert_eq!(counts, vec![1, 2, 3]);

    let input = json!({"cost_price": 10, "overrides": {"max_installments": "4294967295", "min_installment_value": 0}});
    let (_, body) = send(&app, "POST", "/api/v1/pricing/preview", Some(input)).await;
    assert_eq!(body["breakdown"]["installments"].as_array().unwrap().len(), 48);
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}

// ─── Fee schedule ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fee_schedule_update() {
    let app = app(&[]);
    let (status, schedule) = send(&app, "GET", "/api/v1/pricing/fee-schedule", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedule["processor_rate"], 3.99);
    assert_eq!(schedule["tax_base"], "net_of_processor_fee");

    let mut updated = schedule.clone();
    updated["desired_profit_margin"] = json!(50);
    let (status, _) = send(&app, "PUT", "/api/v1/pricing/fee-schedule", Some(updated)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "POST", "/api/v1/pricing/preview", Some(json!({"cost_price": 1000}))).await;
    assert_eq!(body["breakdown"]["profit_margin_actual"], "50.00");
}

#[tokio::test]
async fn test_fee_schedule_rejects_out_of_range() {
    let app = app(&[]);
    let (_, mut schedule) = send(&app, "GET", "/api/v1/pricing/fee-schedule", None).await;
    schedule["tax_rate"] = json!(140);
    let (status, _) = send(&app, "PUT", "/api/v1/pricing/fee-schedule", Some(schedule)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, current) = send(&app, "GET", "/api/v1/pricing/fee-schedule", None).await;
    assert_eq!(current["tax_rate"], 15.0);
}

// ─── Exchange rate ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_exchange_rate_lifecycle() {
    let app = app(&[]);
    let (status, _) = send(&app, "GET", "/api/v1/pricing/exchange-rate", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "PUT", "/api/v1/pricing/exchange-rate", Some(json!({"rate": 0}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, "PUT", "/api/v1/pricing/exchange-rate", Some(json!({"rate": 5.2}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rate"], 5.2);
    assert_eq!(body["stale"], false);

    let (_, body) = send(&app, "POST", "/api/v1/pricing/preview", Some(json!({"price_in_foreign_currency": 50}))).await;
    assert_eq!(body["breakdown"]["cost_price"], "260.00");
}

#[tokio::test]
async fn test_old_exchange_rate_reports_stale() {
    let app = app(&[("FX_RATE_TTL_SECS", "60")]);
    let (_, body) = send(&app, "PUT", "/api/v1/pricing/exchange-rate", Some(json!({"rate": 5.0, "as_of": "2020-01-01T00:00:00Z"}))).await;
    assert_eq!(body["stale"], true);
    assert_eq!(body["ttl_secs"], 60);

    let (_, body) = send(&app, "POST", "/api/v1/pricing/preview", Some(json!({"price_in_foreign_currency": 10}))).await;
    assert_eq!(body["exchange_rate_stale"], true);
    assert_eq!(body["breakdown"]["cost_price"], "50.00");
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(&[]), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
