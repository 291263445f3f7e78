//! Foreign-exchange normalization and exchange-rate sources

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};
use crate::domain::value_objects::finite_or_zero;

/// A spot rate (reporting currency per unit of foreign currency) and when it was quoted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateQuote {
    pub rate: f64,
    pub as_of: DateTime<Utc>,
}

impl ExchangeRateQuote {
    pub fn new(rate: f64, as_of: DateTime<Utc>) -> Self { Self { rate, as_of } }
    pub fn age(&self, now: DateTime<Utc>) -> Duration { now - self.as_of }
}

/// Where a calculation gets its exchange rate from. Freshness is not enforced
/// here; callers may inspect `as_of`.
pub trait ExchangeRateSource: Send + Sync {
    fn get_rate(&self) -> Option<ExchangeRateQuote>;
}

/// A fixed, manually entered rate.
#[derive(Clone, Copy, Debug)]
pub struct ManualRate(ExchangeRateQuote);

impl ManualRate {
    pub fn new(rate: f64) -> Self { Self(ExchangeRateQuote::new(rate, Utc::now())) }
}

impl ExchangeRateSource for ManualRate {
    fn get_rate(&self) -> Option<ExchangeRateQuote> { Some(self.0) }
}

/// Last quote pushed by the refresher, considered stale after `ttl`.
#[derive(Debug)]
pub struct CachedRate {
    quote: RwLock<Option<ExchangeRateQuote>>,
    ttl: Duration,
}

impl CachedRate {
    pub fn new(ttl: Duration) -> Self { Self { quote: RwLock::new(None), ttl } }

    pub fn with_quote(ttl: Duration, quote: ExchangeRateQuote) -> Self {
        Self { quote: RwLock::new(Some(quote)), ttl }
    }

    pub fn ttl(&self) -> Duration { self.ttl }

    pub fn store(&self, quote: ExchangeRateQuote) {
        *self.quote.write().unwrap_or_else(PoisonError::into_inner) = Some(quote);
    }

    /// A missing quote counts as stale.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.get_rate().map_or(true, |q| q.age(now) > self.ttl)
    }
}

impl ExchangeRateSource for CachedRate {
    fn get_rate(&self) -> Option<ExchangeRateQuote> {
        *self.quote.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Convert a cost into the reporting currency.
///
/// A present, positive foreign price wins and is multiplied by `exchange_rate`
/// as given (a zero or stale rate is not second-guessed). Otherwise the
/// reporting-currency `cost_price` is used. Missing or non-finite input is 0.
pub fn normalize(cost_price: Option<f64>, price_in_foreign_currency: Option<f64>, exchange_rate: f64) -> f64 {
    match price_in_foreign_currency.filter(|p| p.is_finite() && *p > 0.0) {
        Some(foreign) => finite_or_zero(foreign * exchange_rate),
        None => cost_price.map_or(0.0, finite_or_zero),
    }
}
