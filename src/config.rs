//! Service configuration and the shared fee schedule

use chrono::Duration;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use validator::Validate;
use crate::domain::fee_schedule::FeeSchedule;
use crate::{PricingError, Result};

/// Supplies the fee schedule for a calculation. Implementations hand out
/// already-validated schedules.
pub trait FeeScheduleSource: Send + Sync {
    fn get_config(&self) -> FeeSchedule;
}

/// Process-wide schedule, replaceable at runtime by an admin.
#[derive(Clone, Debug)]
pub struct SharedFeeSchedule(Arc<RwLock<FeeSchedule>>);

impl SharedFeeSchedule {
    pub fn new(schedule: FeeSchedule) -> Result<Self> {
        schedule.validate()?;
        Ok(Self(Arc::new(RwLock::new(schedule))))
    }

    /// Validate, then swap in `schedule`. On error the current schedule stays.
    pub fn replace(&self, schedule: FeeSchedule) -> Result<()> {
        schedule.validate()?;
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = schedule;
        tracing::info!("fee schedule updated");
        Ok(())
    }
}

impl FeeScheduleSource for SharedFeeSchedule {
    fn get_config(&self) -> FeeSchedule { self.0.read().unwrap_or_else(PoisonError::into_inner).clone() }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub currency_symbol: String,
    pub fee_schedule: FeeSchedule,
    /// Seed rate for the exchange-rate cache.
    pub exchange_rate: Option<f64>,
    pub exchange_rate_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = FeeSchedule::default();
        let fee_schedule = FeeSchedule {
            tax_rate: parse(&lookup, "PRICING_TAX_RATE")?.unwrap_or(defaults.tax_rate),
            processor_rate: parse(&lookup, "PRICING_PROCESSOR_RATE")?.unwrap_or(defaults.processor_rate),
            processor_fixed_fee: parse(&lookup, "PRICING_PROCESSOR_FIXED_FEE")?.unwrap_or(defaults.processor_fixed_fee),
            desired_profit_margin: parse(&lookup, "PRICING_PROFIT_MARGIN")?.unwrap_or(defaults.desired_profit_margin),
            max_installments: parse(&lookup, "PRICING_MAX_INSTALLMENTS")?.unwrap_or(defaults.max_installments),
            no_fee_installments: parse(&lookup, "PRICING_NO_FEE_INSTALLMENTS")?.unwrap_or(defaults.no_fee_installments),
            min_installment_value: parse(&lookup, "PRICING_MIN_INSTALLMENT_VALUE")?.unwrap_or(defaults.min_installment_value),
            tax_base: parse(&lookup, "PRICING_TAX_BASE")?.unwrap_or(defaults.tax_base),
        };
        fee_schedule.validate()?;

        let exchange_rate: Option<f64> = parse(&lookup, "FX_RATE")?;
        if let Some(rate) = exchange_rate {
            if !(rate.is_finite() && rate > 0.0) { return Err(PricingError::InvalidExchangeRate(rate)); }
        }

        let ttl_secs: i64 = parse(&lookup, "FX_RATE_TTL_SECS")?.unwrap_or(3600);
        let exchange_rate_ttl = Duration::try_seconds(ttl_secs)
            .filter(|ttl| *ttl >= Duration::zero())
            .ok_or_else(|| PricingError::InvalidConfig { key: "FX_RATE_TTL_SECS".to_string(), value: ttl_secs.to_string() })?;

        Ok(Self {
            port: parse(&lookup, "PORT")?.unwrap_or(8083),
            currency_symbol: lookup("PRICING_CURRENCY_SYMBOL").unwrap_or_else(|| "$".to_string()),
            fee_schedule,
            exchange_rate,
            exchange_rate_ttl,
        })
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| PricingError::InvalidConfig { key: key.to_string(), value: raw }),
    }
}
