//! Storefront Pricing
//!
//! Retail price derivation and installment planning for the storefront.
//!
//! ## Features
//! - Inverse pricing: the price that leaves the desired margin after tax and processor fees
//! - Discounts with realized-margin reporting
//! - Installment tables with fee-free flags and a minimum installment value
//! - Foreign-currency costs normalized with a spot or cached rate
//! - Pricing-preview HTTP API for the admin and checkout screens

pub mod api;
pub mod config;
pub mod display;
pub mod domain;
pub mod lenient;

pub use config::{AppConfig, FeeScheduleSource, SharedFeeSchedule};
pub use domain::exchange::{normalize, CachedRate, ExchangeRateQuote, ExchangeRateSource, ManualRate};
pub use domain::fee_schedule::{FeeSchedule, FeeScheduleOverrides, TaxBase};
pub use domain::installments::{plan_installments, InstallmentOption};
pub use domain::pricing::{calculate, derive_price, PriceBreakdown, PriceInput};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Invalid fee schedule: {0}")]
    InvalidFeeSchedule(#[from] validator::ValidationErrors),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidConfig { key: String, value: String },

    #[error("Exchange rate must be a positive number, got {0}")]
    InvalidExchangeRate(f64),
}

pub type Result<T> = std::result::Result<T, PricingError>;
