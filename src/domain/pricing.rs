//! Retail price derivation
//!
//! Works backwards from a cost and a target margin to the price a customer
//! must be charged so that, after the payment processor takes its percentage
//! and fixed fee and the tax is set aside, the merchant keeps cost plus margin:
//!
//! ```text
//! ideal × (1 − processor_rate) − fixed_fee = cost × (1 + margin) × (1 + tax_rate)
//! ```
//!
//! The charged amount (after any discount) is then decomposed again into tax,
//! processor fee and what the merchant actually keeps, so a discount shows up
//! as a lower realized margin. Intermediates stay in `f64`; every monetary
//! output is rounded to the minor unit. Nothing here fails: degenerate numbers
//! resolve to zero for the affected field.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::domain::exchange::normalize;
use crate::domain::fee_schedule::{FeeSchedule, FeeScheduleOverrides, TaxBase};
use crate::domain::installments::{plan_installments, InstallmentOption};
use crate::domain::value_objects::{finite_or_zero, fraction, money};
use crate::lenient;

// =============================================================================
// Input / Output
// =============================================================================

/// One pricing request: a cost (direct or foreign), an optional discount and
/// optional replacements for the configured fee schedule.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PriceInput {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub cost_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price_in_foreign_currency: Option<f64>,
    /// Per-call rate; wins over the service's quoted rate.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub exchange_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub discount_percent: Option<f64>,
    #[serde(default)]
    pub overrides: FeeScheduleOverrides,
}

impl PriceInput {
    pub fn from_cost(cost_price: f64) -> Self { Self { cost_price: Some(cost_price), ..Self::default() } }
    pub fn with_discount(mut self, discount_percent: f64) -> Self { self.discount_percent = Some(discount_percent); self }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Cost in the reporting currency.
    pub cost_price: Decimal,
    /// Price before discount.
    pub ideal_value: Decimal,
    /// Amount charged to the customer.
    pub device_value: Decimal,
    pub tax_amount: Decimal,
    pub processor_fee_amount: Decimal,
    pub total_fees: Decimal,
    /// What the merchant keeps after tax and processor fee.
    pub real_value: Decimal,
    pub profit: Decimal,
    /// Realized profit as a percentage of cost.
    pub profit_margin_actual: Decimal,
    pub installments: Vec<InstallmentOption>,
}

impl PriceBreakdown {
    pub fn zero() -> Self {
        let zero = Decimal::new(0, 2);
        Self {
            cost_price: zero, ideal_value: zero, device_value: zero, tax_amount: zero, processor_fee_amount: zero,
            total_fees: zero, real_value: zero, profit: zero, profit_margin_actual: zero, installments: vec![],
        }
    }

    pub fn is_zero(&self) -> bool { self.cost_price.is_zero() && self.device_value.is_zero() }
}

impl Default for PriceBreakdown { fn default() -> Self { Self::zero() } }

// =============================================================================
// Engine
// =============================================================================

/// Derive the retail price for `normalized_cost` and decompose it.
pub fn derive_price(normalized_cost: f64, schedule: &FeeSchedule, discount_percent: f64) -> PriceBreakdown {
    if !(normalized_cost.is_finite() && normalized_cost > 0.0) {
        debug!(normalized_cost, "no positive cost, returning zero breakdown");
        return PriceBreakdown::zero();
    }

    let tax_rate = fraction(schedule.tax_rate);
    let processor_rate = fraction(schedule.processor_rate);
    let fixed_fee = finite_or_zero(schedule.processor_fixed_fee);

    let profit_multiplier = 1.0 + fraction(schedule.desired_profit_margin);
    let tax_multiplier = 1.0 + tax_rate;
    let processor_multiplier = 1.0 - processor_rate;

    // processor_rate >= 100% has no solution; NaN.max(0.0) is 0.0
    let ideal_value = finite_or_zero((normalized_cost * profit_multiplier * tax_multiplier + fixed_fee) / processor_multiplier).max(0.0);
    if ideal_value == 0.0 {
        debug!(processor_rate = schedule.processor_rate, "degenerate fee schedule, ideal value resolved to zero");
    }

    let discount = fraction(discount_percent).clamp(0.0, 1.0);
    let device_value = ideal_value * (1.0 - discount);

    let processor_fee = finite_or_zero(device_value * processor_rate + fixed_fee);
    let tax_amount = finite_or_zero(match schedule.tax_base {
        TaxBase::NetOfProcessorFee => ((device_value - processor_fee) * tax_rate / tax_multiplier).max(0.0),
        TaxBase::GrossCharge => device_value * tax_rate / tax_multiplier,
    });
    let profit = device_value - tax_amount - processor_fee - normalized_cost;
    let profit_margin_actual = finite_or_zero(profit / normalized_cost * 100.0);

    // Compose totals from rounded parts so they add up to the cent
    let device = money(device_value);
    let tax = money(tax_amount);
    let processor_fee = money(processor_fee);
    let total_fees = tax + processor_fee;
    let real_value = device - total_fees;
    let cost = money(normalized_cost);

    PriceBreakdown {
        cost_price: cost,
        ideal_value: money(ideal_value),
        device_value: device,
        tax_amount: tax,
        processor_fee_amount: processor_fee,
        total_fees,
        real_value,
        profit: real_value - cost,
        profit_margin_actual: money(profit_margin_actual),
        installments: plan_installments(device, schedule),
    }
}

/// Full pipeline for one request: apply overrides, resolve the exchange rate,
/// normalize the cost, derive the price and plan installments.
///
/// `quoted_rate` is the service's current rate snapshot; the request's own
/// `exchange_rate` wins over it. With neither, a foreign price normalizes to 0.
pub fn calculate(input: &PriceInput, base: &FeeSchedule, quoted_rate: Option<f64>) -> PriceBreakdown {
    let schedule = input.overrides.apply(base);
    let exchange_rate = input.exchange_rate.or(quoted_rate).unwrap_or(0.0);
    let cost = normalize(input.cost_price, input.price_in_foreign_currency, exchange_rate);
    derive_price(cost, &schedule, input.discount_percent.unwrap_or(0.0))
}
