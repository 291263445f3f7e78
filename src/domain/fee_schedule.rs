//! Fee schedule and merchant installment terms

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::lenient;

/// Amount the tax is extracted from when decomposing a charged price.
///
/// Pricing marks the cost up by the tax before dividing out the processor
/// fee, so only `NetOfProcessorFee` gives back exactly the desired margin on
/// an undiscounted price. `GrossCharge` is the legacy extraction from the
/// whole charged amount; it under-reports profit even with no discount and
/// must not become the default again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBase {
    /// Charged amount minus the processor fee. Reproduces the desired margin exactly.
    #[default]
    NetOfProcessorFee,
    /// The whole charged amount.
    GrossCharge,
}

impl std::str::FromStr for TaxBase {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "net_of_processor_fee" | "net" => Ok(Self::NetOfProcessorFee),
            "gross_charge" | "gross" => Ok(Self::GrossCharge),
            other => Err(format!("unknown tax base '{other}'")),
        }
    }
}

/// Processor fees, tax and merchant pricing terms applied to one calculation.
///
/// Ranges are checked with [`Validate`] by whoever owns the schedule
/// (configuration loading, the admin endpoint). The pricing engine accepts
/// any values and degrades instead of failing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_terms"))]
pub struct FeeSchedule {
    #[validate(range(min = 0.0, max = 100.0))]
    pub tax_rate: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub processor_rate: f64,
    #[validate(range(min = 0.0))]
    pub processor_fixed_fee: f64,
    #[validate(range(min = 0.0))]
    pub desired_profit_margin: f64,
    /// At most `installments::MAX_INSTALLMENT_COUNT`.
    #[validate(range(min = 1, max = 48))]
    pub max_installments: u32,
    pub no_fee_installments: u32,
    pub min_installment_value: f64,
    #[serde(default)]
    pub tax_base: TaxBase,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            tax_rate: 0.0, processor_rate: 0.0, processor_fixed_fee: 0.0, desired_profit_margin: 0.0,
            max_installments: 12, no_fee_installments: 3, min_installment_value: 5.0, tax_base: TaxBase::default(),
        }
    }
}

fn validate_terms(schedule: &FeeSchedule) -> Result<(), ValidationError> {
    if schedule.processor_rate >= 100.0 { return Err(ValidationError::new("processor_rate_must_be_below_100")); }
    if schedule.no_fee_installments > schedule.max_installments { return Err(ValidationError::new("no_fee_installments_exceeds_max")); }
    if !(schedule.min_installment_value > 0.0) { return Err(ValidationError::new("min_installment_value_must_be_positive")); }
    Ok(())
}

/// Per-call replacements for any [`FeeSchedule`] field. Present values win.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeScheduleOverrides {
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub processor_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub processor_fixed_fee: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub desired_profit_margin: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_count", skip_serializing_if = "Option::is_none")]
    pub max_installments: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_count", skip_serializing_if = "Option::is_none")]
    pub no_fee_installments: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub min_installment_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_base: Option<TaxBase>,
}

impl FeeScheduleOverrides {
    pub fn is_empty(&self) -> bool { self == &Self::default() }

    /// Layer these overrides on top of `base`.
    pub fn apply(&self, base: &FeeSchedule) -> FeeSchedule {
        FeeSchedule {
            tax_rate: self.tax_rate.unwrap_or(base.tax_rate),
            processor_rate: self.processor_rate.unwrap_or(base.processor_rate),
            processor_fixed_fee: self.processor_fixed_fee.unwrap_or(base.processor_fixed_fee),
            desired_profit_margin: self.desired_profit_margin.unwrap_or(base.desired_profit_margin),
            max_installments: self.max_installments.unwrap_or(base.max_installments),
            no_fee_installments: self.no_fee_installments.unwrap_or(base.no_fee_installments),
            min_installment_value: self.min_installment_value.unwrap_or(base.min_installment_value),
            tax_base: self.tax_base.unwrap_or(base.tax_base),
        }
    }
}
