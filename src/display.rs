//! Display strings for the reporting currency

use rust_decimal::Decimal;
use serde::Serialize;
use crate::domain::installments::InstallmentOption;
use crate::domain::pricing::PriceBreakdown;
use crate::domain::value_objects::round_money;

/// `"$1,557.54"`, negatives as `"-$12.00"`.
pub fn format_money(amount: Decimal, symbol: &str) -> String {
    let rounded = round_money(amount);
    let text = rounded.abs().to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 { grouped.push(','); }
        grouped.push(digit);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{symbol}{grouped}.{cents}")
}

/// `"30.00%"`
pub fn format_percent(value: Decimal) -> String { format!("{}%", round_money(value)) }

impl InstallmentOption {
    /// `"6x $50.00 (fee-free)"`
    pub fn label(&self, symbol: &str) -> String {
        let suffix = if self.is_fee_free { " (fee-free)" } else { "" };
        format!("{}x {}{}", self.count, format_money(self.per_installment_value, symbol), suffix)
    }
}

/// Ready-to-render strings for a breakdown.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BreakdownLabels {
    pub ideal_value: String,
    pub device_value: String,
    pub total_fees: String,
    pub profit: String,
    pub profit_margin: String,
    pub installments: Vec<String>,
}

impl BreakdownLabels {
    pub fn new(breakdown: &PriceBreakdown, symbol: &str) -> Self {
        Self {
            ideal_value: format_money(breakdown.ideal_value, symbol),
            device_value: format_money(breakdown.device_value, symbol),
            total_fees: format_money(breakdown.total_fees, symbol),
            profit: format_money(breakdown.profit, symbol),
            profit_margin: format_percent(breakdown.profit_margin_actual),
            installments: breakdown.installments.iter().map(|o| o.label(symbol)).collect(),
        }
    }
}
