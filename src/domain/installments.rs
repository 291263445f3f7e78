//! Installment planning

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::fee_schedule::FeeSchedule;
use crate::domain::value_objects::{round_money, to_decimal};

/// One offerable payment plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstallmentOption {
    pub count: u32,
    pub per_installment_value: Decimal,
    pub is_fee_free: bool,
    /// Always the charged amount; lets a consumer check `per_installment_value × count` row by row.
    pub total_value: Decimal,
}

/// Hard ceiling on installment counts, whatever the schedule or a per-call override asks for.
pub const MAX_INSTALLMENT_COUNT: u32 = 48;

/// Offerable installment counts for a charged amount, ascending.
///
/// The per-installment value only shrinks as the count grows, so the table
/// ends at the first count whose installment falls below
/// `min_installment_value`. A single payment is always offered for a positive
/// amount. Counts above [`MAX_INSTALLMENT_COUNT`] are never offered.
pub fn plan_installments(device_value: Decimal, schedule: &FeeSchedule) -> Vec<InstallmentOption> {
    if device_value <= Decimal::ZERO { return vec![]; }
    let total_value = round_money(device_value);
    let min_value = to_decimal(schedule.min_installment_value);
    let max_count = schedule.max_installments.clamp(1, MAX_INSTALLMENT_COUNT);

    (1..=max_count)
        .map(|count| (count, round_money(total_value / Decimal::from(count))))
        .take_while(|&(count, per_installment_value)| count == 1 || per_installment_value >= min_value)
        .map(|(count, per_installment_value)| InstallmentOption {
            count,
            per_installment_value,
            is_fee_free: count <= schedule.no_fee_installments,
            total_value,
        })
        .collect()
}
