//! Value Objects for pricing

use rust_decimal::prelude::*;

/// Minor currency unit: monetary outputs carry 2 decimal places.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// One minor unit (0.01)
pub const MINOR_UNIT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Replace NaN/Infinity with zero.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 { if value.is_finite() { value } else { 0.0 } }

/// Convert an `f64` intermediate into a `Decimal`. Values `Decimal` cannot
/// represent (non-finite, out of range) become zero.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::debug!(value = ?value, "unrepresentable amount in pricing calculation, using zero");
        Decimal::ZERO
    })
}

/// Round to the minor unit, half-up (away from zero), always carrying two decimals.
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DECIMAL_PLACES);
    rounded
}

/// `f64` intermediate straight to a rounded monetary amount.
#[inline]
pub fn money(value: f64) -> Decimal { round_money(to_decimal(finite_or_zero(value))) }

/// Percentage expressed as a fraction (`15.0` → `0.15`), non-finite as zero.
#[inline]
pub fn fraction(percent: f64) -> f64 { finite_or_zero(percent) / 100.0 }

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_money(Decimal::from_str("2.675").unwrap()), Decimal::from_str("2.68").unwrap());
        assert_eq!(round_money(Decimal::from_str("2.674").unwrap()), Decimal::from_str("2.67").unwrap());
        assert_eq!(round_money(Decimal::from_str("-2.675").unwrap()), Decimal::from_str("-2.68").unwrap());
    }

    #[test]
    fn test_round_money_keeps_two_places() {
        assert_eq!(round_money(Decimal::new(300, 0)).to_string(), "300.00");
        assert_eq!(money(1557.535673), Decimal::new(155754, 2));
    }

    #[test]
    fn test_non_finite_is_zero() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(money(f64::NEG_INFINITY), Decimal::ZERO);
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
    }

    #[test]
    fn test_fraction() {
        assert!((fraction(3.99) - 0.0399).abs() < 1e-12);
        assert_eq!(fraction(f64::NAN), 0.0);
    }
}
