use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("amount is not a finite number")]
    NotFinite,
    #[error("amount {0} cannot be expressed in minor units")]
    OutOfRange(f64),
}

/// Whole nights between check-in and check-out (negative when reversed)
pub fn nights(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Price of a single date-ranged booking: nights × base price
pub fn booking_total(base_price: f64, start: NaiveDate, end: NaiveDate) -> f64 {
    base_price * nights(start, end).max(0) as f64
}

/// Converts a major-unit amount to the processor's integer minor units.
///
/// Rounds half away from zero on the decimal the caller wrote, not on the
/// binary float: `129.995` becomes `13000` even though `129.995 * 100.0` is
/// `12999.499…` in f64.
pub fn to_minor_units(amount: f64) -> Result<i64, PricingError> {
    if !amount.is_finite() {
        return Err(PricingError::NotFinite);
    }

    // f64 Display yields the shortest string that round-trips
    let decimal =
        Decimal::from_str(&amount.to_string()).map_err(|_| PricingError::OutOfRange(amount))?;

    decimal
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .ok_or(PricingError::OutOfRange(amount))
}
