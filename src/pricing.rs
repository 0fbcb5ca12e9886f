//! Pricing arithmetic
//!
//! Shared minor-unit arithmetic used by the cart and the invoice calculator. Amounts are
//! carried as [`Money`] at the edges and as `i64` minor units in between, with every
//! operation checked so an overflow surfaces as [`PricingError::Overflow`] instead of
//! wrapping.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Seconds in one hour, used when converting slot durations to billable hours.
const SECONDS_PER_HOUR: i64 = 3_600;

/// Errors raised by pricing arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// An amount was in a different currency than the one being priced (found, expected).
    #[error("amount has currency {0}, expected {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// An intermediate value could not be represented.
    #[error("pricing arithmetic overflowed")]
    Overflow,
}

/// Standard GST rate applied to bookings (18%).
pub fn standard_gst() -> Percentage {
    Percentage::from(Decimal::new(18, 2))
}

/// Share of the grand total collected up front (20%); the rest is paid on site.
pub fn advance_share() -> Percentage {
    Percentage::from(Decimal::new(20, 2))
}

/// Build a fractional percentage from percent points (e.g. `18` -> 18%).
pub fn percent_points(points: Decimal) -> Percentage {
    Percentage::from(points / Decimal::ONE_HUNDRED)
}

/// Converts a fractional percentage back to percent points for display.
pub fn points_of(percentage: Percentage) -> Decimal {
    (percentage * Decimal::ONE) * Decimal::ONE_HUNDRED
}

/// Fail unless `money` is denominated in `currency`.
///
/// # Errors
///
/// Returns [`PricingError::CurrencyMismatch`] when the currencies differ.
pub fn ensure_currency(money: &Money<'_, Currency>, currency: &Currency) -> Result<(), PricingError> {
    if money.currency() == currency {
        Ok(())
    } else {
        Err(PricingError::CurrencyMismatch(
            money.currency().iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}

/// Unit price multiplied by quantity, in minor units.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the product does not fit in an `i64`.
pub fn line_total(unit_price: &Money<'_, Currency>, quantity: u32) -> Result<i64, PricingError> {
    unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)
}

/// Billable hours between two offsets expressed in seconds.
pub fn hours_from_seconds(seconds: i64) -> Decimal {
    Decimal::from(seconds.max(0)) / Decimal::from(SECONDS_PER_HOUR)
}

/// Hourly rate multiplied by a (possibly fractional) number of hours, rounded to whole
/// minor units.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the charge cannot be represented.
pub fn hourly_charge(rate: &Money<'_, Currency>, hours: Decimal) -> Result<i64, PricingError> {
    Decimal::from(rate.to_minor_units())
        .checked_mul(hours)
        .ok_or(PricingError::Overflow)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::Overflow)
}

/// Apply `percent` to an amount given in minor units and round the result to whole major
/// units of `currency` (whole rupees for INR), returning minor units.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if any intermediate value cannot be represented.
pub fn percent_of_major(
    percent: Percentage,
    minor: i64,
    currency: &Currency,
) -> Result<i64, PricingError> {
    let unit = minor_per_major(currency)?;

    let major = Decimal::from(minor)
        .checked_div(unit)
        .ok_or(PricingError::Overflow)?;

    (percent * Decimal::ONE)
        .checked_mul(major)
        .ok_or(PricingError::Overflow)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(unit)
        .and_then(|value| value.to_i64())
        .ok_or(PricingError::Overflow)
}

/// Checked sum of minor-unit amounts.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the sum does not fit in an `i64`.
pub fn checked_sum(amounts: impl IntoIterator<Item = i64>) -> Result<i64, PricingError> {
    amounts
        .into_iter()
        .try_fold(0_i64, |acc, amount| acc.checked_add(amount))
        .ok_or(PricingError::Overflow)
}

fn minor_per_major(currency: &Currency) -> Result<Decimal, PricingError> {
    10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .ok_or(PricingError::Overflow)
}
