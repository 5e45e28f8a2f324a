//! Conversion between boundary decimals (major units) and ledger integers
//! (minor units, scale 100).
//!
//! The ledger never holds a floating-point or decimal amount; everything is
//! `i64` minor units. Decimals exist only at the HTTP boundary, and the
//! conversion must round-trip exactly for any integer minor-unit value.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Convert a major-unit decimal to minor units, rounding half away from
/// zero at the hundredths digit. Returns `None` when the value does not
/// fit an `i64`.
pub fn to_minor(major: Decimal) -> Option<i64> {
    major
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Convert minor units back to a major-unit decimal. Exact.
pub fn to_major(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}
