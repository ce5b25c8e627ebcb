//! A set of utilities for working with numbers in the denomination engine.
//!
//! All float-ish to integer conversions in the engine go through here, and they
//! all clamp instead of panicking.

use rust_decimal::prelude::*;

/// Build a `Decimal` literal for exchange rates, requested amounts and
/// multipliers, ie `num!(0.25)`.
#[macro_export]
macro_rules! num {
    ($val:expr) => {
        rust_decimal_macros::dec!($val)
    }
}

/// Multiply two decimals, clamping to the decimal range on overflow.
pub(crate) fn saturating_mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or_else(|| {
        if a.is_sign_negative() != b.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// Divide two decimals. Division by zero yields `None`, overflow clamps.
pub(crate) fn saturating_div(a: Decimal, b: Decimal) -> Option<Decimal> {
    if b.is_zero() {
        return None;
    }
    Some(a.checked_div(b).unwrap_or_else(|| {
        if a.is_sign_negative() != b.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    }))
}

/// Truncate a decimal into an i64, clamping anything out of range.
pub(crate) fn to_i64_saturating(val: Decimal) -> i64 {
    let truncated = val.trunc();
    truncated.to_i64().unwrap_or(if truncated.is_sign_negative() { i64::MIN } else { i64::MAX })
}

/// Truncate a decimal into a u64. Negative values become zero.
pub(crate) fn to_u64_saturating(val: Decimal) -> u64 {
    if val <= Decimal::zero() {
        return 0;
    }
    val.trunc().to_u64().unwrap_or(u64::MAX)
}

/// The modulus used to fold an amount into a denomination's capacity.
pub(crate) fn capacity_modulus(max_amount: i64) -> Decimal {
    Decimal::from(max_amount) + Decimal::one()
}
