//! Conversions between user-facing decimal amounts and integer cents

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::result::{Error, Result};

/// Largest amount a single expense or transfer may carry (one billion in
/// currency units). Keeps group totals far away from the `i64` limit.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Parse a decimal amount such as `12.50` or `12,5` into cents
///
/// At most two decimals are accepted and the amount must not be negative.
pub fn parse_cents(input: &str) -> Result<i64> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return Err(Error::validation("Amount must not be empty"));
    }

    let amount = Decimal::from_str(&normalized)
        .map_err(|_| Error::validation(format!("Invalid amount: {}", input.trim())))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::validation(format!("Amount must not be negative: {}", input.trim())));
    }
    if amount.normalize().scale() > 2 {
        return Err(Error::validation(format!(
            "Amount has more than two decimals: {}",
            input.trim()
        )));
    }

    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| Error::validation(format!("Amount out of range: {}", input.trim())))
}

/// Render cents as a decimal string with two places (`-12.50`)
pub fn format_cents(cents: i64) -> String {
    Decimal::new(cents, 2).to_string()
}
