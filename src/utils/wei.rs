//! Conversion between display amounts and 18-decimal token base units.
//!
//! Amounts are rendered as decimal strings and padded rather than multiplied
//! by `1e18`, so the wei approved for a cart and the wei later charged for it
//! are derived identically and never pick up float rounding.

use crate::error::{AppError, AppResult};
use alloy::primitives::U256;

pub const TOKEN_DECIMALS: usize = 18;

/// Reconstruction error above this is reported as precision loss.
pub const PRECISION_TOLERANCE: f64 = 1e-6;

pub fn amount_to_wei(amount: f64) -> AppResult<U256> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(AppError::ValidationError(format!(
            "Invalid token amount: {amount}"
        )));
    }

    // Display for f64 is the shortest round-trip form and never uses exponents
    let rendered = amount.to_string();
    let (integer, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));

    let mut digits = String::with_capacity(integer.len() + TOKEN_DECIMALS);
    digits.push_str(integer);
    digits.extend(
        fraction
            .chars()
            .chain(std::iter::repeat('0'))
            .take(TOKEN_DECIMALS),
    );

    U256::from_str_radix(&digits, 10)
        .map_err(|e| AppError::ValidationError(format!("Invalid token amount {amount}: {e}")))
}

/// `Number(wei) / 1e18`; display and sanity checks only, never for comparisons.
pub fn wei_to_amount(wei: U256) -> f64 {
    wei.to_string().parse::<f64>().unwrap_or(f64::NAN) / 1e18
}

pub fn format_token_amount(wei: U256) -> String {
    wei_to_amount(wei).to_string()
}

pub fn parse_wei(raw: &str) -> AppResult<U256> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::ValidationError(format!(
            "Amount must be a base-unit integer string, got {raw:?}"
        )));
    }
    U256::from_str_radix(raw, 10)
        .map_err(|e| AppError::ValidationError(format!("Invalid amount {raw:?}: {e}")))
}

/// True when converting `amount` to wei and back drifts by more than the tolerance.
pub fn has_precision_loss(amount: f64, wei: U256) -> bool {
    (wei_to_amount(wei) - amount).abs() > PRECISION_TOLERANCE
}
