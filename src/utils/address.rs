use crate::error::{AppError, AppResult};
use alloy::primitives::Address;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static EVM_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid address pattern"));

pub fn is_valid_address(value: &str) -> bool {
    EVM_ADDRESS.is_match(value)
}

pub fn parse_address(value: &str, what: &str) -> AppResult<Address> {
    let value = value.trim();
    if !is_valid_address(value) {
        return Err(AppError::ValidationError(format!(
            "Invalid {what} address: {value}"
        )));
    }
    Address::from_str(value)
        .map_err(|e| AppError::ValidationError(format!("Invalid {what} address {value}: {e}")))
}
