//! Cart totals and the platform fee.
//!
//! Amounts are plain `f64` display units; the fee is `subtotal * 0.005`
//! with no fixed-point rounding, and every line satisfies
//! `subtotal + platform_fee == total_amount`.

use crate::models::CartItemPayload;
use alloy::primitives::U256;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// 0.5%
pub const PLATFORM_FEE_RATE: f64 = 0.005;

pub fn platform_fee(subtotal: f64) -> f64 {
    subtotal * PLATFORM_FEE_RATE
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineAmounts {
    pub subtotal: f64,
    pub platform_fee: f64,
    pub total_amount: f64,
}

pub fn line_amounts(price: f64, quantity: i32) -> LineAmounts {
    let subtotal = price * f64::from(quantity);
    let fee = platform_fee(subtotal);
    LineAmounts {
        subtotal,
        platform_fee: fee,
        total_amount: subtotal + fee,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorTotal {
    pub vendor_id: Uuid,
    pub wallet_address: Option<String>,
    pub subtotal: f64,
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: f64,
    pub platform_fee: f64,
    pub total_amount: f64,
    /// In first-seen cart order
    pub vendor_totals: Vec<VendorTotal>,
}

pub fn compute_cart_totals(items: &[CartItemPayload]) -> CartTotals {
    let mut vendor_totals: Vec<VendorTotal> = Vec::new();
    let mut subtotal = 0.0;

    for item in items {
        let line = item.listing.price * f64::from(item.quantity);
        subtotal += line;

        match vendor_totals.iter_mut().find(|v| v.vendor_id == item.vendor_id) {
            Some(vendor) => {
                vendor.subtotal += line;
                vendor.item_count += 1;
            }
            None => vendor_totals.push(VendorTotal {
                vendor_id: item.vendor_id,
                wallet_address: item.vendor.wallet_address.clone(),
                subtotal: line,
                item_count: 1,
            }),
        }
    }

    let fee = platform_fee(subtotal);
    CartTotals {
        subtotal,
        platform_fee: fee,
        total_amount: subtotal + fee,
        vendor_totals,
    }
}

/// Payment is blocked until the allowance covers the full amount; equality passes.
pub fn requires_approval(allowance: U256, required: U256) -> bool {
    allowance < required
}
