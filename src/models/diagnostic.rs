use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorDiagnostic {
    pub vendor_id: Uuid,
    pub wallet_address: Option<String>,
    pub whitelisted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemDiagnostic {
    pub item_id: Uuid,
    pub listing_title: String,
    pub price: f64,
    pub quantity: i32,
    pub vendor_address_valid: bool,
    pub vendor_verified: bool,
    pub is_gift: bool,
    pub recipient_wallet_valid: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDiagnostic {
    pub platform_wallet: String,
    pub platform_fee_bps: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub wallet_address: String,
    pub contract_address: String,
    pub subtotal: f64,
    pub platform_fee: f64,
    pub total_amount: f64,
    /// base units
    pub required_amount: String,
    pub balance: String,
    pub allowance: String,
    pub has_sufficient_balance: bool,
    pub needs_approval: bool,
    pub precision_loss: bool,
    pub vendors: Vec<VendorDiagnostic>,
    pub items: Vec<ItemDiagnostic>,
    pub platform: Option<PlatformDiagnostic>,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub can_proceed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResponse {
    pub success: bool,
    pub diagnostics: DiagnosticReport,
    pub message: String,
}
