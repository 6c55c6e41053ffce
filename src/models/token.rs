use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatusQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatusResponse {
    pub success: bool,
    pub wallet_address: String,
    pub contract_address: String,
    /// base units
    pub balance: String,
    /// base units
    pub allowance: String,
    pub balance_formatted: String,
    pub allowance_formatted: String,
    pub needs_wallet_creation: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenApprovalRequest {
    /// base units as a decimal string
    pub amount: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenApprovalResponse {
    pub success: bool,
    pub transaction_hash: String,
    /// allowance after approval, base units
    pub allowance: String,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletRequest {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletResponse {
    pub success: bool,
    pub wallet_address: String,
}
