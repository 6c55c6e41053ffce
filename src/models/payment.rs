use crate::models::CartItemPayload;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    #[serde(default)]
    pub cart_items: Vec<CartItemPayload>,
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub use_external_wallet: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentResponse {
    pub success: bool,
    pub order_id: Uuid,
    pub transaction_hash: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDiagnosticRequest {
    #[serde(default)]
    pub cart_items: Vec<CartItemPayload>,
    pub user_id: Option<Uuid>,
}
