use crate::utils::pricing::CartTotals;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartListing {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartVendor {
    pub id: Uuid,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

/// A cart row with its listing and vendor denormalised. Clients echo it back to
/// the payment and diagnostic endpoints, which only trust `id` and reload the
/// rest from the caller's stored cart.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItemPayload {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub vendor_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub booking_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_gift: bool,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub recipient_email: Option<String>,
    #[serde(default)]
    pub recipient_phone: Option<String>,
    #[serde(default)]
    pub recipient_wallet: Option<String>,
    #[serde(default)]
    pub gift_message: Option<String>,
    pub listing: CartListing,
    pub vendor: CartVendor,
}

impl CartItemPayload {
    pub fn recipient_wallet(&self) -> Option<&str> {
        self.recipient_wallet
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItemPayload>,
    pub totals: CartTotals,
}
