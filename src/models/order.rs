use crate::entities::{booking_entity, order_entity};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const ORDER_STATUS_CONFIRMED: &str = "confirmed";
pub const BOOKING_STATUS_CONFIRMED: &str = "confirmed";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub vendor_id: Uuid,
    pub user_id: Option<Uuid>,
    pub quantity: i32,
    pub booking_date: Option<NaiveDate>,
    pub subtotal: f64,
    pub platform_fee: f64,
    pub total_amount: f64,
    pub status: String,
    pub is_gift: bool,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub total_amount: f64,
    pub platform_fee_total: f64,
    pub wallet_address: String,
    pub transaction_hash: String,
    pub status: String,
    pub nft_batch_contract_address: Option<String>,
    pub nft_batch_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub bookings: Vec<BookingResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl From<booking_entity::Model> for BookingResponse {
    fn from(m: booking_entity::Model) -> Self {
        Self {
            id: m.id,
            listing_id: m.listing_id,
            vendor_id: m.vendor_id,
            user_id: m.user_id,
            quantity: m.quantity,
            booking_date: m.booking_date,
            subtotal: m.subtotal,
            platform_fee: m.platform_fee,
            total_amount: m.total_amount,
            status: m.status,
            is_gift: m.is_gift,
            recipient_name: m.recipient_name,
            recipient_email: m.recipient_email,
        }
    }
}

impl OrderResponse {
    pub fn from_parts(m: order_entity::Model, bookings: Vec<booking_entity::Model>) -> Self {
        Self {
            id: m.id,
            total_amount: m.total_amount,
            platform_fee_total: m.platform_fee_total,
            wallet_address: m.wallet_address,
            transaction_hash: m.transaction_hash,
            status: m.status,
            nft_batch_contract_address: m.nft_batch_contract_address,
            nft_batch_id: m.nft_batch_id,
            created_at: m.created_at,
            bookings: bookings.into_iter().map(BookingResponse::from).collect(),
        }
    }
}
