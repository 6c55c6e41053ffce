use crate::entities::{
    cart_item_entity as cart_items, listing_entity as listings, vendor_entity as vendors,
};
use crate::error::{AppError, AppResult};
use crate::models::{CartItemPayload, CartListing, CartResponse, CartVendor};
use crate::utils::compute_cart_totals;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct CartService {
    pool: DatabaseConnection,
}

impl CartService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Cart rows in the payload shape the payment endpoints accept, with totals.
    pub async fn get_cart(&self, user_id: Uuid) -> AppResult<CartResponse> {
        let items = self.load_items(user_id, None).await?;
        let totals = compute_cart_totals(&items);
        Ok(CartResponse { items, totals })
    }

    /// Reloads the requested cart items from the caller's own cart, in request
    /// order. Price, vendor and payout wallet come from the stored listing and
    /// vendor; only the ids of `requested` are used.
    pub async fn resolve_items(
        &self,
        user_id: Uuid,
        requested: &[CartItemPayload],
    ) -> AppResult<Vec<CartItemPayload>> {
        let ids: Vec<Uuid> = requested.iter().map(|item| item.id).collect();
        let mut stored: HashMap<Uuid, CartItemPayload> = self
            .load_items(user_id, Some(ids.clone()))
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        ids.into_iter()
            .map(|id| {
                stored.remove(&id).ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "Cart item {id} is not in your cart or is no longer available"
                    ))
                })
            })
            .collect()
    }

    async fn load_items(
        &self,
        user_id: Uuid,
        ids: Option<Vec<Uuid>>,
    ) -> AppResult<Vec<CartItemPayload>> {
        let mut query = cart_items::Entity::find().filter(cart_items::Column::UserId.eq(user_id));
        if let Some(ids) = ids {
            query = query.filter(cart_items::Column::Id.is_in(ids));
        }
        let rows = query
            .order_by_asc(cart_items::Column::CreatedAt)
            .find_also_related(listings::Entity)
            .all(&self.pool)
            .await?;

        // The listing owns the vendor; the cart row's own vendor_id is not trusted
        let vendor_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(_, listing)| listing.as_ref().map(|l| l.vendor_id))
            .collect();
        let vendors: HashMap<Uuid, vendors::Model> = vendors::Entity::find()
            .filter(vendors::Column::Id.is_in(vendor_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();

        let mut items = Vec::with_capacity(rows.len());
        for (item, listing) in rows {
            let Some(listing) = listing else {
                log::warn!("Cart item {} references a missing listing", item.id);
                continue;
            };
            let vendor = vendors.get(&listing.vendor_id);

            items.push(CartItemPayload {
                id: item.id,
                listing_id: listing.id,
                vendor_id: listing.vendor_id,
                quantity: item.quantity,
                booking_date: item.booking_date,
                is_gift: item.is_gift,
                recipient_name: item.recipient_name,
                recipient_email: item.recipient_email,
                recipient_phone: item.recipient_phone,
                recipient_wallet: item.recipient_wallet,
                gift_message: item.gift_message,
                listing: CartListing {
                    id: listing.id,
                    title: listing.title,
                    price: listing.price,
                },
                vendor: CartVendor {
                    id: listing.vendor_id,
                    business_name: vendor.map(|v| v.business_name.clone()),
                    wallet_address: vendor.and_then(|v| v.wallet_address.clone()),
                    is_verified: vendor.is_some_and(|v| v.is_verified),
                },
            });
        }
        Ok(items)
    }
}
