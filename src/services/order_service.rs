use crate::entities::{booking_entity as bookings, order_entity as orders};
use crate::error::AppResult;
use crate::models::{OrderQuery, OrderResponse, PaginatedResponse, PaginationParams};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
}

impl OrderService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Settled orders of a user, newest first, each with its bookings.
    pub async fn get_user_orders(
        &self,
        user_id: Uuid,
        query: &OrderQuery,
    ) -> AppResult<PaginatedResponse<OrderResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let total = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .count(&self.pool)
            .await?;

        let page = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        // Limit applies to orders, so bookings are loaded in a second query
        let booking_groups = page.load_many(bookings::Entity, &self.pool).await?;

        let items = page
            .into_iter()
            .zip(booking_groups)
            .map(|(order, bookings)| OrderResponse::from_parts(order, bookings))
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }
}
