use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub listing_id: Uuid,
    pub vendor_id: Uuid,
    /// Ticket holder: the recipient for gifts, the payer otherwise.
    /// `None` only for a gift whose recipient profile could not be created.
    pub user_id: Option<Uuid>,
    pub gifted_by: Option<Uuid>,
    pub quantity: i32,
    pub booking_date: Option<NaiveDate>,
    pub subtotal: f64,
    pub platform_fee: f64,
    pub total_amount: f64,
    pub status: String,
    pub is_gift: bool,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
    pub recipient_wallet: Option<String>,
    pub gift_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Order,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
