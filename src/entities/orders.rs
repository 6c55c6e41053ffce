use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// One successful on-chain payment. Never rolled back once written.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: f64,
    pub platform_fee_total: f64,
    pub wallet_address: String,
    /// `contract_<blockchain order id>`
    pub transaction_hash: String,
    pub status: String,
    pub nft_batch_contract_address: Option<String>,
    pub nft_batch_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
