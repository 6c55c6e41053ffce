use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum UserWallets {
    Table,
    Id,
    UserId,
    Address,
    EncryptedPrivateKey,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Custodial wallets; the key is AES-256-GCM sealed and bound to (user_id, email)
        manager
            .create_table(
                Table::create()
                    .table(UserWallets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserWallets::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(UserWallets::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UserWallets::Address).string().not_null())
                    .col(
                        ColumnDef::new(UserWallets::EncryptedPrivateKey)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserWallets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserWallets::Table).to_owned())
            .await?;
        Ok(())
    }
}
