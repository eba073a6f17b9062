use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260901_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ItemRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(text(ItemRequests::Description))
                    .col(big_integer(ItemRequests::RequestorId))
                    .col(
                        timestamp_with_time_zone(ItemRequests::Created)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_requests_requestor_id")
                            .from(ItemRequests::Table, ItemRequests::RequestorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_requests_requestor_id")
                    .table(ItemRequests::Table)
                    .col(ItemRequests::RequestorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_requests_created")
                    .table(ItemRequests::Table)
                    .col(ItemRequests::Created)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItemRequests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum ItemRequests {
    Table,
    Id,
    Description,
    RequestorId,
    Created,
}
