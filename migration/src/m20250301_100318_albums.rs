use crate::m20220101_000001_users::Users;
use crate::m20250301_100001_trips::Trips;
use crate::sea_orm::EnumIter;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden, EnumIter)]
pub enum Albums {
    Table,
    Id,
    UpdatedAt,
    CreatedAt,
    TripId,
    UserId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.create_table(
            Table::create()
                .table(Albums::Table)
                .if_not_exists()
                .col(pk_auto(Albums::Id))
                .col(integer(Albums::TripId))
                .col(integer(Albums::UserId))
                .col(
                    ColumnDef::new(Albums::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::cust("CURRENT_TIMESTAMP")),
                )
                .col(
                    ColumnDef::new(Albums::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::cust("CURRENT_TIMESTAMP")),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_albums_trip_id")
                        .from(Albums::Table, Albums::TripId)
                        .to(Trips::Table, Trips::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_albums_user_id")
                        .from(Albums::Table, Albums::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

        m.create_index(
            Index::create()
                .name("idx_albums_trip_user")
                .table(Albums::Table)
                .col(Albums::TripId)
                .col(Albums::UserId)
                .unique()
                .to_owned(),
        )
        .await
    }

    async fn down(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.drop_table(Table::drop().table(Albums::Table).to_owned())
            .await
    }
}
