use crate::m20250301_100001_trips::Trips;
use crate::sea_orm::EnumIter;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden, EnumIter)]
pub enum Persons {
    Table,
    Id,
    UpdatedAt,
    CreatedAt,
    TripId,
    Name,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.create_table(
            Table::create()
                .table(Persons::Table)
                .if_not_exists()
                .col(pk_auto(Persons::Id))
                .col(integer(Persons::TripId))
                .col(string(Persons::Name))
                .col(
                    ColumnDef::new(Persons::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::cust("CURRENT_TIMESTAMP")),
                )
                .col(
                    ColumnDef::new(Persons::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::cust("CURRENT_TIMESTAMP")),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_persons_trip_id")
                        .from(Persons::Table, Persons::TripId)
                        .to(Trips::Table, Trips::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await
    }

    async fn down(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.drop_table(Table::drop().table(Persons::Table).to_owned())
            .await
    }
}
