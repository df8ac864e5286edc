use crate::m20220101_000001_users::Users;
use crate::m20250301_100001_trips::Trips;
use crate::sea_orm::EnumIter;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden, EnumIter)]
pub enum TripMembers {
    Table,
    TripId,
    UserId,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.create_table(
            Table::create()
                .table(TripMembers::Table)
                .if_not_exists()
                .col(ColumnDef::new(TripMembers::TripId).integer().not_null())
                .col(ColumnDef::new(TripMembers::UserId).integer().not_null())
                .col(
                    ColumnDef::new(TripMembers::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::cust("CURRENT_TIMESTAMP")),
                )
                .primary_key(
                    Index::create()
                        .name("pk_trip_members")
                        .col(TripMembers::TripId)
                        .col(TripMembers::UserId),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_trip_members_trip_id")
                        .from(TripMembers::Table, TripMembers::TripId)
                        .to(Trips::Table, Trips::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_trip_members_user_id")
                        .from(TripMembers::Table, TripMembers::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await
    }

    async fn down(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.drop_table(Table::drop().table(TripMembers::Table).to_owned())
            .await
    }
}
