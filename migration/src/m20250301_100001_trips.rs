use crate::m20220101_000001_users::Users;
use crate::sea_orm::EnumIter;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden, EnumIter)]
pub enum Trips {
    Table,
    Id,
    UpdatedAt,
    CreatedAt,
    Name,
    Code,
    CreatedById,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.create_table(
            Table::create()
                .table(Trips::Table)
                .if_not_exists()
                .col(pk_auto(Trips::Id))
                .col(string(Trips::Name))
                .col(ColumnDef::new(Trips::Code).string().not_null().unique_key())
                .col(integer(Trips::CreatedById))
                .col(
                    ColumnDef::new(Trips::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::cust("CURRENT_TIMESTAMP")),
                )
                .col(
                    ColumnDef::new(Trips::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::cust("CURRENT_TIMESTAMP")),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_trips_created_by_id")
                        .from(Trips::Table, Trips::CreatedById)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await
    }

    async fn down(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.drop_table(Table::drop().table(Trips::Table).to_owned())
            .await
    }
}
