use crate::m20250301_100544_photos::Photos;
use crate::m20250301_101027_persons::Persons;
use crate::sea_orm::EnumIter;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden, EnumIter)]
pub enum Faces {
    Table,
    Id,
    UpdatedAt,
    CreatedAt,
    PhotoId,
    PersonId,
    CropKey,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.create_table(
            Table::create()
                .table(Faces::Table)
                .if_not_exists()
                .col(pk_auto(Faces::Id))
                .col(integer(Faces::PhotoId))
                .col(integer(Faces::PersonId))
                .col(string(Faces::CropKey))
                .col(
                    ColumnDef::new(Faces::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::cust("CURRENT_TIMESTAMP")),
                )
                .col(
                    ColumnDef::new(Faces::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::cust("CURRENT_TIMESTAMP")),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_faces_photo_id")
                        .from(Faces::Table, Faces::PhotoId)
                        .to(Photos::Table, Photos::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_faces_person_id")
                        .from(Faces::Table, Faces::PersonId)
                        .to(Persons::Table, Persons::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

        m.create_index(
            Index::create()
                .name("idx_faces_photo_id")
                .table(Faces::Table)
                .col(Faces::PhotoId)
                .to_owned(),
        )
        .await?;

        m.create_index(
            Index::create()
                .name("idx_faces_person_id")
                .table(Faces::Table)
                .col(Faces::PersonId)
                .to_owned(),
        )
        .await
    }

    async fn down(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.drop_table(Table::drop().table(Faces::Table).to_owned())
            .await
    }
}
