use crate::m20250301_100318_albums::Albums;
use crate::sea_orm::EnumIter;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden, EnumIter)]
pub enum Photos {
    Table,
    Id,
    UpdatedAt,
    CreatedAt,
    AlbumId,
    BlobKey,
    FaceScanStatus,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.create_table(
            Table::create()
                .table(Photos::Table)
                .if_not_exists()
                .col(pk_auto(Photos::Id))
                .col(integer(Photos::AlbumId))
                .col(string(Photos::BlobKey))
                // pending | processed_empty | processed_with_faces
                .col(
                    ColumnDef::new(Photos::FaceScanStatus)
                        .string()
                        .not_null()
                        .default("pending"),
                )
                .col(
                    ColumnDef::new(Photos::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::cust("CURRENT_TIMESTAMP")),
                )
                .col(
                    ColumnDef::new(Photos::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::cust("CURRENT_TIMESTAMP")),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_photos_album_id")
                        .from(Photos::Table, Photos::AlbumId)
                        .to(Albums::Table, Albums::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

        m.create_index(
            Index::create()
                .name("idx_photos_face_scan_status")
                .table(Photos::Table)
                .col(Photos::FaceScanStatus)
                .to_owned(),
        )
        .await
    }

    async fn down(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.drop_table(Table::drop().table(Photos::Table).to_owned())
            .await
    }
}
