pub use super::_entities::photos::{ActiveModel, Entity, Model};
use crate::models::_entities::{albums, photos};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use sea_orm::{IntoActiveModel, QueryOrder};

pub type Photos = Entity;

/// Face-pipeline state of a photo. `Pending` photos are picked up by the
/// next scan; both processed states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceScanStatus {
    Pending,
    ProcessedEmpty,
    ProcessedWithFaces,
}

impl FaceScanStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ProcessedEmpty => "processed_empty",
            Self::ProcessedWithFaces => "processed_with_faces",
        }
    }
}

impl std::fmt::Display for FaceScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> std::result::Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert && self.updated_at.is_unchanged() {
            let mut this = self;
            this.updated_at = Set(chrono::Utc::now().into());
            Ok(this)
        } else {
            Ok(self)
        }
    }
}

impl Model {
    /// Moves the photo out of `Pending`. Run inside the same transaction as
    /// the face writes it concludes.
    ///
    /// # Errors
    /// On update failure.
    pub async fn mark_scanned<C>(&self, db: &C, status: FaceScanStatus) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut this = self.clone().into_active_model();
        this.face_scan_status = Set(status.as_str().to_string());
        this.update(db).await
    }
}

// implement your write-oriented logic here
impl ActiveModel {}

// implement your custom finders, selectors oriented logic here
impl Entity {
    /// # Errors
    /// On query failure.
    pub async fn find_for_album<C>(db: &C, album_id: i32) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find()
            .filter(photos::Column::AlbumId.eq(album_id))
            .order_by_desc(photos::Column::CreatedAt)
            .all(db)
            .await
    }

    /// All photos of a trip that no scan has handled yet, oldest first so
    /// clusters grow in upload order.
    ///
    /// # Errors
    /// On query failure.
    pub async fn find_pending_for_trip<C>(db: &C, trip_id: i32) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find()
            .inner_join(albums::Entity)
            .filter(albums::Column::TripId.eq(trip_id))
            .filter(photos::Column::FaceScanStatus.eq(FaceScanStatus::Pending.as_str()))
            .order_by_asc(photos::Column::Id)
            .all(db)
            .await
    }

    /// The trip a photo belongs to, via its album.
    ///
    /// # Errors
    /// On query failure.
    pub async fn trip_id_of<C>(db: &C, photo: &Model) -> Result<Option<i32>, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(albums::Entity::find_by_id(photo.album_id)
            .one(db)
            .await?
            .map(|album| album.trip_id))
    }
}
