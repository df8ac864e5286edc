pub use super::_entities::albums::{ActiveModel, Entity, Model};
use crate::models::_entities::{albums, photos};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use sea_orm::QueryOrder;

pub type Albums = Entity;

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
    /// The most recently uploaded photo, used as the album cover.
    ///
    /// # Errors
    /// On query failure.
    pub async fn cover_photo<C>(&self, db: &C) -> Result<Option<photos::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        photos::Entity::find()
            .filter(photos::Column::AlbumId.eq(self.id))
            .order_by_desc(photos::Column::CreatedAt)
            .one(db)
            .await
    }

    /// # Errors
    /// On query failure.
    pub async fn photo_count<C>(&self, db: &C) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        photos::Entity::find()
            .filter(photos::Column::AlbumId.eq(self.id))
            .count(db)
            .await
    }
}

// implement your write-oriented logic here
impl ActiveModel {}

// implement your custom finders, selectors oriented logic here
impl Entity {
    /// Each member gets one album per trip, created lazily on first upload.
    ///
    /// # Errors
    /// On query or insert failure.
    pub async fn find_or_create_for<C>(db: &C, trip_id: i32, user_id: i32) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        if let Some(album) = Self::find()
            .filter(albums::Column::TripId.eq(trip_id))
            .filter(albums::Column::UserId.eq(user_id))
            .one(db)
            .await?
        {
            return Ok(album);
        }
        ActiveModel {
            trip_id: Set(trip_id),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(db)
        .await
    }
}
