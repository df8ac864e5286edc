pub use super::_entities::faces::{ActiveModel, Entity, Model};
use crate::models::_entities::faces;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use sea_orm::QueryOrder;

pub type Faces = Entity;

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

// implement your read-oriented logic here
impl Model {}

// implement your write-oriented logic here
impl ActiveModel {
    /// Links a stored crop to its photo and person. The assignment is
    /// immutable once written.
    ///
    /// # Errors
    /// On insert failure.
    pub async fn create<C>(
        db: &C,
        photo_id: i32,
        person_id: i32,
        crop_key: &str,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        ActiveModel {
            photo_id: Set(photo_id),
            person_id: Set(person_id),
            crop_key: Set(crop_key.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
    }
}

// implement your custom finders, selectors oriented logic here
impl Entity {
    /// # Errors
    /// On query failure.
    pub async fn find_by_photo<C>(db: &C, photo_id: i32) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find()
            .filter(faces::Column::PhotoId.eq(photo_id))
            .order_by_asc(faces::Column::Id)
            .all(db)
            .await
    }

    /// # Errors
    /// On query failure.
    pub async fn find_by_person<C>(db: &C, person_id: i32) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find()
            .filter(faces::Column::PersonId.eq(person_id))
            .order_by_asc(faces::Column::Id)
            .all(db)
            .await
    }
}
