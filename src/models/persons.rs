pub use super::_entities::persons::{ActiveModel, Entity, Model};
use crate::models::_entities::{faces, persons};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use sea_orm::{IntoActiveModel, QueryOrder};

pub type Persons = Entity;

const UNKNOWN_PREFIX: &str = "Unknown";

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
    /// The first face ever recorded for this person. It serves as the
    /// cluster thumbnail and as the reference image in comparison calls.
    ///
    /// # Errors
    /// On query failure.
    pub async fn representative_face<C>(&self, db: &C) -> Result<Option<faces::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        faces::Entity::find()
            .filter(faces::Column::PersonId.eq(self.id))
            .order_by_asc(faces::Column::Id)
            .one(db)
            .await
    }

    /// # Errors
    /// On query failure.
    pub async fn face_count<C>(&self, db: &C) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        faces::Entity::find()
            .filter(faces::Column::PersonId.eq(self.id))
            .count(db)
            .await
    }

    /// # Errors
    /// On update failure.
    pub async fn rename<C>(&self, db: &C, name: &str) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut this = self.clone().into_active_model();
        this.name = Set(name.to_string());
        this.update(db).await
    }
}

// implement your write-oriented logic here
impl ActiveModel {
    /// Creates a new identity cluster with the next free placeholder name.
    ///
    /// # Errors
    /// On query or insert failure.
    pub async fn create_unknown<C>(db: &C, trip_id: i32) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let name = Entity::next_unknown_name(db, trip_id).await?;
        ActiveModel {
            trip_id: Set(trip_id),
            name: Set(name),
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
    pub async fn find_by_trip<C>(db: &C, trip_id: i32) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find()
            .filter(persons::Column::TripId.eq(trip_id))
            .order_by_asc(persons::Column::Id)
            .all(db)
            .await
    }

    /// `"Unknown Person {k}"` where k counts the trip's existing
    /// `Unknown`-prefixed names, plus one.
    ///
    /// # Errors
    /// On query failure.
    pub async fn next_unknown_name<C>(db: &C, trip_id: i32) -> Result<String, DbErr>
    where
        C: ConnectionTrait,
    {
        let unknown_count = Self::find()
            .filter(persons::Column::TripId.eq(trip_id))
            .filter(persons::Column::Name.starts_with(UNKNOWN_PREFIX))
            .count(db)
            .await?;
        Ok(format!("Unknown Person {}", unknown_count + 1))
    }
}
