pub use super::_entities::trips::{ActiveModel, Entity, Model};
use crate::models::_entities::{trip_members, trips};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use sea_orm::QueryOrder;

pub type Trips = Entity;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 6;

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

impl ActiveModelBehavior for trip_members::ActiveModel {}

impl Model {
    /// # Errors
    /// On query failure.
    pub async fn is_member<C>(&self, db: &C, user_id: i32) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(trip_members::Entity::find_by_id((self.id, user_id))
            .one(db)
            .await?
            .is_some())
    }

    /// Adds a user to the trip. A no-op for existing members.
    ///
    /// # Errors
    /// On insert failure.
    pub async fn add_member<C>(&self, db: &C, user_id: i32) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        if self.is_member(db, user_id).await? {
            return Ok(());
        }
        trip_members::ActiveModel {
            trip_id: Set(self.id),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(())
    }
}

// implement your write-oriented logic here
impl ActiveModel {}

// implement your custom finders, selectors oriented logic here
impl Entity {
    /// # Errors
    /// On query failure.
    pub async fn find_by_code<C>(db: &C, code: &str) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find()
            .filter(trips::Column::Code.eq(code))
            .one(db)
            .await
    }

    /// All trips the user is a member of, newest first.
    ///
    /// # Errors
    /// On query failure.
    pub async fn find_for_user<C>(db: &C, user_id: i32) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find()
            .inner_join(trip_members::Entity)
            .filter(trip_members::Column::UserId.eq(user_id))
            .order_by_desc(trips::Column::CreatedAt)
            .all(db)
            .await
    }

    /// Generates a join code that is not yet taken.
    ///
    /// # Errors
    /// On query failure.
    pub async fn generate_code<C>(db: &C) -> Result<String, DbErr>
    where
        C: ConnectionTrait,
    {
        loop {
            let code: String = (0..CODE_LEN)
                .map(|_| CODE_ALPHABET[fastrand::usize(0..CODE_ALPHABET.len())] as char)
                .collect();
            if Self::find_by_code(db, &code).await?.is_none() {
                return Ok(code);
            }
        }
    }
}
