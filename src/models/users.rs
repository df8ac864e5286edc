pub use super::_entities::users::{ActiveModel, Entity, Model};
use crate::models::_entities::users;
use loco_rs::auth::jwt;
use loco_rs::hash;
use loco_rs::model::{ModelError, ModelResult};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use sea_orm::TransactionTrait;
use serde_json::Map;
use uuid::Uuid;

pub type Users = Entity;

#[derive(Debug, Clone)]
pub struct RegisterParams {
    pub mobile: String,
    pub username: String,
    pub password: String,
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> std::result::Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            let mut this = self;
            this.pid = Set(Uuid::new_v4());
            Ok(this)
        } else if self.updated_at.is_unchanged() {
            let mut this = self;
            this.updated_at = Set(chrono::Utc::now().into());
            Ok(this)
        } else {
            Ok(self)
        }
    }
}

impl Model {
    /// Finds a user by the JWT subject claim.
    ///
    /// # Errors
    /// When the pid is not a valid uuid or no user matches it.
    pub async fn find_by_pid(db: &DatabaseConnection, pid: &str) -> ModelResult<Self> {
        let parse_uuid = Uuid::parse_str(pid).map_err(|e| ModelError::Any(e.into()))?;
        Entity::find()
            .filter(users::Column::Pid.eq(parse_uuid))
            .one(db)
            .await?
            .ok_or_else(|| ModelError::EntityNotFound)
    }

    /// # Errors
    /// When no user has the given mobile number.
    pub async fn find_by_mobile(db: &DatabaseConnection, mobile: &str) -> ModelResult<Self> {
        Entity::find()
            .filter(users::Column::Mobile.eq(mobile))
            .one(db)
            .await?
            .ok_or_else(|| ModelError::EntityNotFound)
    }

    /// Registers a new user with a hashed password. Fails when the mobile
    /// number or username is already taken.
    ///
    /// # Errors
    /// When the user already exists or the insert fails.
    pub async fn create_with_password(
        db: &DatabaseConnection,
        params: &RegisterParams,
    ) -> ModelResult<Self> {
        let txn = db.begin().await?;

        if Entity::find()
            .filter(users::Column::Mobile.eq(&params.mobile))
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(ModelError::EntityAlreadyExists {});
        }
        if Entity::find()
            .filter(users::Column::Username.eq(&params.username))
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(ModelError::EntityAlreadyExists {});
        }

        let password_hash =
            hash::hash_password(&params.password).map_err(|e| ModelError::Any(e.into()))?;
        let user = ActiveModel {
            mobile: Set(params.mobile.clone()),
            username: Set(params.username.to_lowercase()),
            password: Set(password_hash),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(user)
    }

    #[must_use]
    pub fn verify_password(&self, password: &str) -> bool {
        hash::verify_password(password, &self.password)
    }

    /// # Errors
    /// When the token cannot be signed.
    pub fn generate_jwt(&self, secret: &str, expiration: &u64) -> ModelResult<String> {
        Ok(jwt::JWT::new(secret).generate_token(
            expiration,
            self.pid.to_string(),
            Some(serde_json::Value::Object(Map::new())),
        )?)
    }
}

// implement your write-oriented logic here
impl ActiveModel {}

// implement your custom finders, selectors oriented logic here
impl Entity {}
