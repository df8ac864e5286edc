use axum::debug_handler;
use derive_more::with_trait::Constructor;
use loco_rs::prelude::*;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::common::blob_store::{BlobStore, FsBlobStore};
use crate::common::settings::Settings;
use crate::models::_entities::albums;
use crate::models::{trips, users};

const COVER_URL_TTL_SECS: u64 = 3600;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripPayload {
    #[validate(length(min = 1, max = 100, message = "trip name is required"))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinTripPayload {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub id: i32,
    pub name: String,
    pub code: String,
}

impl From<&trips::Model> for TripResponse {
    fn from(trip: &trips::Model) -> Self {
        Self {
            id: trip.id,
            name: trip.name.clone(),
            code: trip.code.clone(),
        }
    }
}

/// Per-member album summary shown on the trip page.
#[derive(Constructor, Serialize)]
pub struct AlbumSummary {
    id: i32,
    owner: String,
    photo_count: u64,
    cover_url: Option<String>,
}

#[derive(Serialize)]
pub struct TripDetailResponse {
    #[serde(flatten)]
    pub trip: TripResponse,
    pub albums: Vec<AlbumSummary>,
}

pub(crate) async fn load_member_trip(
    ctx: &AppContext,
    auth: &auth::JWT,
    trip_id: i32,
) -> Result<(users::Model, trips::Model)> {
    let user = users::Model::find_by_pid(&ctx.db, &auth.claims.pid).await?;
    let trip = trips::Entity::find_by_id(trip_id)
        .one(&ctx.db)
        .await?
        .ok_or_else(|| Error::NotFound)?;

    if !trip.is_member(&ctx.db, user.id).await? {
        return Err(Error::Unauthorized(
            "you must join this trip to view it".to_string(),
        ));
    }
    Ok((user, trip))
}

#[debug_handler]
async fn create(
    auth: auth::JWT,
    State(ctx): State<AppContext>,
    Json(params): Json<CreateTripPayload>,
) -> Result<Response> {
    params
        .validate()
        .map_err(|e| Error::BadRequest(e.to_string()))?;
    let user = users::Model::find_by_pid(&ctx.db, &auth.claims.pid).await?;

    let txn = ctx.db.begin().await?;
    let code = trips::Entity::generate_code(&txn).await?;
    let trip = trips::ActiveModel {
        name: Set(params.name.trim().to_string()),
        code: Set(code),
        created_by_id: Set(user.id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    trip.add_member(&txn, user.id).await?;
    txn.commit().await?;

    format::json(TripResponse::from(&trip))
}

#[debug_handler]
async fn join(
    auth: auth::JWT,
    State(ctx): State<AppContext>,
    Json(params): Json<JoinTripPayload>,
) -> Result<Response> {
    let user = users::Model::find_by_pid(&ctx.db, &auth.claims.pid).await?;

    let code = params.code.trim().to_uppercase();
    let trip = trips::Entity::find_by_code(&ctx.db, &code)
        .await?
        .ok_or_else(|| Error::BadRequest("invalid trip code".to_string()))?;

    trip.add_member(&ctx.db, user.id).await?;
    format::json(TripResponse::from(&trip))
}

#[debug_handler]
async fn list(auth: auth::JWT, State(ctx): State<AppContext>) -> Result<Response> {
    let user = users::Model::find_by_pid(&ctx.db, &auth.claims.pid).await?;
    let trips = trips::Entity::find_for_user(&ctx.db, user.id).await?;
    format::json(trips.iter().map(TripResponse::from).collect::<Vec<_>>())
}

#[debug_handler]
async fn get_one(
    auth: auth::JWT,
    Path(trip_id): Path<i32>,
    State(ctx): State<AppContext>,
) -> Result<Response> {
    let (_user, trip) = load_member_trip(&ctx, &auth, trip_id).await?;
    let blobs = FsBlobStore::from_settings(&Settings::from_context(&ctx));

    let mut summaries = Vec::new();
    for album in albums::Entity::find()
        .filter(albums::Column::TripId.eq(trip.id))
        .all(&ctx.db)
        .await?
    {
        let owner = users::Entity::find_by_id(album.user_id)
            .one(&ctx.db)
            .await?
            .map_or_else(String::new, |u| u.username);
        let photo_count = album.photo_count(&ctx.db).await?;
        let cover_url = album
            .cover_photo(&ctx.db)
            .await?
            .map(|photo| blobs.presigned_url(&photo.blob_key, COVER_URL_TTL_SECS, false));
        summaries.push(AlbumSummary::new(album.id, owner, photo_count, cover_url));
    }

    format::json(TripDetailResponse {
        trip: TripResponse::from(&trip),
        albums: summaries,
    })
}

pub fn routes() -> Routes {
    Routes::new()
        .prefix("/api/trips")
        .add("/", post(create))
        .add("/", get(list))
        .add("/join", post(join))
        .add("/{id}", get(get_one))
}
