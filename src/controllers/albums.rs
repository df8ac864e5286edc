use axum::debug_handler;
use derive_more::with_trait::Constructor;
use loco_rs::prelude::*;
use sea_orm::EntityTrait;
use serde::Serialize;

use crate::common::blob_store::{BlobStore, FsBlobStore};
use crate::common::settings::Settings;
use crate::controllers::trips::load_member_trip;
use crate::models::{albums, photos, users};

const PHOTO_URL_TTL_SECS: u64 = 3600;

#[derive(Constructor, Serialize)]
pub struct PhotoEntry {
    id: i32,
    url: String,
    uploaded_at: String,
}

#[derive(Serialize)]
pub struct AlbumDetailResponse {
    pub id: i32,
    pub trip_id: i32,
    pub owner: String,
    pub photos: Vec<PhotoEntry>,
}

#[debug_handler]
async fn get_one(
    auth: auth::JWT,
    Path(album_id): Path<i32>,
    State(ctx): State<AppContext>,
) -> Result<Response> {
    let album = albums::Entity::find_by_id(album_id)
        .one(&ctx.db)
        .await?
        .ok_or_else(|| Error::NotFound)?;
    let (_user, _trip) = load_member_trip(&ctx, &auth, album.trip_id).await?;

    let owner = users::Entity::find_by_id(album.user_id)
        .one(&ctx.db)
        .await?
        .map_or_else(String::new, |u| u.username);

    let blobs = FsBlobStore::from_settings(&Settings::from_context(&ctx));
    let photos = photos::Entity::find_for_album(&ctx.db, album.id)
        .await?
        .into_iter()
        .map(|photo| {
            PhotoEntry::new(
                photo.id,
                blobs.presigned_url(&photo.blob_key, PHOTO_URL_TTL_SECS, false),
                photo.created_at.to_rfc3339(),
            )
        })
        .collect();

    format::json(AlbumDetailResponse {
        id: album.id,
        trip_id: album.trip_id,
        owner,
        photos,
    })
}

pub fn routes() -> Routes {
    Routes::new()
        .prefix("/api/albums")
        .add("/{id}", get(get_one))
}
