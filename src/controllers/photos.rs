use axum::debug_handler;
use axum::extract::Multipart;
use derive_more::with_trait::Constructor;
use loco_rs::prelude::*;
use sea_orm::{ActiveValue::Set, ActiveModelTrait, EntityTrait, ModelTrait};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use tracing::warn;

use crate::common::blob_store::{BlobStore, FsBlobStore};
use crate::common::image_utils::{is_image_file, sanitize_filename};
use crate::common::settings::Settings;
use crate::controllers::trips::load_member_trip;
use crate::models::{albums, faces, photos, trips, users};

const DOWNLOAD_URL_TTL_SECS: u64 = 600;

#[derive(Debug, Deserialize)]
pub struct PhotoIdsPayload {
    pub photo_ids: Vec<i32>,
}

#[derive(Constructor, Serialize)]
pub struct UploadResponse {
    uploaded: usize,
}

#[derive(Constructor, Serialize)]
pub struct DeletedResponse {
    deleted: usize,
}

#[derive(Constructor, Serialize)]
pub struct DownloadUrl {
    photo_id: i32,
    url: String,
}

#[debug_handler]
async fn upload(
    auth: auth::JWT,
    Path(trip_id): Path<i32>,
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<Response> {
    let (user, trip) = load_member_trip(&ctx, &auth, trip_id).await?;
    let album = albums::Entity::find_or_create_for(&ctx.db, trip.id, user.id).await?;
    let blobs = FsBlobStore::from_settings(&Settings::from_context(&ctx));

    let mut uploaded = 0;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?
    {
        if field.name() != Some("photos") {
            continue;
        }
        let Some(file_name) = field.file_name().map(sanitize_filename) else {
            continue;
        };
        if !is_image_file(FsPath::new(&file_name)) {
            warn!("Skipping upload with unsupported extension: {}", file_name);
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::BadRequest(e.to_string()))?;
        let timestamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        let blob_key = format!(
            "photos/{}/{}_{}_{}",
            trip.code, user.username, timestamp, file_name
        );

        // The blob must exist before anything references it.
        blobs
            .put(&blob_key, &bytes, mime_guess::from_path(&file_name).first_or_octet_stream().essence_str())
            .await
            .map_err(|e| Error::Message(e.to_string()))?;

        photos::ActiveModel {
            album_id: Set(album.id),
            blob_key: Set(blob_key),
            face_scan_status: Set(photos::FaceScanStatus::Pending.as_str().to_string()),
            ..Default::default()
        }
        .insert(&ctx.db)
        .await?;
        uploaded += 1;
    }

    if uploaded == 0 {
        return Err(Error::BadRequest("no valid photos in upload".to_string()));
    }
    format::json(UploadResponse::new(uploaded))
}

/// Blob deletion happens before the row delete: the cascade only covers
/// relational rows, never stored bytes.
async fn delete_photo_with_blobs(
    ctx: &AppContext,
    blobs: &FsBlobStore,
    photo: photos::Model,
) -> Result<()> {
    for face in faces::Entity::find_by_photo(&ctx.db, photo.id).await? {
        if let Err(err) = blobs.delete(&face.crop_key).await {
            warn!("Could not delete face crop {}: {}", face.crop_key, err);
        }
    }
    if let Err(err) = blobs.delete(&photo.blob_key).await {
        warn!("Could not delete photo blob {}: {}", photo.blob_key, err);
    }
    photo.delete(&ctx.db).await?;
    Ok(())
}

async fn load_owned_photo(
    ctx: &AppContext,
    user: &users::Model,
    photo_id: i32,
) -> Result<Option<photos::Model>> {
    let Some(photo) = photos::Entity::find_by_id(photo_id).one(&ctx.db).await? else {
        return Ok(None);
    };
    let Some(album) = albums::Entity::find_by_id(photo.album_id).one(&ctx.db).await? else {
        return Ok(None);
    };
    if album.user_id == user.id {
        Ok(Some(photo))
    } else {
        Ok(None)
    }
}

#[debug_handler]
async fn delete_one(
    auth: auth::JWT,
    Path(photo_id): Path<i32>,
    State(ctx): State<AppContext>,
) -> Result<Response> {
    let user = users::Model::find_by_pid(&ctx.db, &auth.claims.pid).await?;
    let photo = load_owned_photo(&ctx, &user, photo_id)
        .await?
        .ok_or_else(|| Error::Unauthorized("only the owner can delete a photo".to_string()))?;

    let blobs = FsBlobStore::from_settings(&Settings::from_context(&ctx));
    delete_photo_with_blobs(&ctx, &blobs, photo).await?;
    format::json(DeletedResponse::new(1))
}

#[debug_handler]
async fn delete_batch(
    auth: auth::JWT,
    State(ctx): State<AppContext>,
    Json(params): Json<PhotoIdsPayload>,
) -> Result<Response> {
    if params.photo_ids.is_empty() {
        return Err(Error::BadRequest("no photos selected".to_string()));
    }
    let user = users::Model::find_by_pid(&ctx.db, &auth.claims.pid).await?;
    let blobs = FsBlobStore::from_settings(&Settings::from_context(&ctx));

    let mut deleted = 0;
    for photo_id in params.photo_ids {
        // only the owner's photos are removed; everything else is skipped
        if let Some(photo) = load_owned_photo(&ctx, &user, photo_id).await? {
            delete_photo_with_blobs(&ctx, &blobs, photo).await?;
            deleted += 1;
        }
    }
    format::json(DeletedResponse::new(deleted))
}

#[debug_handler]
async fn download_urls(
    auth: auth::JWT,
    State(ctx): State<AppContext>,
    Json(params): Json<PhotoIdsPayload>,
) -> Result<Response> {
    if params.photo_ids.is_empty() {
        return Err(Error::BadRequest("no photos selected".to_string()));
    }
    let user = users::Model::find_by_pid(&ctx.db, &auth.claims.pid).await?;
    let blobs = FsBlobStore::from_settings(&Settings::from_context(&ctx));

    let mut urls = Vec::new();
    for photo_id in params.photo_ids {
        let Some(photo) = photos::Entity::find_by_id(photo_id).one(&ctx.db).await? else {
            continue;
        };
        let Some(trip_id) = photos::Entity::trip_id_of(&ctx.db, &photo).await? else {
            continue;
        };
        let Some(trip) = trips::Entity::find_by_id(trip_id).one(&ctx.db).await? else {
            continue;
        };
        if !trip.is_member(&ctx.db, user.id).await? {
            continue;
        }
        urls.push(DownloadUrl::new(
            photo.id,
            blobs.presigned_url(&photo.blob_key, DOWNLOAD_URL_TTL_SECS, true),
        ));
    }
    format::json(urls)
}

pub fn routes() -> Routes {
    Routes::new()
        .prefix("/api")
        .add("/trips/{id}/photos", post(upload))
        .add("/photos/{id}", delete(delete_one))
        .add("/photos/batch-delete", post(delete_batch))
        .add("/photos/download-urls", post(download_urls))
}
