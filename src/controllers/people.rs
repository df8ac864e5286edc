use axum::debug_handler;
use derive_more::with_trait::Constructor;
use loco_rs::prelude::*;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::common::blob_store::{BlobStore, FsBlobStore};
use crate::common::settings::Settings;
use crate::controllers::trips::load_member_trip;
use crate::models::{faces, persons};
use crate::workers::face_scan::{self, FaceScanWorker, WorkerArgs};

const THUMB_URL_TTL_SECS: u64 = 3600;

#[derive(Debug, Deserialize, Validate)]
pub struct RenamePayload {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
}

#[derive(Constructor, Serialize)]
pub struct PersonResponse {
    id: i32,
    name: String,
    face_count: u64,
    thumbnail_url: Option<String>,
}

#[derive(Constructor, Serialize)]
pub struct FaceEntry {
    id: i32,
    photo_id: i32,
    crop_url: String,
}

#[derive(Serialize)]
pub struct ScanResponse {
    pub started: bool,
    pub detail: &'static str,
}

/// Kicks off the background face scan for a trip and acknowledges
/// immediately. A trip with a scan already in flight is not scanned twice.
#[debug_handler]
async fn start_scan(
    auth: auth::JWT,
    Path(trip_id): Path<i32>,
    State(ctx): State<AppContext>,
) -> Result<Response> {
    let (_user, trip) = load_member_trip(&ctx, &auth, trip_id).await?;

    if !face_scan::try_begin_scan(trip.id) {
        info!("Scan for trip {} already running, not starting another", trip.id);
        return format::json(ScanResponse {
            started: false,
            detail: "scan already running",
        });
    }

    if let Err(err) = FaceScanWorker::perform_later(&ctx, WorkerArgs { trip_id: trip.id }).await {
        face_scan::end_scan(trip.id);
        return Err(err);
    }

    format::json(ScanResponse {
        started: true,
        detail: "scan started",
    })
}

/// Identity clusters of a trip. Persons without any face are filtered out,
/// not deleted.
#[debug_handler]
async fn list_people(
    auth: auth::JWT,
    Path(trip_id): Path<i32>,
    State(ctx): State<AppContext>,
) -> Result<Response> {
    let (_user, trip) = load_member_trip(&ctx, &auth, trip_id).await?;
    let blobs = FsBlobStore::from_settings(&Settings::from_context(&ctx));

    let mut people = Vec::new();
    for person in persons::Entity::find_by_trip(&ctx.db, trip.id).await? {
        let face_count = person.face_count(&ctx.db).await?;
        if face_count == 0 {
            continue;
        }
        let thumbnail_url = person
            .representative_face(&ctx.db)
            .await?
            .map(|face| blobs.presigned_url(&face.crop_key, THUMB_URL_TTL_SECS, false));
        people.push(PersonResponse::new(
            person.id,
            person.name,
            face_count,
            thumbnail_url,
        ));
    }
    format::json(people)
}

async fn load_member_person(
    ctx: &AppContext,
    auth: &auth::JWT,
    person_id: i32,
) -> Result<persons::Model> {
    let person = persons::Entity::find_by_id(person_id)
        .one(&ctx.db)
        .await?
        .ok_or_else(|| Error::NotFound)?;
    load_member_trip(ctx, auth, person.trip_id).await?;
    Ok(person)
}

#[debug_handler]
async fn rename(
    auth: auth::JWT,
    Path(person_id): Path<i32>,
    State(ctx): State<AppContext>,
    Json(params): Json<RenamePayload>,
) -> Result<Response> {
    params
        .validate()
        .map_err(|e| Error::BadRequest(e.to_string()))?;
    let person = load_member_person(&ctx, &auth, person_id).await?;
    let person = person.rename(&ctx.db, params.name.trim()).await?;
    format::json(serde_json::json!({ "id": person.id, "name": person.name }))
}

#[debug_handler]
async fn list_faces(
    auth: auth::JWT,
    Path(person_id): Path<i32>,
    State(ctx): State<AppContext>,
) -> Result<Response> {
    let person = load_member_person(&ctx, &auth, person_id).await?;
    let blobs = FsBlobStore::from_settings(&Settings::from_context(&ctx));

    let entries: Vec<FaceEntry> = faces::Entity::find_by_person(&ctx.db, person.id)
        .await?
        .into_iter()
        .map(|face| {
            FaceEntry::new(
                face.id,
                face.photo_id,
                blobs.presigned_url(&face.crop_key, THUMB_URL_TTL_SECS, false),
            )
        })
        .collect();
    format::json(entries)
}

pub fn routes() -> Routes {
    Routes::new()
        .prefix("/api")
        .add("/trips/{id}/scan", post(start_scan))
        .add("/trips/{id}/people", get(list_people))
        .add("/people/{id}/rename", post(rename))
        .add("/people/{id}/faces", get(list_faces))
}
