//! Shared fixtures: a scripted oracle, an in-memory blob store and seed
//! helpers. All suites run fully deterministic; nothing here touches the
//! network.
#![allow(dead_code)]

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tripshare_backend::api::oracle_client::{OracleError, VisionOracle};
use tripshare_backend::api::oracle_structs::Part;
use tripshare_backend::common::blob_store::{BlobError, BlobStore};
use tripshare_backend::models::photos::FaceScanStatus;
use tripshare_backend::models::users::RegisterParams;
use tripshare_backend::models::{albums, photos, trips, users};

/// Replays a fixed list of responses and records how many image parts each
/// request carried.
#[derive(Clone, Default)]
pub struct ScriptedOracle {
    responses: Arc<Mutex<VecDeque<String>>>,
    image_counts: Arc<Mutex<Vec<usize>>>,
}

impl ScriptedOracle {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.iter().map(ToString::to_string).collect(),
            )),
            image_counts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.image_counts.lock().unwrap().len()
    }

    /// Number of inline images per call, in call order.
    pub fn image_counts(&self) -> Vec<usize> {
        self.image_counts.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionOracle for ScriptedOracle {
    async fn generate(&self, parts: Vec<Part>) -> Result<String, OracleError> {
        let images = parts
            .iter()
            .filter(|part| matches!(part, Part::InlineData { .. }))
            .count();
        self.image_counts.lock().unwrap().push(images);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(OracleError::EmptyResponse)
    }
}

#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn contains(&self, key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(key)
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<(), BlobError> {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        self.blobs
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    fn presigned_url(&self, key: &str, ttl_secs: u64, force_download: bool) -> String {
        format!(
            "memory://{key}?ttl={ttl_secs}&dl={}",
            u8::from(force_download)
        )
    }
}

/// A small valid JPEG to feed the cropper.
pub fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(width, height);
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Jpeg)
        .expect("encode test jpeg");
    bytes.into_inner()
}

pub async fn seed_user(db: &DatabaseConnection, tag: &str) -> users::Model {
    users::Model::create_with_password(
        db,
        &RegisterParams {
            mobile: format!("07{}{}", tag.len(), tag),
            username: format!("user_{tag}"),
            password: "secret123".to_string(),
        },
    )
    .await
    .expect("seed user")
}

pub async fn seed_trip(
    db: &DatabaseConnection,
    tag: &str,
) -> (users::Model, trips::Model, albums::Model) {
    let user = seed_user(db, tag).await;
    let code = trips::Entity::generate_code(db).await.expect("trip code");
    let trip = trips::ActiveModel {
        name: Set(format!("Trip {tag}")),
        code: Set(code),
        created_by_id: Set(user.id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed trip");
    trip.add_member(db, user.id).await.expect("add member");
    let album = albums::Entity::find_or_create_for(db, trip.id, user.id)
        .await
        .expect("seed album");
    (user, trip, album)
}

pub async fn seed_photo(
    db: &DatabaseConnection,
    blobs: &MemoryBlobStore,
    album: &albums::Model,
    name: &str,
) -> photos::Model {
    let blob_key = format!("photos/SEED/{name}");
    blobs
        .put(&blob_key, &test_jpeg(400, 300), "image/jpeg")
        .await
        .expect("seed blob");
    photos::ActiveModel {
        album_id: Set(album.id),
        blob_key: Set(blob_key),
        face_scan_status: Set(FaceScanStatus::Pending.as_str().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed photo")
}
