use loco_rs::prelude::*;
use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{LazyLock, Mutex};
use tracing::{error, info, warn};

use crate::api::face_comparison::{self, ReferenceFace};
use crate::api::face_detection;
use crate::api::oracle_client::{GenerativeOracleClient, VisionOracle};
use crate::api::oracle_structs::BoundingBox;
use crate::common::blob_store::{BlobStore, FsBlobStore};
use crate::common::image_utils;
use crate::common::settings::Settings;
use crate::models::photos::FaceScanStatus;
use crate::models::{faces, persons, photos, trips};

/// Everything one scan run needs, threaded explicitly through the pipeline
/// instead of living in process globals.
pub struct ScanContext {
    pub db: DatabaseConnection,
    pub oracle: Box<dyn VisionOracle>,
    pub blobs: Box<dyn BlobStore>,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub photos_scanned: usize,
    pub photos_failed: usize,
    pub faces_found: usize,
    pub persons_created: usize,
}

// Registry of trips with a scan in flight. One slot per trip: a second
// StartScan while a scan runs is rejected instead of double-clustering the
// same faces. Covers the in-process async queue this app runs with.
static ACTIVE_SCANS: LazyLock<Mutex<HashSet<i32>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Reserves the scan slot for a trip. Returns `false` when a scan is
/// already in flight.
#[must_use]
pub fn try_begin_scan(trip_id: i32) -> bool {
    ACTIVE_SCANS
        .lock()
        .map(|mut active| active.insert(trip_id))
        .unwrap_or(false)
}

pub fn end_scan(trip_id: i32) {
    if let Ok(mut active) = ACTIVE_SCANS.lock() {
        active.remove(&trip_id);
    }
}

/// Releases the trip's scan slot when dropped, whichever way the scan
/// ends.
struct ScanSlot(i32);

impl Drop for ScanSlot {
    fn drop(&mut self) {
        end_scan(self.0);
    }
}

pub struct FaceScanWorker {
    pub ctx: AppContext,
}

#[derive(Deserialize, Debug, Serialize)]
pub struct WorkerArgs {
    pub trip_id: i32,
}

#[async_trait]
impl BackgroundWorker<WorkerArgs> for FaceScanWorker {
    fn build(ctx: &AppContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    async fn perform(&self, args: WorkerArgs) -> Result<()> {
        info!("======================= FaceScan =======================");
        // The slot was reserved by the enqueueing request handler.
        let _slot = ScanSlot(args.trip_id);

        let settings = Settings::from_context(&self.ctx);
        let scan = ScanContext {
            db: self.ctx.db.clone(),
            oracle: Box::new(GenerativeOracleClient::from_settings(&settings)),
            blobs: Box::new(FsBlobStore::from_settings(&settings)),
        };

        let report = run_scan(&scan, args.trip_id)
            .await
            .map_err(|e| Error::Message(e.to_string()))?;

        info!(
            "✅ Face scan for trip {} done: {} photos scanned ({} failed), {} faces, {} new people",
            args.trip_id,
            report.photos_scanned,
            report.photos_failed,
            report.faces_found,
            report.persons_created
        );
        Ok(())
    }
}

/// Scans every pending photo of the trip once, strictly sequentially. A
/// failing photo is logged and left pending; it never aborts the run.
///
/// # Errors
/// Only when the trip cannot be loaded or its photo list cannot be read.
pub async fn run_scan(scan: &ScanContext, trip_id: i32) -> anyhow::Result<ScanReport> {
    let trip = trips::Entity::find_by_id(trip_id)
        .one(&scan.db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("trip {trip_id} not found"))?;

    let pending = photos::Entity::find_pending_for_trip(&scan.db, trip.id).await?;
    info!(
        "Face scan for trip {}: {} pending photos",
        trip.id,
        pending.len()
    );

    let mut known = load_known_persons(scan, trip.id).await?;
    let mut report = ScanReport::default();

    for photo in pending {
        match scan_photo(scan, &trip, &photo, &mut known, &mut report).await {
            Ok(()) => report.photos_scanned += 1,
            Err(err) => {
                report.photos_failed += 1;
                error!("Photo {} failed, leaving it pending: {}", photo.id, err);
            }
        }
    }

    Ok(report)
}

/// Builds the reference set: one representative face per person of the
/// trip. Persons without a face should not exist, but are excluded rather
/// than trusted.
async fn load_known_persons(
    scan: &ScanContext,
    trip_id: i32,
) -> Result<Vec<ReferenceFace>, sea_orm::DbErr> {
    let mut known = Vec::new();
    for person in persons::Entity::find_by_trip(&scan.db, trip_id).await? {
        match person.representative_face(&scan.db).await? {
            Some(face) => known.push(ReferenceFace {
                person_id: person.id,
                crop_key: face.crop_key,
            }),
            None => warn!(
                "Person {} has no faces, excluding it from matching",
                person.id
            ),
        }
    }
    Ok(known)
}

/// Detect → crop → match → assign for one photo. Face rows and the status
/// flip out of `Pending` commit in a single transaction, so a crash cannot
/// strand a photo half-processed in a terminal state.
async fn scan_photo(
    scan: &ScanContext,
    trip: &trips::Model,
    photo: &photos::Model,
    known: &mut Vec<ReferenceFace>,
    report: &mut ScanReport,
) -> anyhow::Result<()> {
    let image = scan.blobs.get(&photo.blob_key).await?;
    let mime_type = mime_guess::from_path(&photo.blob_key)
        .first()
        .unwrap_or(mime::IMAGE_JPEG);

    let boxes = face_detection::detect_faces(
        scan.oracle.as_ref(),
        &image,
        mime_type.essence_str(),
    )
    .await?;

    if boxes.is_empty() {
        photo
            .mark_scanned(&scan.db, FaceScanStatus::ProcessedEmpty)
            .await?;
        return Ok(());
    }

    let mut resolved: Vec<(i32, String)> = Vec::new();
    for (index, bounding_box) in boxes.iter().enumerate() {
        match process_face(scan, trip, photo, &image, index, bounding_box, known).await {
            Ok((person_id, crop_key, created)) => {
                if created {
                    report.persons_created += 1;
                }
                resolved.push((person_id, crop_key));
            }
            Err(err) => warn!("Face {} of photo {} skipped: {}", index, photo.id, err),
        }
    }

    if resolved.is_empty() {
        anyhow::bail!("no face of photo {} could be processed", photo.id);
    }

    let txn = scan.db.begin().await?;
    for (person_id, crop_key) in &resolved {
        faces::ActiveModel::create(&txn, photo.id, *person_id, crop_key).await?;
    }
    photo
        .mark_scanned(&txn, FaceScanStatus::ProcessedWithFaces)
        .await?;
    txn.commit().await?;

    report.faces_found += resolved.len();
    Ok(())
}

/// Crops one detected face, uploads the crop before any database write,
/// and resolves it to a person id.
async fn process_face(
    scan: &ScanContext,
    trip: &trips::Model,
    photo: &photos::Model,
    image: &[u8],
    index: usize,
    bounding_box: &BoundingBox,
    known: &mut Vec<ReferenceFace>,
) -> anyhow::Result<(i32, String, bool)> {
    let crop = image_utils::crop_face(image, bounding_box)?;
    let crop_key = image_utils::crop_blob_key(trip.id, photo.id, index);
    scan.blobs.put(&crop_key, &crop, "image/jpeg").await?;

    let matched =
        face_comparison::match_face(scan.oracle.as_ref(), scan.blobs.as_ref(), &crop, known).await;

    assign_cluster(scan, trip.id, matched, &crop_key, known).await
}

/// Single-pass cluster assignment, no backtracking: a match appends to the
/// named person, anything else creates a new cluster. The new person joins
/// the in-memory reference set immediately, so a second face of the same
/// still-unidentified individual can match it later in this run.
async fn assign_cluster(
    scan: &ScanContext,
    trip_id: i32,
    matched: Option<i32>,
    crop_key: &str,
    known: &mut Vec<ReferenceFace>,
) -> anyhow::Result<(i32, String, bool)> {
    if let Some(person_id) = matched {
        return Ok((person_id, crop_key.to_string(), false));
    }

    let person = persons::ActiveModel::create_unknown(&scan.db, trip_id).await?;
    info!("New person {} ({}) in trip {}", person.id, person.name, trip_id);
    known.push(ReferenceFace {
        person_id: person.id,
        crop_key: crop_key.to_string(),
    });
    Ok((person.id, crop_key.to_string(), true))
}
