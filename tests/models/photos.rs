use loco_rs::testing::prelude::*;
use serial_test::serial;

use tripshare_backend::app::App;
use tripshare_backend::models::photos::{self, FaceScanStatus};

use crate::helpers::{seed_photo, seed_trip, MemoryBlobStore};

#[tokio::test]
#[serial]
async fn only_pending_photos_are_scan_candidates() {
    let boot = boot_test::<App>().await.unwrap();
    let db = &boot.app_context.db;
    let (_user, trip, album) = seed_trip(db, "pending").await;
    let blobs = MemoryBlobStore::default();

    let photo_a = seed_photo(db, &blobs, &album, "a.jpg").await;
    let photo_b = seed_photo(db, &blobs, &album, "b.jpg").await;
    let photo_c = seed_photo(db, &blobs, &album, "c.jpg").await;

    photo_b
        .mark_scanned(db, FaceScanStatus::ProcessedEmpty)
        .await
        .unwrap();
    photo_c
        .mark_scanned(db, FaceScanStatus::ProcessedWithFaces)
        .await
        .unwrap();

    let pending = photos::Entity::find_pending_for_trip(db, trip.id)
        .await
        .unwrap();
    assert_eq!(
        pending.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![photo_a.id]
    );

    // photos of other trips never leak into a scan
    let (_user2, other_trip, _album2) = seed_trip(db, "pending2").await;
    assert!(photos::Entity::find_pending_for_trip(db, other_trip.id)
        .await
        .unwrap()
        .is_empty());
}
