use loco_rs::testing::prelude::*;
use sea_orm::{DatabaseConnection, EntityTrait};
use serial_test::serial;

use tripshare_backend::app::App;
use tripshare_backend::models::photos::FaceScanStatus;
use tripshare_backend::models::{faces, persons, photos};
use tripshare_backend::workers::face_scan::{run_scan, ScanContext};

use crate::helpers::{seed_photo, seed_trip, MemoryBlobStore, ScriptedOracle};

const ONE_FACE: &str = r#"[{"box_2d": [100, 100, 500, 500]}]"#;
const NO_FACES: &str = "[]";
const NO_MATCH: &str = r#"{"match_id": null}"#;

fn scan_context(
    db: &DatabaseConnection,
    oracle: &ScriptedOracle,
    blobs: &MemoryBlobStore,
) -> ScanContext {
    ScanContext {
        db: db.clone(),
        oracle: Box::new(oracle.clone()),
        blobs: Box::new(blobs.clone()),
    }
}

async fn reload_photo(db: &DatabaseConnection, id: i32) -> photos::Model {
    photos::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
#[serial]
async fn fresh_trip_creates_one_person_per_unmatched_face() {
    let boot = boot_test::<App>().await.unwrap();
    let db = &boot.app_context.db;
    let (_user, trip, album) = seed_trip(db, "fresh").await;
    let blobs = MemoryBlobStore::default();
    let photo_a = seed_photo(db, &blobs, &album, "a.jpg").await;
    let photo_b = seed_photo(db, &blobs, &album, "b.jpg").await;

    // photo a: detect (no references yet, so no comparison call);
    // photo b: detect, then compare against the first new person
    let oracle = ScriptedOracle::new(&[ONE_FACE, ONE_FACE, NO_MATCH]);
    let report = run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();

    assert_eq!(report.photos_scanned, 2);
    assert_eq!(report.photos_failed, 0);
    assert_eq!(report.faces_found, 2);
    assert_eq!(report.persons_created, 2);

    let people = persons::Entity::find_by_trip(db, trip.id).await.unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(people[0].name, "Unknown Person 1");
    assert_eq!(people[1].name, "Unknown Person 2");
    for person in &people {
        assert_eq!(person.face_count(db).await.unwrap(), 1);
    }

    for photo in [&photo_a, &photo_b] {
        let reloaded = reload_photo(db, photo.id).await;
        assert_eq!(
            reloaded.face_scan_status,
            FaceScanStatus::ProcessedWithFaces.as_str()
        );
    }
}

#[tokio::test]
#[serial]
async fn matched_face_joins_existing_person() {
    let boot = boot_test::<App>().await.unwrap();
    let db = &boot.app_context.db;
    let (_user, trip, album) = seed_trip(db, "repeat").await;
    let blobs = MemoryBlobStore::default();
    seed_photo(db, &blobs, &album, "first.jpg").await;

    let oracle = ScriptedOracle::new(&[ONE_FACE]);
    run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();

    let people = persons::Entity::find_by_trip(db, trip.id).await.unwrap();
    assert_eq!(people.len(), 1);
    let person = &people[0];
    let representative = person.representative_face(db).await.unwrap().unwrap();

    // a later upload of the same individual
    seed_photo(db, &blobs, &album, "second.jpg").await;
    let match_response = format!(r#"{{"match_id": {}}}"#, person.id);
    let oracle = ScriptedOracle::new(&[ONE_FACE, &match_response]);
    let report = run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();

    assert_eq!(report.persons_created, 0);
    assert_eq!(report.faces_found, 1);

    let people = persons::Entity::find_by_trip(db, trip.id).await.unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].face_count(db).await.unwrap(), 2);

    // the representative face stays the first one ever recorded
    let still_first = people[0].representative_face(db).await.unwrap().unwrap();
    assert_eq!(still_first.id, representative.id);
}

#[tokio::test]
#[serial]
async fn empty_detection_is_terminal_and_never_rescanned() {
    let boot = boot_test::<App>().await.unwrap();
    let db = &boot.app_context.db;
    let (_user, trip, album) = seed_trip(db, "empty").await;
    let blobs = MemoryBlobStore::default();
    let photo = seed_photo(db, &blobs, &album, "landscape.jpg").await;

    let oracle = ScriptedOracle::new(&[NO_FACES]);
    let report = run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();

    assert_eq!(report.photos_scanned, 1);
    assert_eq!(report.faces_found, 0);
    assert_eq!(
        faces::Entity::find_by_photo(db, photo.id).await.unwrap().len(),
        0
    );
    assert_eq!(
        reload_photo(db, photo.id).await.face_scan_status,
        FaceScanStatus::ProcessedEmpty.as_str()
    );

    // a second scan has nothing to detect
    let oracle = ScriptedOracle::new(&[]);
    run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
#[serial]
async fn processed_photos_are_not_detected_again() {
    let boot = boot_test::<App>().await.unwrap();
    let db = &boot.app_context.db;
    let (_user, trip, album) = seed_trip(db, "idem").await;
    let blobs = MemoryBlobStore::default();
    seed_photo(db, &blobs, &album, "a.jpg").await;

    let oracle = ScriptedOracle::new(&[ONE_FACE]);
    run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();
    assert_eq!(oracle.call_count(), 1);

    let oracle = ScriptedOracle::new(&[]);
    run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
#[serial]
async fn malformed_detection_leaves_photo_pending() {
    let boot = boot_test::<App>().await.unwrap();
    let db = &boot.app_context.db;
    let (_user, trip, album) = seed_trip(db, "malformed").await;
    let blobs = MemoryBlobStore::default();
    let photo = seed_photo(db, &blobs, &album, "a.jpg").await;

    let oracle = ScriptedOracle::new(&["I think there are two faces here."]);
    let report = run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();

    assert_eq!(report.photos_scanned, 0);
    assert_eq!(report.photos_failed, 1);
    assert_eq!(
        reload_photo(db, photo.id).await.face_scan_status,
        FaceScanStatus::Pending.as_str()
    );

    // still eligible: the next scan retries detection
    let oracle = ScriptedOracle::new(&[ONE_FACE]);
    let report = run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();
    assert_eq!(report.photos_scanned, 1);
}

#[tokio::test]
#[serial]
async fn unoffered_match_id_creates_a_new_person() {
    let boot = boot_test::<App>().await.unwrap();
    let db = &boot.app_context.db;
    let (_user, trip, album) = seed_trip(db, "safe").await;
    let blobs = MemoryBlobStore::default();
    seed_photo(db, &blobs, &album, "a.jpg").await;
    seed_photo(db, &blobs, &album, "b.jpg").await;

    // the second comparison names an id that was never offered
    let oracle = ScriptedOracle::new(&[ONE_FACE, ONE_FACE, r#"{"match_id": 424242}"#]);
    let report = run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();

    assert_eq!(report.photos_failed, 0);
    assert_eq!(report.persons_created, 2);
    assert_eq!(
        persons::Entity::find_by_trip(db, trip.id).await.unwrap().len(),
        2
    );
}

#[tokio::test]
#[serial]
async fn comparison_carries_one_reference_per_known_person() {
    let boot = boot_test::<App>().await.unwrap();
    let db = &boot.app_context.db;
    let (_user, trip, album) = seed_trip(db, "refs").await;
    let blobs = MemoryBlobStore::default();
    seed_photo(db, &blobs, &album, "a.jpg").await;
    seed_photo(db, &blobs, &album, "b.jpg").await;

    let oracle = ScriptedOracle::new(&[ONE_FACE, ONE_FACE, NO_MATCH]);
    run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();
    // two persons exist now; a third photo's comparison must carry
    // target + 2 references
    seed_photo(db, &blobs, &album, "c.jpg").await;
    let oracle = ScriptedOracle::new(&[ONE_FACE, NO_MATCH]);
    run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();

    assert_eq!(oracle.image_counts(), vec![1, 3]);
}

#[tokio::test]
#[serial]
async fn crops_are_uploaded_before_faces_are_recorded() {
    let boot = boot_test::<App>().await.unwrap();
    let db = &boot.app_context.db;
    let (_user, trip, album) = seed_trip(db, "blobs").await;
    let blobs = MemoryBlobStore::default();
    let photo = seed_photo(db, &blobs, &album, "a.jpg").await;

    let oracle = ScriptedOracle::new(&[ONE_FACE]);
    run_scan(&scan_context(db, &oracle, &blobs), trip.id)
        .await
        .unwrap();

    let faces = faces::Entity::find_by_photo(db, photo.id).await.unwrap();
    assert_eq!(faces.len(), 1);
    let crop_key = &faces[0].crop_key;
    assert!(crop_key.starts_with(&format!("faces/{}/{}_0_", trip.id, photo.id)));
    assert!(blobs.contains(crop_key));
}
