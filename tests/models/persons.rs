use loco_rs::testing::prelude::*;
use serial_test::serial;

use tripshare_backend::app::App;
use tripshare_backend::models::persons;

use crate::helpers::seed_trip;

#[tokio::test]
#[serial]
async fn unknown_names_are_sequenced_per_trip() {
    let boot = boot_test::<App>().await.unwrap();
    let db = &boot.app_context.db;
    let (_user, trip, _album) = seed_trip(db, "names").await;

    assert_eq!(
        persons::Entity::next_unknown_name(db, trip.id).await.unwrap(),
        "Unknown Person 1"
    );

    let first = persons::ActiveModel::create_unknown(db, trip.id).await.unwrap();
    assert_eq!(first.name, "Unknown Person 1");
    let second = persons::ActiveModel::create_unknown(db, trip.id).await.unwrap();
    assert_eq!(second.name, "Unknown Person 2");

    // renamed clusters drop out of the Unknown count
    second.rename(db, "Maya").await.unwrap();
    assert_eq!(
        persons::Entity::next_unknown_name(db, trip.id).await.unwrap(),
        "Unknown Person 2"
    );

    // another trip starts its own sequence
    let (_user2, other_trip, _album2) = seed_trip(db, "names2").await;
    assert_eq!(
        persons::Entity::next_unknown_name(db, other_trip.id)
            .await
            .unwrap(),
        "Unknown Person 1"
    );
}
