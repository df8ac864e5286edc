use axum_test::TestServer;
use loco_rs::testing::prelude::*;
use serial_test::serial;

use tripshare_backend::app::App;
use tripshare_backend::workers::face_scan;

use super::prepare_data;

async fn create_trip(request: &TestServer, token: &str, name: &str) -> i64 {
    let (key, value) = prepare_data::auth_header(token);
    let response = request
        .post("/api/trips")
        .add_header(key, value)
        .json(&serde_json::json!({ "name": name }))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    let trip: serde_json::Value = response.json();
    trip["id"].as_i64().unwrap()
}

#[tokio::test]
#[serial]
async fn scan_acknowledges_immediately() {
    request::<App, _, _>(|request, _ctx| async move {
        let user = prepare_data::init_user_login(&request, "scan1").await;
        let trip_id = create_trip(&request, &user.token, "Scan trip").await;

        let (key, value) = prepare_data::auth_header(&user.token);
        let response = request
            .post(&format!("/api/trips/{trip_id}/scan"))
            .add_header(key, value)
            .await;
        assert_eq!(response.status_code(), 200, "{}", response.text());
        let body: serde_json::Value = response.json();
        assert_eq!(body["started"].as_bool(), Some(true));
    })
    .await;
}

#[tokio::test]
#[serial]
async fn concurrent_scan_requests_are_rejected() {
    request::<App, _, _>(|request, _ctx| async move {
        let user = prepare_data::init_user_login(&request, "scan2").await;
        let trip_id = create_trip(&request, &user.token, "Busy trip").await;

        // occupy the trip's scan slot as a running scan would
        assert!(face_scan::try_begin_scan(trip_id as i32));

        let (key, value) = prepare_data::auth_header(&user.token);
        let response = request
            .post(&format!("/api/trips/{trip_id}/scan"))
            .add_header(key, value)
            .await;
        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = response.json();
        assert_eq!(body["started"].as_bool(), Some(false));

        face_scan::end_scan(trip_id as i32);
    })
    .await;
}

#[tokio::test]
#[serial]
async fn people_listing_starts_empty() {
    request::<App, _, _>(|request, _ctx| async move {
        let user = prepare_data::init_user_login(&request, "people1").await;
        let trip_id = create_trip(&request, &user.token, "People trip").await;

        let (key, value) = prepare_data::auth_header(&user.token);
        let response = request
            .get(&format!("/api/trips/{trip_id}/people"))
            .add_header(key, value)
            .await;
        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = response.json();
        assert_eq!(body.as_array().map(Vec::len), Some(0));
    })
    .await;
}
