use loco_rs::testing::prelude::*;
use serial_test::serial;

use tripshare_backend::app::App;

use super::prepare_data;

#[tokio::test]
#[serial]
async fn create_join_and_list_trips() {
    request::<App, _, _>(|request, _ctx| async move {
        let alice = prepare_data::init_user_login(&request, "alice").await;
        let bob = prepare_data::init_user_login(&request, "bob").await;

        let (key, value) = prepare_data::auth_header(&alice.token);
        let response = request
            .post("/api/trips")
            .add_header(key, value)
            .json(&serde_json::json!({ "name": "Lisbon 2026" }))
            .await;
        assert_eq!(response.status_code(), 200, "{}", response.text());
        let trip: serde_json::Value = response.json();
        let code = trip["code"].as_str().unwrap().to_string();
        assert_eq!(code.len(), 6);
        let trip_id = trip["id"].as_i64().unwrap();

        // bob joins by code, lowercase input included
        let (key, value) = prepare_data::auth_header(&bob.token);
        let response = request
            .post("/api/trips/join")
            .add_header(key, value)
            .json(&serde_json::json!({ "code": code.to_lowercase() }))
            .await;
        assert_eq!(response.status_code(), 200);

        let (key, value) = prepare_data::auth_header(&bob.token);
        let response = request.get("/api/trips").add_header(key, value).await;
        assert_eq!(response.status_code(), 200);
        let trips: serde_json::Value = response.json();
        assert_eq!(trips.as_array().unwrap().len(), 1);
        assert_eq!(trips[0]["id"].as_i64().unwrap(), trip_id);
    })
    .await;
}

#[tokio::test]
#[serial]
async fn joining_with_a_bad_code_fails() {
    request::<App, _, _>(|request, _ctx| async move {
        let user = prepare_data::init_user_login(&request, "badcode").await;
        let (key, value) = prepare_data::auth_header(&user.token);
        let response = request
            .post("/api/trips/join")
            .add_header(key, value)
            .json(&serde_json::json!({ "code": "NOSUCH" }))
            .await;
        assert_eq!(response.status_code(), 400);
    })
    .await;
}

#[tokio::test]
#[serial]
async fn non_members_cannot_view_a_trip() {
    request::<App, _, _>(|request, _ctx| async move {
        let owner = prepare_data::init_user_login(&request, "owner").await;
        let stranger = prepare_data::init_user_login(&request, "stranger").await;

        let (key, value) = prepare_data::auth_header(&owner.token);
        let response = request
            .post("/api/trips")
            .add_header(key, value)
            .json(&serde_json::json!({ "name": "Private trip" }))
            .await;
        let trip: serde_json::Value = response.json();
        let trip_id = trip["id"].as_i64().unwrap();

        let (key, value) = prepare_data::auth_header(&stranger.token);
        let response = request
            .get(&format!("/api/trips/{trip_id}"))
            .add_header(key, value)
            .await;
        assert_eq!(response.status_code(), 401);
    })
    .await;
}
