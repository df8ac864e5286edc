use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use loco_rs::testing::prelude::*;

pub struct LoggedInUser {
    pub token: String,
    pub username: String,
}

/// Registers a fresh user through the API and returns its bearer token.
pub async fn init_user_login(request: &TestServer, tag: &str) -> LoggedInUser {
    let payload = serde_json::json!({
        "mobile": format!("07000{tag}"),
        "username": format!("user_{tag}"),
        "password": "secret123",
    });
    let response = request.post("/api/auth/register").json(&payload).await;
    assert_eq!(response.status_code(), 200, "{}", response.text());

    let auth: serde_json::Value = response.json();
    LoggedInUser {
        token: auth["token"].as_str().expect("token in response").to_string(),
        username: auth["username"].as_str().expect("username").to_string(),
    }
}

pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {token}")).expect("valid auth header"),
    )
}
