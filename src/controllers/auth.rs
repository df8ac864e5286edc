use axum::debug_handler;
use loco_rs::model::ModelError;
use loco_rs::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::users::{self, RegisterParams};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 5, max = 20, message = "mobile must be 5-20 characters"))]
    pub mobile: String,
    #[validate(length(min = 2, max = 80, message = "username must be 2-80 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub mobile: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub pid: String,
    pub username: String,
}

fn auth_response(ctx: &AppContext, user: &users::Model) -> Result<Response> {
    let jwt_config = ctx.config.get_jwt_config()?;
    let token = user
        .generate_jwt(&jwt_config.secret, &jwt_config.expiration)
        .map_err(|_| Error::InternalServerError)?;

    format::json(AuthResponse {
        token,
        pid: user.pid.to_string(),
        username: user.username.clone(),
    })
}

#[debug_handler]
async fn register(
    State(ctx): State<AppContext>,
    Json(params): Json<RegisterPayload>,
) -> Result<Response> {
    params
        .validate()
        .map_err(|e| Error::BadRequest(e.to_string()))?;

    let user = users::Model::create_with_password(
        &ctx.db,
        &RegisterParams {
            mobile: params.mobile.trim().to_string(),
            username: params.username.trim().to_string(),
            password: params.password,
        },
    )
    .await
    .map_err(|e| match e {
        ModelError::EntityAlreadyExists {} => {
            Error::BadRequest("mobile number or username already registered".to_string())
        }
        e => Error::Model(e),
    })?;

    auth_response(&ctx, &user)
}

#[debug_handler]
async fn login(State(ctx): State<AppContext>, Json(params): Json<LoginPayload>) -> Result<Response> {
    let user = users::Model::find_by_mobile(&ctx.db, params.mobile.trim())
        .await
        .map_err(|_| Error::Unauthorized("invalid mobile number or password".to_string()))?;

    if !user.verify_password(&params.password) {
        return Err(Error::Unauthorized(
            "invalid mobile number or password".to_string(),
        ));
    }

    auth_response(&ctx, &user)
}

pub fn routes() -> Routes {
    Routes::new()
        .prefix("/api/auth")
        .add("/register", post(register))
        .add("/login", post(login))
}
