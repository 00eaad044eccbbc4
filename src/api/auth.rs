/// Admin login endpoint
use crate::{context::AppContext, error::ApiResult};
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/auth/login", post(login))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

async fn login(
    State(ctx): State<AppContext>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let token = ctx.auth.login(&body.username, &body.password)?;

    Ok(Json(LoginResponse {
        success: true,
        token,
    }))
}
