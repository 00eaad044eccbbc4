/// Generic admin upload endpoint
use crate::{
    asset_store::AssetCategory,
    auth::AdminAuth,
    context::AppContext,
    error::{ApiError, ApiResult},
    upload,
};
use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/upload", post(upload_file))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Store a single image and return its public URL
///
/// The form field name picks the destination folder (`others` when
/// unrecognized).
async fn upload_file(
    State(ctx): State<AppContext>,
    _auth: AdminAuth,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let staged = upload::read_any_file(multipart)
        .await?
        .ok_or_else(|| ApiError::Validation("no file attached".to_string()))?;

    let category = AssetCategory::for_field(&staged.field);
    let url = ctx
        .assets
        .put(category, &staged.extension, &staged.data)
        .await?;

    Ok(Json(UploadResponse { url }))
}
