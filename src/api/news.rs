/// News CRUD endpoints
use crate::{
    context::AppContext,
    db::news::News,
    error::ApiResult,
    service::news::NewsInput,
    upload,
};
use axum::{
    extract::{Path, Request, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/news", get(list_news).post(create_news))
        .route(
            "/api/news/:id",
            get(get_news).put(update_news).delete(delete_news),
        )
}

async fn list_news(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<News>>> {
    Ok(Json(ctx.news.list().await?))
}

async fn get_news(State(ctx): State<AppContext>, Path(id): Path<i64>) -> ApiResult<Json<News>> {
    Ok(Json(ctx.news.get(id).await?))
}

async fn create_news(State(ctx): State<AppContext>, req: Request) -> ApiResult<Json<News>> {
    let (input, file) = upload::read_submission(req, "image")
        .await?
        .decode::<NewsInput>()?;

    Ok(Json(ctx.news.create(input, file).await?))
}

async fn update_news(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    req: Request,
) -> ApiResult<Json<News>> {
    let (input, file) = upload::read_submission(req, "image")
        .await?
        .decode::<NewsInput>()?;

    Ok(Json(ctx.news.update(id, input, file).await?))
}

async fn delete_news(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    ctx.news.delete(id).await?;

    Ok(Json(json!({ "success": true })))
}
