/// Event CRUD endpoints
use crate::{
    context::AppContext,
    db::event::{Event, EventWindow},
    error::{ApiError, ApiResult},
    service::event::EventInput,
    upload,
};
use axum::{
    extract::{Path, Query, Request, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route(
            "/api/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
}

#[derive(Debug, Deserialize)]
struct ListParams {
    /// "upcoming" or "previous"; omitted = everything
    #[serde(rename = "type")]
    window: Option<String>,
}

async fn list_events(
    State(ctx): State<AppContext>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Event>>> {
    let window = match params.window.as_deref() {
        None => EventWindow::All,
        Some("upcoming") => EventWindow::Upcoming,
        Some("previous") => EventWindow::Previous,
        Some(other) => {
            return Err(ApiError::Validation(format!(
                "unknown event filter '{}'",
                other
            )))
        }
    };

    Ok(Json(ctx.events.list(window).await?))
}

async fn get_event(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Event>> {
    Ok(Json(ctx.events.get(id).await?))
}

async fn create_event(State(ctx): State<AppContext>, req: Request) -> ApiResult<Json<Event>> {
    let (input, file) = upload::read_submission(req, "poster")
        .await?
        .decode::<EventInput>()?;

    Ok(Json(ctx.events.create(input, file).await?))
}

async fn update_event(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    req: Request,
) -> ApiResult<Json<Event>> {
    let (input, file) = upload::read_submission(req, "poster")
        .await?
        .decode::<EventInput>()?;

    Ok(Json(ctx.events.update(id, input, file).await?))
}

async fn delete_event(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    ctx.events.delete(id).await?;

    Ok(Json(json!({ "success": true })))
}
