/// Dashboard statistics endpoint
use crate::{context::AppContext, error::ApiResult};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/dashboard/stats", get(stats))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub events_count: i64,
    pub upcoming_events_count: i64,
    pub news_count: i64,
    pub recent_news_count: i64,
    pub system_status: String,
    pub version: String,
}

/// Read-only aggregate counts for the admin dashboard
async fn stats(State(ctx): State<AppContext>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(DashboardStats {
        events_count: ctx.events.count().await?,
        upcoming_events_count: ctx.events.count_upcoming().await?,
        news_count: ctx.news.count().await?,
        recent_news_count: ctx.news.count_recent().await?,
        system_status: "ok".to_string(),
        version: ctx.config.service.version.clone(),
    }))
}
