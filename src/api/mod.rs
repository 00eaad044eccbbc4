/// API routes and handlers
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod news;
pub mod uploads;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(events::routes())
        .merge(news::routes())
        .merge(dashboard::routes())
        .merge(auth::routes())
        .merge(uploads::routes())
}
