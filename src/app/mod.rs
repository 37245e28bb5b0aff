use axum::Router;
use sqlx::SqlitePool;

/// Shared state available to all handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
}

/// JSON API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(features::access::routes())
        .merge(features::companies::routes())
        .merge(features::organizations::routes())
        .merge(features::users::routes())
        .merge(features::scopes::routes())
        .merge(features::tasks::routes())
        .merge(features::objectives::routes())
        .merge(features::progress::routes())
}

pub mod access;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod features;
pub mod session;
pub mod tenant;
