mod create;
mod delete;
mod show;
mod update;

use axum::{
    routing::{get, post},
    Router,
};

use crate::app::AppState;

/// Organization tree routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/organizations", post(create::create).get(show::list))
        .route("/api/organizations/tree", get(show::tree))
        .route(
            "/api/organizations/:id",
            get(show::show).patch(update::update).delete(delete::delete),
        )
        .route("/api/organizations/:id/children", get(show::children))
}
