//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod files;
pub mod health;
pub mod upload;

/// Creates the routes nested under `/api`.
///
/// File serving is mounted here as well, as an alias of the root `/files`
/// route.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(upload::routes())
        .merge(files::routes())
}
