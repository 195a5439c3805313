//! Record CRUD routes. Handlers resolve the model from the `:model` path segment.

use crate::handlers::record::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

/// `/crud/:model` (list, create) and `/crud/:model/:id` (read, update, delete).
pub fn crud_routes(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/crud/:model", get(list).post(create))
        .route("/crud/:model/:id", get(read).put(update).delete(delete_handler))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
