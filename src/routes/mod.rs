//! Routers: common endpoints and record CRUD.

pub mod common;
pub mod crud;
pub use common::common_routes;
pub use crud::crud_routes;

use crate::state::AppState;
use axum::Router;

/// Common and CRUD routes merged into one router.
pub fn app_routes(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(crud_routes(state, body_limit))
}
