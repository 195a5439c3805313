//! Shared application state for all routes. The registry is frozen before serving.

use crate::error::AppError;
use crate::model::{Model, ModelRegistry};
use crate::response::{Envelope, ResponseShaper};
use crate::service::CrudService;
use axum::response::Response;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub service: CrudService,
    pub shaper: Arc<dyn ResponseShaper>,
}

impl AppState {
    pub fn new(registry: ModelRegistry, service: CrudService) -> Self {
        AppState {
            registry: Arc::new(registry),
            service,
            shaper: Arc::new(Envelope),
        }
    }

    /// Replace the standard envelope for detail, list and error bodies.
    pub fn with_shaper(mut self, shaper: impl ResponseShaper + 'static) -> Self {
        self.shaper = Arc::new(shaper);
        self
    }

    /// Finish a handler: errors go through the shaper too.
    pub fn respond(&self, outcome: Result<Response, AppError>) -> Response {
        outcome.unwrap_or_else(|e| self.shaper.error(e))
    }

    /// Registered model by route name, or 404.
    pub fn model(&self, name: &str) -> Result<Arc<Model>, AppError> {
        self.registry
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("model {}", name)))
    }
}
