//! Storage seam for record CRUD. The service compiles filters; repositories only execute.

use crate::error::AppError;
use crate::filter::Predicate;
use crate::model::Model;
use crate::sql::OrderBy;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One page request. `predicate` already carries the soft-delete exclusion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub predicate: Option<Predicate>,
    pub order: OrderBy,
    pub limit: u32,
    pub offset: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub rows: Vec<Value>,
    /// Matching rows across all pages.
    pub total: u64,
}

#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn list(&self, model: &Model, query: &ListQuery) -> Result<Page, AppError>;

    /// Live (not soft-deleted) row by primary key.
    async fn get_by_id(&self, model: &Model, id: &str) -> Result<Option<Value>, AppError>;

    async fn create(&self, model: &Model, body: &Map<String, Value>) -> Result<Value, AppError>;

    async fn update(&self, model: &Model, id: &str, body: &Map<String, Value>) -> Result<Option<Value>, AppError>;

    /// Returns false when no live row matched.
    async fn delete(&self, model: &Model, id: &str) -> Result<bool, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}
