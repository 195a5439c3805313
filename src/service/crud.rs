//! Generic CRUD over any registered model: filter compilation, paging, not-found handling.

use crate::error::AppError;
use crate::filter::{compile_scoped, Filter, PredicateBuilder};
use crate::model::Model;
use crate::service::repository::{ListQuery, RecordRepository};
use crate::sql::OrderBy;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paging {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Paging {
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

/// Raw list parameters as received from the client.
#[derive(Clone, Debug, Default)]
pub struct ListParams {
    /// 1-based; 0 or missing means the first page.
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub filter: String,
    pub order_by: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListResult {
    pub rows: Vec<Value>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Clone)]
pub struct CrudService {
    repository: Arc<dyn RecordRepository>,
    paging: Paging,
}

impl CrudService {
    pub fn new(repository: Arc<dyn RecordRepository>, paging: Paging) -> Self {
        CrudService { repository, paging }
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    /// Parse the filter, scope it to live rows and fetch one page.
    pub async fn list(&self, model: &Model, params: &ListParams) -> Result<ListResult, AppError> {
        let filter = Filter::parse(&params.filter)?;
        let predicate = compile_scoped(&filter, model, &PredicateBuilder)?;
        let order = OrderBy::parse(&params.order_by)?;
        let page = params.page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = params
            .page_size
            .filter(|s| *s > 0)
            .unwrap_or(self.paging.default_page_size)
            .min(self.paging.max_page_size);
        let query = ListQuery {
            predicate,
            order,
            limit: page_size,
            offset: (page as u64 - 1) * page_size as u64,
        };
        let result = self.repository.list(model, &query).await?;
        Ok(ListResult {
            rows: result.rows,
            total: result.total,
            page,
            page_size,
        })
    }

    pub async fn read(&self, model: &Model, id: &str) -> Result<Value, AppError> {
        self.repository
            .get_by_id(model, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", model.name, id)))
    }

    pub async fn create(&self, model: &Model, body: &Map<String, Value>) -> Result<Value, AppError> {
        self.repository.create(model, body).await
    }

    /// The row must exist (and not be soft-deleted) before it is updated.
    pub async fn update(&self, model: &Model, id: &str, body: &Map<String, Value>) -> Result<Value, AppError> {
        if self.repository.get_by_id(model, id).await?.is_none() {
            return Err(AppError::NotFound("record not found".into()));
        }
        self.repository
            .update(model, id, body)
            .await?
            .ok_or_else(|| AppError::NotFound("record not found".into()))
    }

    pub async fn delete(&self, model: &Model, id: &str) -> Result<(), AppError> {
        if self.repository.delete(model, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("{} {}", model.name, id)))
        }
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }
}
