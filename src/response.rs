//! Standard response envelope helpers and the hook consumers use to reshape bodies.

use crate::error::AppError;
use crate::service::ListResult;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub meta: ListMeta,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct ListMeta {
    /// Rows in this page.
    pub count: u64,
    /// Rows matching the filter across all pages.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

pub fn success_page(result: ListResult) -> (StatusCode, Json<SuccessMany<serde_json::Value>>) {
    let meta = ListMeta {
        count: result.rows.len() as u64,
        total: result.total,
        page: result.page,
        page_size: result.page_size,
    };
    (
        StatusCode::OK,
        Json(SuccessMany {
            data: result.rows,
            meta,
        }),
    )
}

/// Turns handler outcomes into responses. Every method defaults to the standard envelope, so an
/// implementation overrides only the bodies it wants to change.
pub trait ResponseShaper: Send + Sync {
    /// A single record: read and update answer 200, create answers 201.
    fn detail(&self, status: StatusCode, row: Value) -> Response {
        (status, Json(SuccessOne { data: row })).into_response()
    }

    fn list(&self, result: ListResult) -> Response {
        success_page(result).into_response()
    }

    /// Any failure after routing, including unknown models.
    fn error(&self, error: AppError) -> Response {
        error.into_response()
    }
}

/// `{ data }`, `{ data, meta }` and `{ error }` bodies.
#[derive(Clone, Copy, Debug, Default)]
pub struct Envelope;

impl ResponseShaper for Envelope {}
