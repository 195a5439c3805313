//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Token absent from the operator table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported operator: {0}")]
pub struct UnsupportedOperator(pub String);

/// Filter parse and compile failures. Paths use `$` for the root and `[n]` per nesting level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid filter at {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("{source} at {path}")]
    UnsupportedOperator {
        path: String,
        #[source]
        source: UnsupportedOperator,
    },
    #[error("invalid value '{value}' for {operator} on {column}: expected two bounds separated by '::'")]
    InvalidValue {
        column: String,
        operator: &'static str,
        value: String,
    },
    /// Failure found while lowering a compiled tree against a model, such as an unknown column.
    #[error("compile: {0}")]
    Compile(String),
}

impl FilterError {
    pub(crate) fn parse(path: &str, reason: impl Into<String>) -> Self {
        FilterError::Parse {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Registration-time failures. A model that fails here is never served.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("model {model}: cannot resolve column for field '{member}': {reason}")]
    SchemaResolution {
        model: String,
        member: String,
        reason: String,
    },
    #[error("model already registered: {0}")]
    DuplicateModel(String),
    #[error("model {model}: invalid identifier '{identifier}'")]
    InvalidIdentifier { model: String, identifier: String },
    #[error("model {model}: primary key column '{column}' is not a declared field")]
    MissingPrimaryKey { model: String, column: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// SQLSTATE class 22: the database rejected a value, e.g. `abc` cast to integer.
fn is_data_exception(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().is_some_and(|code| code.starts_with("22")),
        _ => false,
    }
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Filter(FilterError::Parse { .. }) => (StatusCode::BAD_REQUEST, "invalid_filter"),
            AppError::Filter(FilterError::UnsupportedOperator { .. }) => {
                (StatusCode::BAD_REQUEST, "unsupported_operator")
            }
            AppError::Filter(FilterError::InvalidValue { .. }) => (StatusCode::BAD_REQUEST, "invalid_value"),
            AppError::Filter(FilterError::Compile(_)) => (StatusCode::BAD_REQUEST, "compile_error"),
            AppError::Model(_) => (StatusCode::INTERNAL_SERVER_ERROR, "model_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Db(sqlx::Error::RowNotFound) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Db(e) if is_data_exception(e) => (StatusCode::BAD_REQUEST, "invalid_value"),
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let details = match &self {
            AppError::Filter(FilterError::Parse { path, .. })
            | AppError::Filter(FilterError::UnsupportedOperator { path, .. }) => {
                Some(serde_json::json!({ "path": path }))
            }
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}
