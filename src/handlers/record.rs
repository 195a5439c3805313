//! Record CRUD handlers: list, read, create, update, delete.
//!
//! Each handler resolves the model, calls the service, and hands the outcome to the state's
//! [`ResponseShaper`](crate::response::ResponseShaper) so consumers control every body.

use crate::error::AppError;
use crate::service::ListParams;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn parse_number(params: &HashMap<String, String>, key: &str) -> Result<Option<u32>, AppError> {
    match params.get(key).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{} must be a non-negative integer", key))),
    }
}

async fn list_records(
    state: &AppState,
    model_name: &str,
    params: &HashMap<String, String>,
) -> Result<Response, AppError> {
    let model = state.model(model_name)?;
    let params = ListParams {
        page: parse_number(params, "page")?,
        page_size: parse_number(params, "page_size")?,
        filter: params.get("filter").cloned().unwrap_or_default(),
        order_by: params.get("order_by").cloned().unwrap_or_default(),
    };
    let result = state.service.list(&model, &params).await?;
    Ok(state.shaper.list(result))
}

/// `GET /crud/:model?page=&page_size=&filter=&order_by=`
pub async fn list(
    State(state): State<AppState>,
    Path(model_name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let outcome = list_records(&state, &model_name, &params).await;
    state.respond(outcome)
}

async fn read_record(state: &AppState, model_name: &str, id: &str) -> Result<Response, AppError> {
    let model = state.model(model_name)?;
    let row = state.service.read(&model, id).await?;
    Ok(state.shaper.detail(StatusCode::OK, row))
}

pub async fn read(State(state): State<AppState>, Path((model_name, id)): Path<(String, String)>) -> Response {
    let outcome = read_record(&state, &model_name, &id).await;
    state.respond(outcome)
}

async fn create_record(state: &AppState, model_name: &str, body: Value) -> Result<Response, AppError> {
    let model = state.model(model_name)?;
    let body = body_to_map(body)?;
    let row = state.service.create(&model, &body).await?;
    Ok(state.shaper.detail(StatusCode::CREATED, row))
}

pub async fn create(
    State(state): State<AppState>,
    Path(model_name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let outcome = create_record(&state, &model_name, body).await;
    state.respond(outcome)
}

async fn update_record(state: &AppState, model_name: &str, id: &str, body: Value) -> Result<Response, AppError> {
    let model = state.model(model_name)?;
    let body = body_to_map(body)?;
    let row = state.service.update(&model, id, &body).await?;
    Ok(state.shaper.detail(StatusCode::OK, row))
}

pub async fn update(
    State(state): State<AppState>,
    Path((model_name, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let outcome = update_record(&state, &model_name, &id, body).await;
    state.respond(outcome)
}

async fn delete_record(state: &AppState, model_name: &str, id: &str) -> Result<Response, AppError> {
    let model = state.model(model_name)?;
    state.service.delete(&model, id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn delete(State(state): State<AppState>, Path((model_name, id)): Path<(String, String)>) -> Response {
    let outcome = delete_record(&state, &model_name, &id).await;
    state.respond(outcome)
}
