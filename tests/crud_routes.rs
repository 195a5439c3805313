use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use crud_generator::service::{ListQuery, ListResult, Page};
use crud_generator::{
    app_routes, AppError, AppState, CrudService, FieldDescriptor, Model, ModelDescriptor, ModelRegistry, Paging,
    Record, RecordRepository, ResponseShaper,
};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

struct User;

impl Record for User {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new("User", "users")
            .field(FieldDescriptor::new("ID").pg_type("bigint"))
            .field(FieldDescriptor::new("Name"))
            .field(FieldDescriptor::new("Age").pg_type("integer"))
            .field(FieldDescriptor::new("DeletedAt").tags("soft_delete_field"))
    }
}

/// Keeps rows in memory and records every list query.
#[derive(Default)]
struct MemoryRepository {
    rows: Mutex<Vec<Value>>,
    queries: Mutex<Vec<ListQuery>>,
}

#[async_trait]
impl RecordRepository for MemoryRepository {
    async fn list(&self, _model: &Model, query: &ListQuery) -> Result<Page, AppError> {
        self.queries.lock().unwrap().push(query.clone());
        let rows = self.rows.lock().unwrap().clone();
        Ok(Page {
            total: rows.len() as u64,
            rows,
        })
    }

    async fn get_by_id(&self, _model: &Model, id: &str) -> Result<Option<Value>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r["id"].to_string() == id)
            .cloned())
    }

    async fn create(&self, _model: &Model, body: &Map<String, Value>) -> Result<Value, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let mut row = body.clone();
        row.insert("id".into(), json!(rows.len() + 1));
        rows.push(Value::Object(row.clone()));
        Ok(Value::Object(row))
    }

    async fn update(&self, model: &Model, id: &str, body: &Map<String, Value>) -> Result<Option<Value>, AppError> {
        let Some(Value::Object(mut row)) = self.get_by_id(model, id).await? else {
            return Ok(None);
        };
        row.extend(body.clone());
        Ok(Some(Value::Object(row)))
    }

    async fn delete(&self, _model: &Model, id: &str) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r["id"].to_string() != id);
        Ok(rows.len() != before)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

fn state() -> (Arc<MemoryRepository>, AppState) {
    let repo = Arc::new(MemoryRepository::default());
    let mut registry = ModelRegistry::new();
    registry.register_record::<User>().unwrap();
    let service = CrudService::new(repo.clone(), Paging::default());
    (repo, AppState::new(registry, service))
}

fn app() -> (Arc<MemoryRepository>, Router) {
    let (repo, state) = state();
    (repo, app_routes(state, 1024))
}

/// Flat bodies in the style of a consumer's own API.
struct Flat;

impl ResponseShaper for Flat {
    fn list(&self, result: ListResult) -> Response {
        Json(json!({
            "items": result.rows,
            "total_count": result.total,
        }))
        .into_response()
    }

    fn error(&self, error: AppError) -> Response {
        let (status, code) = error.status_and_code();
        (status, Json(json!({ "ok": false, "reason": code }))).into_response()
    }
}

fn encode(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_list_passes_scoped_predicate() {
    let (repo, app) = app();
    let filter = encode(r#"[["age","lte","18"],"_and",["name","contain","%jo%"]]"#);
    let (status, body) = send(app, get(&format!("/crud/User?filter={}&page=2&page_size=5&order_by=age%20desc", filter))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["page"], 2);
    assert_eq!(body["meta"]["page_size"], 5);

    let queries = repo.queries.lock().unwrap();
    assert_eq!(
        queries[0].predicate.as_ref().unwrap().to_string(),
        "((age <= 18) AND (name LIKE %jo%)) AND (deleted_at IS NULL)"
    );
    assert_eq!(queries[0].offset, 5);
}

#[tokio::test]
async fn test_unknown_model_is_404() {
    let (_, app) = app();
    let (status, body) = send(app, get("/crud/Comment")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_malformed_filters_are_client_errors() {
    let cases = [
        (r#"["age","like","1"]"#, "unsupported_operator"),
        (r#"["age","eq"]"#, "invalid_filter"),
        (r#"["age","bw","1::2::3"]"#, "invalid_value"),
        ("not json", "invalid_filter"),
    ];
    for (filter, code) in cases {
        let (_, app) = app();
        let (status, body) = send(app, get(&format!("/crud/User?filter={}", encode(filter)))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", filter);
        assert_eq!(body["error"]["code"], code, "{}", filter);
    }
}

#[tokio::test]
async fn test_bad_page_is_rejected() {
    let (_, app) = app();
    let (status, _) = send(app, get("/crud/User?page=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_read_update_delete() {
    let (_, app) = app();
    let (status, body) = send(app.clone(), json_request("POST", "/crud/User", json!({"name": "jo", "age": 17}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], 1);

    let (status, body) = send(app.clone(), get("/crud/User/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "jo");

    let (status, body) = send(app.clone(), json_request("PUT", "/crud/User/1", json!({"age": 18}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["age"], 18);

    let (status, _) = send(app.clone(), json_request("PUT", "/crud/User/9", json!({"age": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(app.clone(), Request::delete("/crud/User/1").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(app, get("/crud/User/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_object_body_is_rejected() {
    let (_, app) = app();
    let (status, body) = send(app, json_request("POST", "/crud/User", json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_health_and_version() {
    let (_, app) = app();
    let (status, body) = send(app.clone(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (_, body) = send(app.clone(), get("/ready")).await;
    assert_eq!(body["database"], "ok");
    let (_, body) = send(app, get("/version")).await;
    assert_eq!(body["models"], json!(["User"]));
}

#[tokio::test]
async fn test_custom_shaper_reshapes_list_and_errors() {
    let (repo, state) = state();
    repo.rows.lock().unwrap().push(json!({"id": 1, "name": "jo"}));
    let app = app_routes(state.with_shaper(Flat), 1024);

    let (status, body) = send(app.clone(), get("/crud/User")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"items": [{"id": 1, "name": "jo"}], "total_count": 1}));

    let (status, body) = send(app.clone(), get("/crud/Comment")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"ok": false, "reason": "not_found"}));

    let (status, body) = send(app.clone(), get(&format!("/crud/User?filter={}", encode(r#"["age","like","1"]"#)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "unsupported_operator");

    let (status, body) = send(app, get("/crud/User/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "jo");
}
