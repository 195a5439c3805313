//! Example consumer: registers two record types and serves them under /crud.
//!
//! Run from repo root: `cargo run -p example-consumer`
//!
//! ```text
//! GET /crud/User?filter=[["age","lte","18"],"_and",["mature","eq","0"]]&page=1&page_size=20
//! ```

use crud_generator::{
    app_routes, AppState, CrudService, FieldDescriptor, ModelDescriptor, ModelRegistry, PgRepository, Record,
    Settings, StaticColumns,
};
use std::sync::Arc;
use tokio::net::TcpListener;

struct User;

impl Record for User {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new("User", "users")
            .field(FieldDescriptor::new("ID").pg_type("bigint"))
            .field(FieldDescriptor::new("Name"))
            .field(FieldDescriptor::new("Age").pg_type("integer"))
            .field(FieldDescriptor::new("Mature").pg_type("integer"))
            .field(FieldDescriptor::new("CreatedAt").tags("create_time_field").pg_type("timestamptz"))
            .field(FieldDescriptor::new("UpdatedAt").tags("update_time_field").pg_type("timestamptz"))
            .field(FieldDescriptor::new("DeletedAt").tags("soft_delete_field").pg_type("timestamptz"))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("crud_generator=info")),
        )
        .init();

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;

    // Registration fails fast: a model that cannot be resolved never serves traffic.
    let mut registry = ModelRegistry::new();
    registry.register_record::<User>()?;
    let audit = ModelDescriptor::new("AuditLog", "audit_log")
        .schema("ops")
        .field(FieldDescriptor::new("ID").pg_type("uuid"))
        .field(FieldDescriptor::new("Action"))
        .field(FieldDescriptor::new("LoggedAt").tags("create_time_field").pg_type("timestamptz"));
    let columns = StaticColumns::new()
        .column("ID", "id")
        .column("Action", "action_name")
        .column("LoggedAt", "logged_at");
    registry.register(&audit, &columns)?;

    let service = CrudService::new(Arc::new(PgRepository::new(pool)), settings.paging);
    let app = app_routes(AppState::new(registry, service), settings.body_limit);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
