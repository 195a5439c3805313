//! crud-generator: generic CRUD REST surface over registered record types, with a nested
//! filter language compiled to parameterized PostgreSQL.

pub mod error;
pub mod filter;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;

pub use error::{AppError, ConfigError, FilterError, ModelError, UnsupportedOperator};
pub use filter::{compile, compile_scoped, Condition, Filter, Predicate, PredicateBuilder, QueryBuilder};
pub use model::{FieldDescriptor, Model, ModelDescriptor, ModelRegistry, NamingStrategy, Record, SchemaLookup, StaticColumns};
pub use response::{success_page, Envelope, ResponseShaper};
pub use routes::{app_routes, common_routes, crud_routes};
pub use service::{CrudService, ListParams, Paging, PgRepository, RecordRepository};
pub use settings::Settings;
pub use state::AppState;
