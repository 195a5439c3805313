//! CrudService and the repository seam it drives.

mod crud;
mod postgres;
mod repository;
pub use crud::{CrudService, ListParams, ListResult, Paging};
pub use postgres::PgRepository;
pub use repository::{ListQuery, Page, RecordRepository};
