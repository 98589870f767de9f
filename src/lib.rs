//! EMR records API: CRUD over a PostgreSQL table of healthcare records, with a
//! one-time CSV bootstrap.

pub mod coerce;
pub mod config;
pub mod error;
pub mod handlers;
pub mod import;
pub mod middleware;
pub mod model;
pub mod response;
pub mod routes;
pub mod schema;
pub mod server;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{AppConfig, HttpConfig, RateLimitConfig};
pub use error::{AppError, ConfigError, ImportError, ServerError};
pub use import::{import_if_empty, ImportOutcome};
pub use model::{HealthcareRecord, ListParams, RecordInput, RecordStats};
pub use routes::app;
pub use schema::ensure_records_table;
pub use state::AppState;
pub use store::{MemoryRecordStore, PgRecordStore, RecordStore};
