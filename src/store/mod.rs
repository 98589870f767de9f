//! Record store: the operations behind every endpoint and the importer.

mod memory;
mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

use async_trait::async_trait;

use crate::error::AppError;
use crate::model::{HealthcareRecord, ListParams, RecordInput, RecordPage, RecordStats};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// One page of records, newest first, with the total matching count.
    async fn list(&self, params: &ListParams) -> Result<RecordPage, AppError>;

    async fn get(&self, id: i32) -> Result<HealthcareRecord, AppError>;

    /// Insert and return the stored record with its generated id and timestamps.
    async fn create(&self, input: &RecordInput) -> Result<HealthcareRecord, AppError>;

    /// Replace every mutable field and refresh `updated_at`.
    async fn update(&self, id: i32, input: &RecordInput) -> Result<HealthcareRecord, AppError>;

    async fn delete(&self, id: i32) -> Result<(), AppError>;

    async fn stats(&self) -> Result<RecordStats, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// Release pooled resources. Further calls fail.
    async fn close(&self);
}
