//! PostgreSQL record store.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::model::{
    ConditionCount, GenderCount, HealthcareRecord, ListParams, RecordInput, RecordPage, RecordStats,
};
use crate::sql::{self, bind_all, bind_all_scalar, bind_input};
use crate::store::RecordStore;

/// Owns the connection pool; every operation borrows a connection per statement.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        PgRecordStore { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list(&self, params: &ListParams) -> Result<RecordPage, AppError> {
        let select = sql::select_list(params);
        let count = sql::count_list(params);
        tracing::debug!(sql = %select.sql, params = ?select.params, "query");

        let rows = bind_all(sqlx::query_as::<_, HealthcareRecord>(&select.sql), &select.params)
            .fetch_all(&self.pool);
        let total = bind_all_scalar(sqlx::query_scalar::<_, i64>(&count.sql), &count.params)
            .fetch_one(&self.pool);
        let (records, total) = tokio::try_join!(rows, total)?;
        Ok(RecordPage { records, total })
    }

    async fn get(&self, id: i32) -> Result<HealthcareRecord, AppError> {
        sqlx::query_as::<_, HealthcareRecord>(&sql::select_by_id())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::record_not_found(id))
    }

    async fn create(&self, input: &RecordInput) -> Result<HealthcareRecord, AppError> {
        let sql = sql::insert();
        let row = bind_input(sqlx::query_as::<_, HealthcareRecord>(&sql), input)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: i32, input: &RecordInput) -> Result<HealthcareRecord, AppError> {
        let sql = sql::update();
        bind_input(sqlx::query_as::<_, HealthcareRecord>(&sql), input)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::record_not_found(id))
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        let deleted: Option<i32> = sqlx::query_scalar(&sql::delete())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        deleted.map(|_| ()).ok_or_else(|| AppError::record_not_found(id))
    }

    async fn stats(&self) -> Result<RecordStats, AppError> {
        let total = sqlx::query_scalar::<_, i64>(sql::COUNT_ALL).fetch_one(&self.pool);
        let genders = sqlx::query_as::<_, GenderCount>(sql::GENDER_DISTRIBUTION).fetch_all(&self.pool);
        let conditions = sqlx::query_as::<_, ConditionCount>(sql::TOP_CONDITIONS).fetch_all(&self.pool);
        let (total_records, gender_distribution, top_conditions) = tokio::try_join!(total, genders, conditions)?;
        Ok(RecordStats {
            total_records,
            gender_distribution,
            top_conditions,
        })
    }

    async fn count(&self) -> Result<i64, AppError> {
        let n = sqlx::query_scalar::<_, i64>(sql::COUNT_ALL)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
