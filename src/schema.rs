//! Records table DDL. Safe to run on every startup.

use sqlx::PgPool;

use crate::error::AppError;

pub const CREATE_RECORDS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS healthcare_records (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        age INTEGER,
        gender VARCHAR(50),
        blood_type VARCHAR(10),
        medical_condition TEXT,
        date_of_admission DATE,
        doctor VARCHAR(255),
        hospital VARCHAR(255),
        insurance_provider VARCHAR(255),
        billing_amount DECIMAL(10,2),
        room_number VARCHAR(50),
        admission_type VARCHAR(100),
        discharge_date DATE,
        medication TEXT,
        test_results TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

pub const CREATE_CREATED_AT_INDEX: &str = "CREATE INDEX IF NOT EXISTS healthcare_records_created_at_idx \
     ON healthcare_records (created_at DESC, id DESC)";

/// Create the records table and its list index if they do not exist.
pub async fn ensure_records_table(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(CREATE_RECORDS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_CREATED_AT_INDEX).execute(pool).await?;
    tracing::debug!("records table ready");
    Ok(())
}
