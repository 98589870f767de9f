//! Bind values for statements whose parameter list is built at runtime.

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::{QueryAs, QueryScalar};

use crate::model::RecordInput;

#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Text(String),
    BigInt(i64),
}

pub fn bind_all<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for p in params {
        query = match p {
            BindValue::Text(s) => query.bind(s.clone()),
            BindValue::BigInt(n) => query.bind(*n),
        };
    }
    query
}

pub fn bind_all_scalar<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    params: &[BindValue],
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for p in params {
        query = match p {
            BindValue::Text(s) => query.bind(s.clone()),
            BindValue::BigInt(n) => query.bind(*n),
        };
    }
    query
}

/// Binds the fifteen mutable columns as `$1..$15`, in `MUTABLE_COLUMNS` order.
pub fn bind_input<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    input: &RecordInput,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    query
        .bind(input.name.clone())
        .bind(input.age)
        .bind(input.gender.clone())
        .bind(input.blood_type.clone())
        .bind(input.medical_condition.clone())
        .bind(input.date_of_admission)
        .bind(input.doctor.clone())
        .bind(input.hospital.clone())
        .bind(input.insurance_provider.clone())
        .bind(input.billing_amount)
        .bind(input.room_number.clone())
        .bind(input.admission_type.clone())
        .bind(input.discharge_date)
        .bind(input.medication.clone())
        .bind(input.test_results.clone())
}
