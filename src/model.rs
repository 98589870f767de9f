//! Healthcare record types shared by the store, importer and handlers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::coerce::leading_int;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Upper bound on `limit`; larger requests are clamped.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// One patient encounter as stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HealthcareRecord {
    pub id: i32,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_type: Option<String>,
    pub medical_condition: Option<String>,
    pub date_of_admission: Option<NaiveDate>,
    pub doctor: Option<String>,
    pub hospital: Option<String>,
    pub insurance_provider: Option<String>,
    pub billing_amount: Option<f64>,
    pub room_number: Option<String>,
    pub admission_type: Option<String>,
    pub discharge_date: Option<NaiveDate>,
    pub medication: Option<String>,
    pub test_results: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable fields of a record. Missing keys deserialize to `None`, so an update
/// replaces every field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordInput {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_type: Option<String>,
    pub medical_condition: Option<String>,
    pub date_of_admission: Option<NaiveDate>,
    pub doctor: Option<String>,
    pub hospital: Option<String>,
    pub insurance_provider: Option<String>,
    pub billing_amount: Option<f64>,
    pub room_number: Option<String>,
    pub admission_type: Option<String>,
    pub discharge_date: Option<NaiveDate>,
    pub medication: Option<String>,
    pub test_results: Option<String>,
}

/// Raw `?page=&limit=&search=` values, kept as text so bad numbers fall back to defaults.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

/// Normalized list parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListParams {
    pub page: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        ListParams {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
        }
    }
}

impl ListParams {
    pub fn new(page: i64, limit: i64, search: Option<&str>) -> Self {
        ListQuery {
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
            search: search.map(String::from),
        }
        .into()
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl From<ListQuery> for ListParams {
    fn from(q: ListQuery) -> Self {
        let page = q
            .page
            .as_deref()
            .and_then(leading_int)
            .filter(|n| *n >= 1)
            .unwrap_or(1);
        let limit = q
            .limit
            .as_deref()
            .and_then(leading_int)
            .filter(|n| *n >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let search = q.search.filter(|s| !s.is_empty());
        ListParams { page, limit, search }
    }
}

#[derive(Clone, Debug)]
pub struct RecordPage {
    pub records: Vec<HealthcareRecord>,
    pub total: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct GenderCount {
    pub gender: Option<String>,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ConditionCount {
    pub medical_condition: Option<String>,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordStats {
    pub total_records: i64,
    pub gender_distribution: Vec<GenderCount>,
    pub top_conditions: Vec<ConditionCount>,
}
