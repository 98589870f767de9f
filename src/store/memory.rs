//! In-process record store with the same semantics as the PostgreSQL store.
//! Backs the router and importer test suites.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::AppError;
use crate::model::{
    ConditionCount, GenderCount, HealthcareRecord, ListParams, RecordInput, RecordPage, RecordStats,
};
use crate::store::RecordStore;

#[derive(Default)]
struct Table {
    next_id: i32,
    rows: BTreeMap<i32, HealthcareRecord>,
    closed: bool,
}

#[derive(Default)]
pub struct MemoryRecordStore {
    table: Mutex<Table>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_table<T>(&self, f: impl FnOnce(&mut Table) -> Result<T, AppError>) -> Result<T, AppError> {
        let mut table = self
            .table
            .lock()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))?;
        if table.closed {
            return Err(AppError::Store("store is closed".into()));
        }
        f(&mut table)
    }
}

/// DECIMAL(10,2) keeps two fractional digits.
fn round_cents(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

fn required_name(input: &RecordInput) -> Result<String, AppError> {
    input
        .name
        .clone()
        .ok_or_else(|| AppError::Store("null value in column \"name\" violates not-null constraint".into()))
}

fn apply(record: &mut HealthcareRecord, input: &RecordInput, name: String) {
    record.name = name;
    record.age = input.age;
    record.gender = input.gender.clone();
    record.blood_type = input.blood_type.clone();
    record.medical_condition = input.medical_condition.clone();
    record.date_of_admission = input.date_of_admission;
    record.doctor = input.doctor.clone();
    record.hospital = input.hospital.clone();
    record.insurance_provider = input.insurance_provider.clone();
    record.billing_amount = input.billing_amount.map(round_cents);
    record.room_number = input.room_number.clone();
    record.admission_type = input.admission_type.clone();
    record.discharge_date = input.discharge_date;
    record.medication = input.medication.clone();
    record.test_results = input.test_results.clone();
}

fn contains_ci(field: &Option<String>, needle: &str) -> bool {
    field
        .as_deref()
        .map(|s| s.to_lowercase().contains(needle))
        .unwrap_or(false)
}

fn matches_search(record: &HealthcareRecord, search: Option<&str>) -> bool {
    let Some(term) = search else { return true };
    let needle = term.to_lowercase();
    record.name.to_lowercase().contains(&needle)
        || contains_ci(&record.medical_condition, &needle)
        || contains_ci(&record.doctor, &needle)
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list(&self, params: &ListParams) -> Result<RecordPage, AppError> {
        self.with_table(|t| {
            let mut matching: Vec<&HealthcareRecord> = t
                .rows
                .values()
                .filter(|r| matches_search(r, params.search.as_deref()))
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            let total = matching.len() as i64;
            let records = matching
                .into_iter()
                .skip(params.offset().max(0) as usize)
                .take(params.limit.max(0) as usize)
                .cloned()
                .collect();
            Ok(RecordPage { records, total })
        })
    }

    async fn get(&self, id: i32) -> Result<HealthcareRecord, AppError> {
        self.with_table(|t| t.rows.get(&id).cloned().ok_or_else(|| AppError::record_not_found(id)))
    }

    async fn create(&self, input: &RecordInput) -> Result<HealthcareRecord, AppError> {
        let name = required_name(input)?;
        self.with_table(|t| {
            t.next_id += 1;
            let now = Utc::now();
            let mut record = HealthcareRecord {
                id: t.next_id,
                name: String::new(),
                age: None,
                gender: None,
                blood_type: None,
                medical_condition: None,
                date_of_admission: None,
                doctor: None,
                hospital: None,
                insurance_provider: None,
                billing_amount: None,
                room_number: None,
                admission_type: None,
                discharge_date: None,
                medication: None,
                test_results: None,
                created_at: now,
                updated_at: now,
            };
            apply(&mut record, input, name);
            t.rows.insert(record.id, record.clone());
            Ok(record)
        })
    }

    async fn update(&self, id: i32, input: &RecordInput) -> Result<HealthcareRecord, AppError> {
        self.with_table(|t| {
            let record = t.rows.get_mut(&id).ok_or_else(|| AppError::record_not_found(id))?;
            apply(record, input, required_name(input)?);
            record.updated_at = Utc::now().max(record.created_at);
            Ok(record.clone())
        })
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        self.with_table(|t| {
            t.rows
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| AppError::record_not_found(id))
        })
    }

    async fn stats(&self) -> Result<RecordStats, AppError> {
        self.with_table(|t| {
            let mut genders: HashMap<Option<String>, i64> = HashMap::new();
            let mut conditions: HashMap<Option<String>, i64> = HashMap::new();
            for r in t.rows.values() {
                *genders.entry(r.gender.clone()).or_default() += 1;
                *conditions.entry(r.medical_condition.clone()).or_default() += 1;
            }

            // Nulls sort last, matching NULLS LAST in the SQL.
            let key = |v: &Option<String>| (v.is_none(), v.clone());

            let mut gender_distribution: Vec<GenderCount> = genders
                .into_iter()
                .map(|(gender, count)| GenderCount { gender, count })
                .collect();
            gender_distribution.sort_by(|a, b| key(&a.gender).cmp(&key(&b.gender)));

            let mut top_conditions: Vec<ConditionCount> = conditions
                .into_iter()
                .map(|(medical_condition, count)| ConditionCount { medical_condition, count })
                .collect();
            top_conditions.sort_by(|a, b| {
                b.count
                    .cmp(&a.count)
                    .then_with(|| key(&a.medical_condition).cmp(&key(&b.medical_condition)))
            });
            top_conditions.truncate(10);

            Ok(RecordStats {
                total_records: t.rows.len() as i64,
                gender_distribution,
                top_conditions,
            })
        })
    }

    async fn count(&self) -> Result<i64, AppError> {
        self.with_table(|t| Ok(t.rows.len() as i64))
    }

    async fn close(&self) {
        if let Ok(mut t) = self.table.lock() {
            t.closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> RecordInput {
        RecordInput {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn ids_are_monotonic_and_survive_deletes() {
        let store = MemoryRecordStore::new();
        let a = store.create(&input("a")).await.unwrap();
        store.delete(a.id).await.unwrap();
        let b = store.create(&input("b")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn sequential_creates_get_strictly_increasing_ids() {
        let store = MemoryRecordStore::new();
        let mut last = 0;
        for i in 0..50 {
            let r = store.create(&input(&format!("p{i}"))).await.unwrap();
            assert!(r.id > last, "id {} after {}", r.id, last);
            last = r.id;
        }
    }

    #[tokio::test]
    async fn billing_keeps_two_decimals() {
        let store = MemoryRecordStore::new();
        let mut i = input("a");
        i.billing_amount = Some(18856.281);
        let r = store.create(&i).await.unwrap();
        assert_eq!(r.billing_amount, Some(18856.28));
    }

    #[tokio::test]
    async fn missing_name_is_rejected() {
        let store = MemoryRecordStore::new();
        let err = store.create(&RecordInput::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn closed_store_refuses_work() {
        let store = MemoryRecordStore::new();
        store.close().await;
        assert!(store.count().await.is_err());
    }
}
