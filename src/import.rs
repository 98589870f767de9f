//! One-time bootstrap import of records from a CSV file.
//!
//! The import only runs against an empty store. Headers may use either the
//! dataset's display names ("Blood Type") or column names (`blood_type`); each
//! field has an ordered alias list and the first non-empty cell wins. Rows are
//! inserted one at a time and the first failure aborts the whole import.

use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::coerce;
use crate::error::ImportError;
use crate::model::RecordInput;
use crate::store::RecordStore;

pub const DEFAULT_CSV_PATH: &str = "data/healthcare_dataset.csv";

/// Accepted header names per field, preferred first.
pub const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("name", &["Name", "name"]),
    ("age", &["Age", "age"]),
    ("gender", &["Gender", "gender"]),
    ("blood_type", &["Blood Type", "blood_type"]),
    ("medical_condition", &["Medical Condition", "medical_condition"]),
    ("date_of_admission", &["Date of Admission", "date_of_admission"]),
    ("doctor", &["Doctor", "doctor"]),
    ("hospital", &["Hospital", "hospital"]),
    ("insurance_provider", &["Insurance Provider", "insurance_provider"]),
    ("billing_amount", &["Billing Amount", "billing_amount"]),
    ("room_number", &["Room Number", "room_number"]),
    ("admission_type", &["Admission Type", "admission_type"]),
    ("discharge_date", &["Discharge Date", "discharge_date"]),
    ("medication", &["Medication", "medication"]),
    ("test_results", &["Test Results", "test_results"]),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Store already had records; nothing was inserted.
    Skipped { existing: i64 },
    /// No input file; the fallback sample records were inserted.
    Sampled { inserted: usize },
    Imported { inserted: usize },
}

/// Column positions for each field, in alias order. Built once per file.
struct ColumnMap {
    positions: HashMap<&'static str, Vec<usize>>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let index: HashMap<&str, usize> = headers.iter().enumerate().map(|(i, h)| (h, i)).collect();
        let positions = FIELD_ALIASES
            .iter()
            .map(|(field, aliases)| {
                let cols = aliases.iter().filter_map(|a| index.get(a).copied()).collect();
                (*field, cols)
            })
            .collect();
        ColumnMap { positions }
    }

    fn is_empty(&self) -> bool {
        self.positions.values().all(Vec::is_empty)
    }

    /// First non-empty cell among the field's aliases.
    fn text<'r>(&self, row: &'r StringRecord, field: &str) -> Option<&'r str> {
        self.positions
            .get(field)?
            .iter()
            .filter_map(|i| row.get(*i))
            .find(|v| !v.is_empty())
    }

    fn owned(&self, row: &StringRecord, field: &str) -> Option<String> {
        self.text(row, field).map(String::from)
    }

    fn date(&self, row: &StringRecord, field: &'static str, line: u64) -> Result<Option<chrono::NaiveDate>, ImportError> {
        match self.text(row, field) {
            None => Ok(None),
            Some(v) => coerce::date(v).map(Some).ok_or_else(|| ImportError::InvalidDate {
                line,
                field,
                value: v.to_string(),
            }),
        }
    }

    fn to_input(&self, row: &StringRecord, line: u64) -> Result<RecordInput, ImportError> {
        Ok(RecordInput {
            name: self.owned(row, "name"),
            age: self
                .text(row, "age")
                .and_then(coerce::leading_int)
                .and_then(|n| i32::try_from(n).ok()),
            gender: self.owned(row, "gender"),
            blood_type: self.owned(row, "blood_type"),
            medical_condition: self.owned(row, "medical_condition"),
            date_of_admission: self.date(row, "date_of_admission", line)?,
            doctor: self.owned(row, "doctor"),
            hospital: self.owned(row, "hospital"),
            insurance_provider: self.owned(row, "insurance_provider"),
            billing_amount: self.text(row, "billing_amount").and_then(coerce::amount),
            room_number: self.owned(row, "room_number"),
            admission_type: self.owned(row, "admission_type"),
            discharge_date: self.date(row, "discharge_date", line)?,
            medication: self.owned(row, "medication"),
            test_results: self.owned(row, "test_results"),
        })
    }
}

/// Import from `path` unless the store already holds records. A missing file
/// falls back to the sample records.
pub async fn import_if_empty(store: &dyn RecordStore, path: &Path) -> Result<ImportOutcome, ImportError> {
    let existing = store.count().await?;
    if existing > 0 {
        tracing::info!(existing, "database already has data, skipping CSV import");
        return Ok(ImportOutcome::Skipped { existing });
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "CSV file not found, creating sample data");
            let inserted = insert_sample_records(store).await?;
            return Ok(ImportOutcome::Sampled { inserted });
        }
        Err(source) => {
            return Err(ImportError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    tracing::info!(path = %path.display(), "loading CSV data");
    let inserted = import_csv(store, &bytes).await?;
    tracing::info!(inserted, "imported records from CSV");
    Ok(ImportOutcome::Imported { inserted })
}

/// Parse `data` as CSV with a header row and insert each row in file order.
pub async fn import_csv(store: &dyn RecordStore, data: &[u8]) -> Result<usize, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(data);
    let columns = ColumnMap::from_headers(reader.headers()?);
    if columns.is_empty() {
        tracing::warn!("CSV header has no recognised columns");
    }

    let mut inserted = 0usize;
    let mut row = StringRecord::new();
    while reader.read_record(&mut row)? {
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let input = columns.to_input(&row, line)?;
        store
            .create(&input)
            .await
            .map_err(|source| ImportError::Insert { line, source })?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Records inserted when no CSV file is available.
pub fn sample_records() -> Vec<RecordInput> {
    vec![
        RecordInput {
            name: Some("John Doe".into()),
            age: Some(45),
            gender: Some("Male".into()),
            blood_type: Some("A+".into()),
            medical_condition: Some("Hypertension".into()),
            doctor: Some("Dr. Smith".into()),
            hospital: Some("General Hospital".into()),
            insurance_provider: Some("HealthCare Plus".into()),
            billing_amount: Some(5000.0),
            room_number: Some("101".into()),
            admission_type: Some("Emergency".into()),
            medication: Some("Lisinopril".into()),
            test_results: Some("Normal".into()),
            ..Default::default()
        },
        RecordInput {
            name: Some("Jane Smith".into()),
            age: Some(32),
            gender: Some("Female".into()),
            blood_type: Some("B-".into()),
            medical_condition: Some("Diabetes".into()),
            doctor: Some("Dr. Johnson".into()),
            hospital: Some("City Medical Center".into()),
            insurance_provider: Some("MedCare".into()),
            billing_amount: Some(3500.0),
            room_number: Some("205".into()),
            admission_type: Some("Scheduled".into()),
            medication: Some("Metformin".into()),
            test_results: Some("Elevated glucose".into()),
            ..Default::default()
        },
    ]
}

pub async fn insert_sample_records(store: &dyn RecordStore) -> Result<usize, ImportError> {
    let samples = sample_records();
    for input in &samples {
        store.create(input).await?;
    }
    tracing::info!(inserted = samples.len(), "created sample healthcare data");
    Ok(samples.len())
}
