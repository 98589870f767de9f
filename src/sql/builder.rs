//! Builds the parameterized statements used by the PostgreSQL record store.

use crate::model::ListParams;
use crate::sql::BindValue;

pub const TABLE: &str = "healthcare_records";

/// Columns written by create and update, in bind order.
pub const MUTABLE_COLUMNS: &[&str] = &[
    "name",
    "age",
    "gender",
    "blood_type",
    "medical_condition",
    "date_of_admission",
    "doctor",
    "hospital",
    "insurance_provider",
    "billing_amount",
    "room_number",
    "admission_type",
    "discharge_date",
    "medication",
    "test_results",
];

/// Columns matched by the list search term.
pub const SEARCH_COLUMNS: &[&str] = &["name", "medical_condition", "doctor"];

pub const COUNT_ALL: &str = "SELECT COUNT(*) FROM healthcare_records";

pub const GENDER_DISTRIBUTION: &str = "SELECT gender, COUNT(*) AS count FROM healthcare_records \
     GROUP BY gender ORDER BY gender NULLS LAST";

pub const TOP_CONDITIONS: &str = "SELECT medical_condition, COUNT(*) AS count FROM healthcare_records \
     GROUP BY medical_condition ORDER BY count DESC, medical_condition NULLS LAST LIMIT 10";

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT list for a full record. `billing_amount` is numeric in the table and read as float8.
fn select_column_list() -> String {
    let mut cols = vec!["id".to_string()];
    cols.extend(MUTABLE_COLUMNS.iter().map(|c| match *c {
        "billing_amount" => "billing_amount::float8 AS billing_amount".to_string(),
        other => other.to_string(),
    }));
    cols.push("created_at".into());
    cols.push("updated_at".into());
    cols.join(", ")
}

fn placeholders(from: usize, n: usize) -> Vec<String> {
    (from..from + n).map(|i| format!("${}", i)).collect()
}

/// Escapes LIKE wildcards so the term matches as a literal substring.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn search_clause(q: &mut QueryBuf, search: Option<&str>) -> String {
    let Some(term) = search else {
        return String::new();
    };
    let n = q.push_param(BindValue::Text(like_pattern(term)));
    let ors: Vec<String> = SEARCH_COLUMNS
        .iter()
        .map(|c| format!("{} ILIKE ${} ESCAPE '\\'", c, n))
        .collect();
    format!(" WHERE {}", ors.join(" OR "))
}

/// SELECT one page, newest first.
pub fn select_list(params: &ListParams) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = search_clause(&mut q, params.search.as_deref());
    let limit = q.push_param(BindValue::BigInt(params.limit));
    let offset = q.push_param(BindValue::BigInt(params.offset()));
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
        select_column_list(),
        TABLE,
        where_clause,
        limit,
        offset
    );
    q
}

/// COUNT(*) with the same filter as `select_list`.
pub fn count_list(params: &ListParams) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = search_clause(&mut q, params.search.as_deref());
    q.sql = format!("SELECT COUNT(*) FROM {}{}", TABLE, where_clause);
    q
}

/// SELECT by id. Caller binds id as `$1`.
pub fn select_by_id() -> String {
    format!("SELECT {} FROM {} WHERE id = $1", select_column_list(), TABLE)
}

/// INSERT of every mutable column; id and timestamps come from column defaults.
pub fn insert() -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        TABLE,
        MUTABLE_COLUMNS.join(", "),
        placeholders(1, MUTABLE_COLUMNS.len()).join(", "),
        select_column_list()
    )
}

/// UPDATE replacing every mutable column and refreshing `updated_at`. Id is the last parameter.
pub fn update() -> String {
    let mut sets: Vec<String> = MUTABLE_COLUMNS
        .iter()
        .zip(placeholders(1, MUTABLE_COLUMNS.len()))
        .map(|(c, p)| format!("{} = {}", c, p))
        .collect();
    sets.push("updated_at = NOW()".into());
    format!(
        "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
        TABLE,
        sets.join(", "),
        MUTABLE_COLUMNS.len() + 1,
        select_column_list()
    )
}

/// DELETE by id. Caller binds id as `$1`.
pub fn delete() -> String {
    format!("DELETE FROM {} WHERE id = $1 RETURNING id", TABLE)
}
