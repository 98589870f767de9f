//! Response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorBody { error: message.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

/// Page metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Pagination { page, limit, total, pages }
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn paginated<T: Serialize>(data: Vec<T>, pagination: Pagination) -> (StatusCode, Json<Paginated<T>>) {
    (StatusCode::OK, Json(Paginated { data, pagination }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_round_up() {
        assert_eq!(Pagination::new(1, 10, 25).pages, 3);
        assert_eq!(Pagination::new(1, 10, 20).pages, 2);
        assert_eq!(Pagination::new(1, 10, 0).pages, 0);
    }

    #[test]
    fn error_body_shape() {
        let v = serde_json::to_value(ErrorBody::new("Endpoint not found")).unwrap();
        assert_eq!(v, serde_json::json!({ "error": "Endpoint not found" }));
    }
}
