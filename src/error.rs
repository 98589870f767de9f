//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ErrorBody;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("invalid DATABASE_URL: {0}")]
    DatabaseUrl(#[source] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: invalid {field} '{value}'")]
    InvalidDate {
        line: u64,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: insert failed: {source}")]
    Insert {
        line: u64,
        #[source]
        source: AppError,
    },
    #[error(transparent)]
    Store(#[from] AppError),
}

/// Fatal errors from startup or the serve loop.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("connecting to database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("initializing schema: {0}")]
    Schema(#[source] AppError),
    #[error("importing records: {0}")]
    Import(#[from] ImportError),
    #[error("binding listener: {0}")]
    Bind(#[source] std::io::Error),
    #[error("serving: {0}")]
    Serve(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("store: {0}")]
    Store(String),
}

impl AppError {
    pub fn record_not_found(id: i32) -> Self {
        AppError::NotFound(format!("record {}", id))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Record not found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string()),
            AppError::Db(sqlx::Error::RowNotFound) => (StatusCode::NOT_FOUND, "Record not found".to_string()),
            AppError::Db(_) | AppError::Store(_) => {
                tracing::error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}
