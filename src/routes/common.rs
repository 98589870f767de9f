//! Common routes: health probe and the catch-all 404.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::response::ErrorBody;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    timestamp: String,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Fallback for unmatched routes.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Endpoint not found")))
}

/// GET /health. No state, no database round trip.
pub fn common_routes() -> Router {
    Router::new().route("/health", get(health))
}
