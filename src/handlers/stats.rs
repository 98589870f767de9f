//! Aggregate statistics over all records.

use axum::{extract::State, response::IntoResponse};

use crate::error::AppError;
use crate::response;
use crate::state::AppState;

pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = state.store.stats().await?;
    Ok(response::ok(stats))
}
