//! Record CRUD and stats routes.

use axum::{routing::get, Router};

use crate::handlers::{create, delete as delete_handler, list, read, stats, update};
use crate::state::AppState;

pub fn record_routes(state: AppState) -> Router {
    Router::new()
        .route("/records", get(list).post(create))
        .route("/records/:id", get(read).put(update).delete(delete_handler))
        .route("/stats", get(stats))
        .with_state(state)
}
