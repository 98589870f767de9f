//! Record CRUD handlers: list, read, create, update, delete.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    Form, Json,
};

use crate::error::AppError;
use crate::model::{ListParams, ListQuery, RecordInput};
use crate::response::{self, MessageBody, Pagination};
use crate::state::AppState;

fn parse_id(id_str: &str) -> Result<i32, AppError> {
    id_str
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid record id".into()))
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn rejected(status: StatusCode, detail: String, message: &str) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }
    tracing::debug!(error = %detail, "rejected request body");
    AppError::BadRequest(message.into())
}

/// Record fields from a JSON or urlencoded form body, picked by `Content-Type`.
pub struct RecordBody(pub RecordInput);

#[async_trait]
impl<S> FromRequest<S> for RecordBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(input) = Form::<RecordInput>::from_request(req, state)
                .await
                .map_err(|e| rejected(e.status(), e.body_text(), "Invalid form body"))?;
            return Ok(RecordBody(input));
        }
        let Json(input) = Json::<RecordInput>::from_request(req, state)
            .await
            .map_err(|e| rejected(e.status(), e.body_text(), "Invalid JSON body"))?;
        Ok(RecordBody(input))
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let params = ListParams::from(query);
    let page = state.store.list(&params).await?;
    let pagination = Pagination::new(params.page, params.limit, page.total);
    Ok(response::paginated(page.records, pagination))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let record = state.store.get(id).await?;
    Ok(response::ok(record))
}

pub async fn create(
    State(state): State<AppState>,
    RecordBody(input): RecordBody,
) -> Result<impl IntoResponse, AppError> {
    let record = state.store.create(&input).await?;
    tracing::info!(id = record.id, "record created");
    Ok(response::created(record))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    RecordBody(input): RecordBody,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let record = state.store.update(id, &input).await?;
    tracing::info!(id, "record updated");
    Ok(response::ok(record))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    state.store.delete(id).await?;
    tracing::info!(id, "record deleted");
    Ok(response::ok(MessageBody {
        message: "Record deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_id("99999999999"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn form_content_type_is_detected() {
        let req = |ct: &str| {
            axum::http::Request::builder()
                .header(CONTENT_TYPE, ct)
                .body(axum::body::Body::empty())
                .unwrap()
        };
        assert!(is_form(&req("application/x-www-form-urlencoded")));
        assert!(is_form(&req("application/x-www-form-urlencoded; charset=UTF-8")));
        assert!(!is_form(&req("application/json")));
        assert!(!is_form(&Request::new(axum::body::Body::empty())));
    }

    #[test]
    fn oversized_bodies_map_to_413() {
        let err = rejected(StatusCode::PAYLOAD_TOO_LARGE, String::new(), "Invalid form body");
        assert!(matches!(err, AppError::PayloadTooLarge));
        let err = rejected(StatusCode::UNPROCESSABLE_ENTITY, "bad age".into(), "Invalid form body");
        assert!(matches!(err, AppError::BadRequest(m) if m == "Invalid form body"));
    }
}
