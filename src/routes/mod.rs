//! Router assembly and the middleware stack.
//!
//! Layers run outermost first: tracing, security headers, compression, CORS,
//! rate limiting, panic recovery, then the body size cap.

mod common;
mod records;

pub use common::{common_routes, not_found};
pub use records::record_routes;

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware,
    response::{IntoResponse, Response},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{self, AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::{CorsOrigins, HttpConfig};
use crate::middleware::{rate_limit, security_headers, RateLimiter};
use crate::response::ErrorBody;
use crate::state::AppState;

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);
    match origins {
        CorsOrigins::Any => layer.allow_origin(cors::Any),
        CorsOrigins::List(list) => layer.allow_origin(AllowOrigin::list(list.iter().cloned())),
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new("Something went wrong!"))).into_response()
}

/// Full application router: health, records, stats, 404 fallback, middleware.
pub fn app(state: AppState, http: &HttpConfig, limiter: Arc<RateLimiter>) -> Router {
    Router::new()
        .merge(common_routes())
        .merge(record_routes(state))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(security_headers))
                .layer(CompressionLayer::new())
                .layer(cors_layer(&http.cors_origins))
                .layer(middleware::from_fn_with_state(limiter, rate_limit))
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(http.max_body_bytes)),
        )
}
