//! Fixed-window request limiter keyed by client IP.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::config::RateLimitConfig;
use crate::response::ErrorBody;

pub const LIMITED_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Clone, Copy, Debug)]
struct Window {
    start: Instant,
    count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset: Duration },
    Limited { retry_after: Duration },
}

pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        RateLimiter {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    fn windows(&self) -> MutexGuard<'_, HashMap<IpAddr, Window>> {
        // Counters stay usable after a panic elsewhere.
        self.windows.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn check(&self, ip: IpAddr) -> Decision {
        self.check_at(ip, Instant::now())
    }

    /// Count one request from `ip` at `now`. A window opens on the first request
    /// and resets once `config.window` has elapsed.
    pub fn check_at(&self, ip: IpAddr, now: Instant) -> Decision {
        let window_len = self.config.window;
        let mut windows = self.windows();
        let w = windows.entry(ip).or_insert(Window { start: now, count: 0 });
        if now.saturating_duration_since(w.start) >= window_len {
            *w = Window { start: now, count: 0 };
        }
        let reset = window_len.saturating_sub(now.saturating_duration_since(w.start));
        if w.count >= self.config.max_requests {
            return Decision::Limited { retry_after: reset };
        }
        w.count += 1;
        Decision::Allowed {
            remaining: self.config.max_requests - w.count,
            reset,
        }
    }

    pub fn prune(&self) -> usize {
        self.prune_at(Instant::now())
    }

    /// Drop expired windows. Returns how many were removed.
    pub fn prune_at(&self, now: Instant) -> usize {
        let window_len = self.config.window;
        let mut windows = self.windows();
        let before = windows.len();
        windows.retain(|_, w| now.saturating_duration_since(w.start) < window_len);
        before - windows.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows().len()
    }
}

/// Whole seconds, rounded up so clients never retry early.
fn secs_ceil(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

fn set_header(headers: &mut HeaderMap, name: &'static str, value: u64) {
    headers.insert(name, HeaderValue::from(value));
}

fn client_ip(req: &Request) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn rate_limit(State(limiter): State<Arc<RateLimiter>>, req: Request, next: Next) -> Response {
    let ip = client_ip(&req);
    let limit = u64::from(limiter.config().max_requests);
    match limiter.check(ip) {
        Decision::Limited { retry_after } => {
            tracing::warn!(%ip, retry_after_secs = secs_ceil(retry_after), "rate limited");
            let mut res = (StatusCode::TOO_MANY_REQUESTS, Json(ErrorBody::new(LIMITED_MESSAGE))).into_response();
            let headers = res.headers_mut();
            set_header(headers, "ratelimit-limit", limit);
            set_header(headers, "ratelimit-remaining", 0);
            set_header(headers, "ratelimit-reset", secs_ceil(retry_after));
            set_header(headers, "retry-after", secs_ceil(retry_after));
            res
        }
        Decision::Allowed { remaining, reset } => {
            let mut res = next.run(req).await;
            let headers = res.headers_mut();
            set_header(headers, "ratelimit-limit", limit);
            set_header(headers, "ratelimit-remaining", u64::from(remaining));
            set_header(headers, "ratelimit-reset", secs_ceil(reset));
            res
        }
    }
}
