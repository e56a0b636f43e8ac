//! Request hooks
//!
//! Runs around every request. For requests that matched a route it emits a
//! start event before the handler and a completion event after it; the 404
//! fallback reports itself. A response tagged with [`InternalFault`] also
//! produces the internal-error event. Every response carries an
//! `x-request-id` header.

use axum::{
    body::HttpBody,
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};

use super::{AppState, responses::InternalFault};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn request_hooks_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    // Absent when the request fell through to the fallback
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string());

    if let Some(endpoint) = &endpoint {
        let user_agent = request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        state.events.info(
            format!("Request started: {method} {path}"),
            json!({
                "endpoint": endpoint,
                "method": method.as_str(),
                "path": path,
                "user_agent": user_agent,
                "ip": ip,
            }),
        );
    }

    let span = info_span!("request", %method, %path, %request_id);
    let mut response = next.run(request).instrument(span).await;

    let elapsed = start.elapsed();
    let status = response.status();

    if let Some(fault) = response.extensions().get::<InternalFault>() {
        state.events.error(
            format!("Internal server error: {}", fault.reason),
            json!({
                "endpoint": "error",
                "error_type": "500",
                "path": path,
            }),
        );
    }

    if let Some(endpoint) = &endpoint {
        let response_size = response.body().size_hint().exact().unwrap_or(0);
        state.events.info(
            format!("Request completed: {method} {path} - {}", status.as_u16()),
            json!({
                "endpoint": endpoint,
                "method": method.as_str(),
                "path": path,
                "status_code": status.as_u16(),
                "response_time": (elapsed.as_secs_f64() * 1000.0).round() / 1000.0,
                "response_size": response_size,
            }),
        );
    }

    if status.is_client_error() || status.is_server_error() {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            request_id = %request_id,
            duration_ms = elapsed.as_millis(),
            "HTTP request completed with error"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            request_id = %request_id,
            duration_ms = elapsed.as_millis(),
            "HTTP request completed"
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
