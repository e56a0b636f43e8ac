//! HTTP response helpers
//!
//! Every failure reaching the client is a fixed plain-text body with a
//! status code. Internal detail never goes into the body; it rides along in
//! an [`InternalFault`] response extension so the request hooks can report it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;
use tracing::error;

use crate::errors::AppError;

pub const NOT_FOUND_BODY: &str = "Page not found";
pub const INTERNAL_ERROR_BODY: &str = "Internal server error";
pub const GENERATION_FAILED_BODY: &str = "Error generating image";

/// Reason attached to responses produced by the internal-error handler
#[derive(Debug, Clone)]
pub struct InternalFault {
    pub reason: String,
}

/// Fixed 500 response carrying `reason` for the request hooks
pub fn internal_error(reason: impl Into<String>) -> Response {
    let mut response = (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response();
    response.extensions_mut().insert(InternalFault {
        reason: reason.into(),
    });
    response
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        internal_error(self.to_string())
    }
}

/// Panic hook for `CatchPanicLayer`: handler panics become the internal-error response
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let reason = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "handler panicked".to_string()
    };
    error!("Handler panicked: {}", reason);
    internal_error(reason)
}
