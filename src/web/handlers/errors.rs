use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use serde_json::json;

use crate::web::{AppState, responses::NOT_FOUND_BODY};

/// Fallback for every request no route matched
pub async fn not_found(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    let path = uri.path();
    state.events.warning(
        format!("Page not found: {path}"),
        json!({
            "endpoint": "error",
            "error_type": "404",
            "path": path,
        }),
    );
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}
