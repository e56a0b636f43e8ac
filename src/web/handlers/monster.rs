use axum::{
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use serde_json::json;

use crate::errors::{AppError, IdenticonError};
use crate::web::{AppState, responses::GENERATION_FAILED_BODY};

/// `GET /monster/{name}`: PNG identicon for `name`
///
/// The segment is decoded from the raw path so bytes that are not UTF-8
/// become U+FFFD instead of rejecting the request.
pub async fn get_identicon(State(state): State<AppState>, uri: Uri) -> Result<Response, AppError> {
    let name = requested_name(uri.path());
    state.events.info(
        "Monster generation requested",
        json!({
            "endpoint": "/monster",
            "requested_name": name,
        }),
    );

    match state.identicons.retrieve(&name).await {
        Ok(image) => Ok(([(header::CONTENT_TYPE, "image/png")], image).into_response()),
        Err(IdenticonError::Upstream(_)) => {
            Ok((StatusCode::INTERNAL_SERVER_ERROR, GENERATION_FAILED_BODY).into_response())
        }
        Err(IdenticonError::Cache(e)) => Err(e.into()),
    }
}

/// Last path segment, percent-decoded with lossy UTF-8
fn requested_name(path: &str) -> String {
    let segment = path.rsplit('/').next().unwrap_or_default();
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}
