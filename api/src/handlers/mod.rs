//! Request handlers, grouped the way the routes are mounted: public site
//! routes, session routes, and the authenticated dashboard surface.

pub mod blogs;
pub mod bulletins;
pub mod files;
pub mod groups;
pub mod health;
pub mod profile;
pub mod public;
pub mod session;
pub mod users;

use std::io;
use std::path::Path;

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::error::{ApiError, ApiResult};

/// Delete routes take their target from `?id=`; a missing id fails fast
/// before any authorization or storage work.
pub(crate) fn require_id(id: Option<String>) -> Result<String, ApiError> {
    match id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::BadRequest("missing id".to_string())),
    }
}

/// Stream a stored file as an attachment under its original name.
pub(crate) async fn send_file(path: &Path, name: &str) -> ApiResult<Response> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("file".to_string()))
        }
        Err(e) => return Err(ApiError::internal(e)),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    // Non-ASCII names cannot ride in a plain header value; those downloads
    // fall back to a bare attachment disposition.
    let disposition = format!("attachment; filename=\"{}\"", name.replace('"', ""));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    Ok((headers, bytes).into_response())
}
