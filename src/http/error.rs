//! Per-request error taxonomy and its HTTP surface.
//!
//! # Design Decisions
//! - Every per-request error is translated at the server boundary into a
//!   status code plus a minimal JSON body
//! - A NoMatch body carries no `server_tag` key: clients reading the tag
//!   with a default observe their own missing sentinel
//! - No internal detail (patterns, upstream addresses, source errors) is
//!   leaked to the client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::dispatch::DispatchError;

/// Errors that end a request with a non-200 response.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no matching route")]
    NoMatch,
    #[error("malformed request")]
    MalformedRequest,
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            GatewayError::NoMatch => (StatusCode::NOT_FOUND, "no matching route"),
            GatewayError::MalformedRequest => (StatusCode::BAD_REQUEST, "malformed request"),
            GatewayError::Dispatch(DispatchError::BackendUnavailable { .. }) => {
                (StatusCode::BAD_GATEWAY, "upstream unavailable")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
