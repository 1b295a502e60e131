//! HTTP request handlers.

use crate::server::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    response::IntoResponse,
    Json,
};
use microrpc::{Response, RpcError};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// The single RPC endpoint.
///
/// Always answers 200 with a response document; failures are reported in
/// its `error` fields, including bodies that could not be read at all.
pub async fn handle_rpc(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Json<Response> {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!("Unreadable request body: {}", rejection.body_text());
            let err = RpcError::malformed(rejection.body_text());
            return Json(Response::from_error(&err));
        }
    };

    Json(state.dispatcher.handle_bytes(&body).await)
}
