use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bridge_types::prelude::BridgeError;
use serde_json::json;
use tracing::error;

/// Wraps a `BridgeError` so it can be returned directly from an axum
/// handler; logs once at the point of conversion (see SPEC_FULL.md's
/// logging discipline: never re-log the same failure further up).
pub struct ApiError(pub BridgeError);

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        error!(error_tag = err.tag(), severity = ?err.severity(), "request failed: {}", err);
        let body = json!({
            "error": {
                "message": err.to_string(),
                "type": "windsurf_error",
                "param": null,
                "code": serde_json::Value::Null,
            }
        });
        (status, Json(body)).into_response()
    }
}
