use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

#[tracing::instrument]
pub async fn handler() -> Response {
    let msg = serde_json::json!({"status": "ok"});
    (StatusCode::OK, Json(msg)).into_response()
}
