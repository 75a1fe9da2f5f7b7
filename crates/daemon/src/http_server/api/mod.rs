use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use http::{Method, StatusCode};
use tower_http::cors::{Any, CorsLayer};

use common::models::ErrorBody;
use common::store::StoreError;

pub mod allocations;
pub mod client;
pub mod deployments;
pub mod extract;
pub mod listing;
pub mod tools;
pub mod user;
pub mod version;

pub use listing::ListRequest;
pub use version::VersionRequest;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(vec![ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .merge(tools::router(state.clone()))
        .merge(allocations::router(state.clone()))
        .merge(deployments::router(state.clone()))
        .merge(user::router(state.clone()))
        .route("/version", get(version::handler))
        .with_state(state)
        .layer(cors_layer)
}

/// JSON error envelope shared by every endpoint.
pub fn error_response(status: StatusCode, description: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(status.as_u16(), description))).into_response()
}

/// Store failures seen by a handler: a vanished record is a 404,
///  anything else means the node cannot answer right now.
pub fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::NotFound(_) => error_response(StatusCode::NOT_FOUND, err.to_string()),
        _ => {
            tracing::error!(error = %err, "record store failed");
            error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
    }
}
