use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use common::models::Success;
use common::store::{Collection, StoreError};

use crate::auth::Identity;
use crate::http_server::api::{error_response, store_error_response};
use crate::ServiceState;

#[tracing::instrument(skip(state, identity), fields(subject = %identity.subject))]
pub async fn handler(
    State(state): State<ServiceState>,
    identity: Identity,
    Path(deployment_id): Path<String>,
) -> Result<Json<Success>, DeleteDeploymentError> {
    let removed = state
        .store()
        .delete(Collection::Deployments, &deployment_id, &identity.subject)
        .await?;
    if !removed {
        return Err(DeleteDeploymentError::NotFound(deployment_id));
    }
    tracing::info!(%deployment_id, "deployment deleted");

    Ok(Json(Success {
        message: format!("Deleted deployment {}", deployment_id),
    }))
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteDeploymentError {
    #[error("Deployment {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for DeleteDeploymentError {
    fn into_response(self) -> Response {
        match self {
            DeleteDeploymentError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, self.to_string())
            }
            DeleteDeploymentError::Store(e) => store_error_response(e),
        }
    }
}
