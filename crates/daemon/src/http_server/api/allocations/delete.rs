use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use common::models::Success;
use common::store::{Collection, StoreError};

use crate::auth::Identity;
use crate::http_server::api::{error_response, store_error_response};
use crate::ServiceState;

use super::in_use;

#[tracing::instrument(skip(state, identity), fields(subject = %identity.subject))]
pub async fn handler(
    State(state): State<ServiceState>,
    identity: Identity,
    Path(allocation_id): Path<String>,
) -> Result<Json<Success>, DeleteAllocationError> {
    let store = state.store();
    let owner = identity.subject.as_str();

    if store
        .get(Collection::Allocations, &allocation_id, owner)
        .await?
        .is_none()
    {
        return Err(DeleteAllocationError::NotFound(allocation_id));
    }
    if in_use(store, owner, &allocation_id).await? {
        return Err(DeleteAllocationError::InUse(allocation_id));
    }

    if !store
        .delete(Collection::Allocations, &allocation_id, owner)
        .await?
    {
        return Err(DeleteAllocationError::NotFound(allocation_id));
    }
    tracing::info!(%allocation_id, "allocation deleted");

    Ok(Json(Success {
        message: format!("Deleted allocation {}", allocation_id),
    }))
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteAllocationError {
    #[error("Allocation {0} not found")]
    NotFound(String),
    #[error("Allocation {0} is in use by a deployment")]
    InUse(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for DeleteAllocationError {
    fn into_response(self) -> Response {
        match self {
            DeleteAllocationError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, self.to_string())
            }
            DeleteAllocationError::InUse(_) => error_response(StatusCode::CONFLICT, self.to_string()),
            DeleteAllocationError::Store(e) => store_error_response(e),
        }
    }
}
