use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use common::models::{Allocation, AllocationInfo};
use common::resource::ResourceKind;
use common::store::{Collection, StoreError};

use crate::auth::Identity;
use crate::http_server::api::extract::RequestUrl;
use crate::http_server::api::{error_response, store_error_response};
use crate::local::item_link;
use crate::ServiceState;

use super::in_use;

#[tracing::instrument(skip(state, identity, url, body), fields(subject = %identity.subject))]
pub async fn handler(
    State(state): State<ServiceState>,
    identity: Identity,
    url: RequestUrl,
    Path(allocation_id): Path<String>,
    body: Result<Json<Allocation>, JsonRejection>,
) -> Result<Json<AllocationInfo>, UpdateAllocationError> {
    let Json(allocation) = body.map_err(|e| UpdateAllocationError::InvalidBody(e.body_text()))?;
    let store = state.store();
    let owner = identity.subject.as_str();

    if store
        .get(Collection::Allocations, &allocation_id, owner)
        .await?
        .is_none()
    {
        return Err(UpdateAllocationError::NotFound(allocation_id));
    }
    if in_use(store, owner, &allocation_id).await? {
        return Err(UpdateAllocationError::InUse(allocation_id));
    }

    let data = serde_json::to_value(&allocation)?;
    let id = store
        .put(Collection::Allocations, Some(&allocation_id), owner, data)
        .await?;
    tracing::info!(allocation_id = %id, "allocation updated");

    Ok(Json(AllocationInfo {
        self_link: Some(item_link(url.base(), ResourceKind::Allocations, &id)),
        id,
        allocation,
    }))
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateAllocationError {
    #[error("invalid allocation: {0}")]
    InvalidBody(String),
    #[error("Allocation {0} not found")]
    NotFound(String),
    #[error("Allocation {0} is in use by a deployment")]
    InUse(String),
    #[error("failed to encode allocation: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for UpdateAllocationError {
    fn into_response(self) -> Response {
        match self {
            UpdateAllocationError::InvalidBody(_) => {
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            }
            UpdateAllocationError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, self.to_string())
            }
            UpdateAllocationError::InUse(_) => error_response(StatusCode::CONFLICT, self.to_string()),
            UpdateAllocationError::Encode(_) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            UpdateAllocationError::Store(e) => store_error_response(e),
        }
    }
}
