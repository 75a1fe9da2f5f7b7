use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use common::models::{Allocation, AllocationId};
use common::resource::ResourceKind;
use common::store::{Collection, StoreError};

use crate::auth::Identity;
use crate::http_server::api::extract::RequestUrl;
use crate::http_server::api::{error_response, store_error_response};
use crate::local::item_link;
use crate::ServiceState;

#[tracing::instrument(skip_all, fields(subject = %identity.subject))]
pub async fn handler(
    State(state): State<ServiceState>,
    identity: Identity,
    url: RequestUrl,
    body: Result<Json<Allocation>, JsonRejection>,
) -> Result<impl IntoResponse, CreateAllocationError> {
    let Json(allocation) = body.map_err(|e| CreateAllocationError::InvalidBody(e.body_text()))?;

    let data = serde_json::to_value(&allocation)?;
    let id = state
        .store()
        .put(Collection::Allocations, None, &identity.subject, data)
        .await?;
    tracing::info!(allocation_id = %id, "allocation created");

    let info_link = item_link(url.base(), ResourceKind::Allocations, &id);
    Ok((
        StatusCode::CREATED,
        Json(AllocationId {
            id,
            info_link: Some(info_link),
        }),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum CreateAllocationError {
    #[error("invalid allocation: {0}")]
    InvalidBody(String),
    #[error("failed to encode allocation: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for CreateAllocationError {
    fn into_response(self) -> Response {
        match self {
            CreateAllocationError::InvalidBody(_) => {
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            }
            CreateAllocationError::Encode(_) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            CreateAllocationError::Store(e) => store_error_response(e),
        }
    }
}
