use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use common::models::{Deployment, DeploymentId, DeploymentStatus};
use common::resource::ResourceKind;
use common::store::{Collection, StoreError};

use crate::auth::Identity;
use crate::http_server::api::extract::RequestUrl;
use crate::http_server::api::{error_response, store_error_response};
use crate::local::{item_link, StoredDeployment};
use crate::ServiceState;

/// Record a deployment request. Provisioning happens elsewhere;
///  the record starts out `pending`.
#[tracing::instrument(skip_all, fields(subject = %identity.subject))]
pub async fn handler(
    State(state): State<ServiceState>,
    identity: Identity,
    url: RequestUrl,
    body: Result<Json<Deployment>, JsonRejection>,
) -> Result<impl IntoResponse, CreateDeploymentError> {
    let Json(deployment) = body.map_err(|e| CreateDeploymentError::InvalidBody(e.body_text()))?;
    let store = state.store();
    let owner = identity.subject.as_str();

    let allocation_id = &deployment.allocation.id;
    if store
        .get(Collection::Allocations, allocation_id, owner)
        .await?
        .is_none()
    {
        return Err(CreateDeploymentError::UnknownAllocation(
            allocation_id.clone(),
        ));
    }

    let stored = StoredDeployment {
        deployment,
        status: DeploymentStatus::Pending,
    };
    let id = store
        .put(
            Collection::Deployments,
            None,
            owner,
            serde_json::to_value(&stored)?,
        )
        .await?;
    tracing::info!(deployment_id = %id, tool_id = %stored.deployment.tool.id, "deployment created");

    let info_link = item_link(url.base(), ResourceKind::Deployments, &id);
    Ok((
        StatusCode::CREATED,
        Json(DeploymentId {
            id,
            info_link: Some(info_link),
        }),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum CreateDeploymentError {
    #[error("invalid deployment: {0}")]
    InvalidBody(String),
    #[error("Allocation {0} not found")]
    UnknownAllocation(String),
    #[error("failed to encode deployment: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for CreateDeploymentError {
    fn into_response(self) -> Response {
        match self {
            CreateDeploymentError::InvalidBody(_) | CreateDeploymentError::UnknownAllocation(_) => {
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            }
            CreateDeploymentError::Encode(_) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            CreateDeploymentError::Store(e) => store_error_response(e),
        }
    }
}
