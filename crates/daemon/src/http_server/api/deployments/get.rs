use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use common::models::DeploymentInfo;
use common::resource::ResourceKind;
use common::store::{Collection, StoreError};

use crate::auth::Identity;
use crate::http_server::api::extract::RequestUrl;
use crate::http_server::api::{error_response, store_error_response};
use crate::local::{item_link, StoredResource};
use crate::ServiceState;

#[tracing::instrument(skip(state, identity, url), fields(subject = %identity.subject))]
pub async fn handler(
    State(state): State<ServiceState>,
    identity: Identity,
    url: RequestUrl,
    Path(deployment_id): Path<String>,
) -> Result<Json<DeploymentInfo>, GetDeploymentError> {
    let record = state
        .store()
        .get(Collection::Deployments, &deployment_id, &identity.subject)
        .await?
        .ok_or_else(|| GetDeploymentError::NotFound(deployment_id.clone()))?;

    let self_link = item_link(url.base(), ResourceKind::Deployments, &record.id);
    Ok(Json(DeploymentInfo::from_record(&record, self_link)?))
}

#[derive(Debug, thiserror::Error)]
pub enum GetDeploymentError {
    #[error("Deployment {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for GetDeploymentError {
    fn into_response(self) -> Response {
        match self {
            GetDeploymentError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, self.to_string())
            }
            GetDeploymentError::Store(e) => store_error_response(e),
        }
    }
}
