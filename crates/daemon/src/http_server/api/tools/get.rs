use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Deserialize;

use common::models::ToolInfo;

use crate::auth::Identity;
use crate::catalog::CatalogError;
use crate::http_server::api::error_response;
use crate::http_server::api::extract::RequestUrl;
use crate::local::localize_tool;
use crate::ServiceState;

#[derive(Debug, Default, Deserialize)]
pub struct GetToolQuery {
    pub version: Option<String>,
}

#[tracing::instrument(skip(state, identity, url), fields(subject = %identity.subject))]
pub async fn handler(
    State(state): State<ServiceState>,
    identity: Identity,
    url: RequestUrl,
    Path(tool_id): Path<String>,
    Query(query): Query<GetToolQuery>,
) -> Result<Json<ToolInfo>, GetToolError> {
    let tool = state
        .catalog()
        .get(&tool_id, query.version.as_deref())
        .await?
        .ok_or_else(|| GetToolError::NotFound(tool_id.clone()))?;

    Ok(Json(localize_tool(tool, url.base(), state.self_node_id())))
}

#[derive(Debug, thiserror::Error)]
pub enum GetToolError {
    #[error("Tool {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl IntoResponse for GetToolError {
    fn into_response(self) -> Response {
        match self {
            GetToolError::NotFound(_) => error_response(StatusCode::NOT_FOUND, self.to_string()),
            GetToolError::Catalog(e) => {
                tracing::error!(error = %e, "tool catalog failed");
                error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
            }
        }
    }
}
