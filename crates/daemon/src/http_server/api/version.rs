use axum::Json;
use reqwest::{Client, RequestBuilder};
use url::Url;

use common::models::Success;
use common::prelude::build_info;

use crate::http_server::api::client::{ApiError, ApiRequest};

#[tracing::instrument]
pub async fn handler() -> Json<Success> {
    Json(Success {
        message: build_info().version.to_string(),
    })
}

/// `GET {base}/version`
#[derive(Debug, Clone, Default)]
pub struct VersionRequest;

impl ApiRequest for VersionRequest {
    type Response = Success;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.get(base_url.join("version")?))
    }
}
