use std::marker::PhantomData;

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use common::directory::Node;
use common::federation::{FederationError, Source};
use common::page::{Page, PageBuilder};
use common::resource::{Resource, ResourceKind};
use common::window::{WindowError, WindowRequest, DEFAULT_FROM, DEFAULT_LIMIT};

use crate::auth::Identity;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::remote::RemoteSource;
use crate::ServiceState;

use super::error_response;
use super::extract::RequestUrl;

/// Query string accepted by every listing endpoint.
///
/// Signed so that negative values reach window validation
///  and come back as a 400 with a useful message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_from")]
    pub from: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub all_nodes: bool,
}

fn default_from() -> i64 {
    DEFAULT_FROM as i64
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT as i64
}

impl ListQuery {
    /// Validate an extracted query into a window, before any source is queried.
    pub fn window(
        query: Result<Query<ListQuery>, QueryRejection>,
    ) -> Result<WindowRequest, ListError> {
        let Query(query) = query.map_err(|e| ListError::InvalidQuery(e.body_text()))?;
        Ok(WindowRequest::new(query.from, query.limit, query.all_nodes)?)
    }
}

/// `GET {base}/{kind}?from&limit[&allNodes=true]`.
///
/// Used node-to-node by [`RemoteSource`] and by the CLI.
#[derive(Debug, Clone)]
pub struct ListRequest<T = serde_json::Value> {
    pub kind: ResourceKind,
    pub from: u64,
    pub limit: u64,
    pub all_nodes: bool,
    pub token: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ListRequest<T> {
    pub fn new(kind: ResourceKind, from: u64, limit: u64) -> Self {
        Self {
            kind,
            from,
            limit,
            all_nodes: false,
            token: None,
            _marker: PhantomData,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_all_nodes(mut self, all_nodes: bool) -> Self {
        self.all_nodes = all_nodes;
        self
    }
}

impl<T: DeserializeOwned> ApiRequest for ListRequest<T> {
    type Response = Page<T>;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(self.kind.as_str())?;

        let mut query = Vec::with_capacity(3);
        if self.all_nodes {
            query.push(("allNodes", "true".to_string()));
        }
        query.push(("from", self.from.to_string()));
        query.push(("limit", self.limit.to_string()));

        let mut request = client.get(full_url).query(&query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("invalid window: {0}")]
    InvalidWindow(#[from] WindowError),
    #[error(transparent)]
    Federation(#[from] FederationError),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        match self {
            ListError::InvalidQuery(_) | ListError::InvalidWindow(_) => {
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            }
            ListError::Federation(e) => {
                tracing::error!(error = %e, "listing failed");
                error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
            }
        }
    }
}

/// Run a federated listing for the caller and wrap it in a page.
///
/// Remote nodes are queried with the caller's own token.
pub async fn federated_page<T: Resource>(
    state: &ServiceState,
    identity: &Identity,
    url: &RequestUrl,
    window: WindowRequest,
    local: &dyn Source<T>,
) -> Result<Page<T>, ListError> {
    let client = state.http_client().clone();
    let token = identity.token.clone();

    let aggregate = state
        .aggregator()
        .aggregate(window, local, move |node: &Node| -> Box<dyn Source<T>> {
            Box::new(RemoteSource::<T>::new(
                node.clone(),
                client.clone(),
                token.clone(),
            ))
        })
        .await?;

    if !aggregate.failed_nodes.is_empty() {
        tracing::info!(
            failed = ?aggregate.failed_nodes,
            count = aggregate.count,
            "serving degraded federated page"
        );
    }

    Ok(PageBuilder::new(url.url().clone(), window).build(aggregate.items, aggregate.count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_request_query() {
        let base = Url::parse("http://node-a:8080/").unwrap();
        let request = ListRequest::<serde_json::Value>::new(ResourceKind::Deployments, 0, 7)
            .with_token("tok")
            .build_request(&base, &Client::new())
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "http://node-a:8080/deployments?from=0&limit=7"
        );
        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer tok"
        );
    }

    #[test]
    fn test_all_nodes_flag_leads_query() {
        let base = Url::parse("http://node-a:8080/").unwrap();
        let request = ListRequest::<serde_json::Value>::new(ResourceKind::Tools, 4, 2)
            .with_all_nodes(true)
            .build_request(&base, &Client::new())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("allNodes=true&from=4&limit=2"));
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }
}
