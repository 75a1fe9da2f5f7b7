use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::Client;

use common::directory::Node;
use common::federation::{Slice, Source, SourceError};
use common::resource::Resource;

use crate::http_server::api::client::{ApiClient, ApiError};
use crate::http_server::api::listing::ListRequest;

/// A peer gateway seen as a [`Source`]: its own local listing,
///  queried with the caller's forwarded bearer token.
#[derive(Debug, Clone)]
pub struct RemoteSource<T> {
    node: Node,
    client: ApiClient,
    token: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Resource> RemoteSource<T> {
    pub fn new(node: Node, client: Client, token: impl Into<String>) -> Self {
        let client = ApiClient::with_client(&node.endpoint, client);
        Self {
            node,
            client,
            token: token.into(),
            _marker: PhantomData,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }
}

impl From<ApiError> for SourceError {
    fn from(err: ApiError) -> Self {
        if err.is_malformed() {
            return SourceError::Malformed(err.to_string());
        }
        SourceError::Unavailable(err.to_string())
    }
}

#[async_trait]
impl<T: Resource> Source<T> for RemoteSource<T> {
    async fn fetch(&self, offset: u64, limit: u64) -> Result<Slice<T>, SourceError> {
        // never allNodes: a remote answers for its own data only
        let kind = T::KIND;
        let request = ListRequest::<T>::new(kind, offset, limit).with_token(&self.token);

        tracing::debug!(
            node_id = %self.node.node_id,
            endpoint = %self.client.base_url(),
            kind = %kind,
            offset,
            limit,
            "querying remote node"
        );
        let page = self.client.call(request).await?;

        Ok(Slice::new(page.count, page.elements))
    }
}
