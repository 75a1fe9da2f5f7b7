#[allow(clippy::module_inception)]
mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

/// A request a gateway node answers, usable from other nodes and the CLI.
pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError>;
}
