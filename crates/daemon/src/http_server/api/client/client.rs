use reqwest::{header::HeaderMap, header::HeaderValue, Client, StatusCode};
use url::Url;

use super::error::ApiError;
use super::ApiRequest;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self::with_client(remote, client))
    }

    /// Reuse an existing connection pool, e.g. the one shared by
    ///  all remote sources of a node.
    pub fn with_client(remote: &Url, client: Client) -> Self {
        let mut remote = remote.clone();
        // endpoints may live under a path prefix; keep it when joining
        if !remote.path().ends_with('/') {
            let path = format!("{}/", remote.path());
            remote.set_path(&path);
        }
        Self { remote, client }
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        let response = request_builder.send().await?;

        // peers answer 200; any other status, 2xx included, is not a page
        if response.status() == StatusCode::OK {
            Ok(response.json::<T::Response>().await?)
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for custom requests
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let client = ApiClient::new(&Url::parse("https://node.example.org/awm").unwrap()).unwrap();
        assert_eq!(client.base_url().as_str(), "https://node.example.org/awm/");
        assert_eq!(
            client.base_url().join("tools").unwrap().as_str(),
            "https://node.example.org/awm/tools"
        );

        let client = ApiClient::new(&Url::parse("http://localhost:8080").unwrap()).unwrap();
        assert_eq!(client.base_url().join("tools").unwrap().as_str(), "http://localhost:8080/tools");
    }

    async fn serve(status: StatusCode) -> Url {
        use axum::routing::get;
        use axum::{Json, Router};

        let page = serde_json::json!({
            "from": 0,
            "limit": 100,
            "count": 0,
            "self": "http://peer/allocations",
            "elements": [],
        });
        let app = Router::new().route(
            "/allocations",
            get(move || {
                let page = page.clone();
                async move { (status, Json(page)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_only_ok_carries_a_page() {
        use common::resource::ResourceKind;

        use crate::http_server::api::ListRequest;

        let client = ApiClient::new(&serve(StatusCode::OK).await).unwrap();
        let page = client
            .call(ListRequest::<serde_json::Value>::new(ResourceKind::Allocations, 0, 100))
            .await
            .unwrap();
        assert_eq!(page.count, 0);

        for status in [StatusCode::CREATED, StatusCode::ACCEPTED] {
            let client = ApiClient::new(&serve(status).await).unwrap();
            let result = client
                .call(ListRequest::<serde_json::Value>::new(ResourceKind::Allocations, 0, 100))
                .await;
            assert!(matches!(result, Err(ApiError::HttpStatus(s, _)) if s == status));
        }
    }
}
