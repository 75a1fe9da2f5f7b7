#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use http::{Method, Request, Response};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

use awm_daemon::auth::InsecureAuthenticator;
use awm_daemon::catalog::DirectoryCatalog;
use awm_daemon::ServiceState;
use common::directory::{Node, StaticDirectory};
use common::store::{Collection, MemoryStore, Record, RecordStore, StoreError};

/// One gateway node backed by an in-memory store and a blueprint
///  directory of its own.
pub struct TestNode {
    pub store: Arc<MemoryStore>,
    pub state: ServiceState,
    pub tools: TempDir,
}

impl TestNode {
    pub fn new(peers: Vec<Node>) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), peers)
    }

    pub fn with_store(store: Arc<MemoryStore>, peers: Vec<Node>) -> Self {
        let tools = tempfile::tempdir().unwrap();
        let state = ServiceState::new(
            store.clone(),
            Arc::new(DirectoryCatalog::new(tools.path())),
            Arc::new(InsecureAuthenticator),
            Arc::new(StaticDirectory::new(peers)),
        )
        .unwrap()
        .with_remote_timeout(Duration::from_secs(5));

        Self {
            store,
            state,
            tools,
        }
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.state = self.state.with_remote_timeout(timeout);
        self
    }

    pub fn with_node_id(mut self, node_id: &str) -> Self {
        self.state = self.state.with_self_node_id(Some(node_id.to_string()));
        self
    }

    pub fn add_tool(&self, name: &str) {
        std::fs::write(self.tools.path().join(name), "tosca_definitions_version: tosca_simple_yaml_1_0\n")
            .unwrap();
    }

    /// Store an allocation for `owner`; the host doubles as a label.
    pub async fn add_allocation(&self, owner: &str, label: &str) -> String {
        self.store
            .put(
                Collection::Allocations,
                None,
                owner,
                json!({"kind": "KubernetesEnvironment", "host": format!("http://{}/", label)}),
            )
            .await
            .unwrap()
    }

    /// Serve this node on an ephemeral port.
    pub async fn spawn(&self) -> Url {
        serve(awm_daemon::http_server::router(self.state.clone())).await
    }

    pub fn router(&self) -> axum::Router {
        awm_daemon::http_server::router(self.state.clone())
    }
}

pub async fn serve(router: axum::Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Url::parse(&format!("http://{}/", addr)).unwrap()
}

/// An address nothing listens on.
pub async fn dead_endpoint() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}/", addr)).unwrap()
}

/// Accepts connections and never answers.
pub async fn hanging_endpoint() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    Url::parse(&format!("http://{}/", addr)).unwrap()
}

pub fn node(id: &str, endpoint: Url) -> Node {
    Node {
        node_id: id.to_string(),
        node_name: None,
        endpoint,
    }
}

pub async fn get_json(url: Url, token: &str) -> (u16, Value) {
    let response = reqwest::Client::new()
        .get(url)
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

/// Labels (allocation hosts) of a page's elements, in order.
pub fn labels(page: &Value) -> Vec<String> {
    page["elements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            let host = e["allocation"]["host"].as_str().unwrap();
            Url::parse(host).unwrap().host_str().unwrap().to_string()
        })
        .collect()
}

/// Drive a router with one request; `Host` is always `testserver`.
pub async fn call(
    router: &axum::Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::HOST, "testserver");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    read(response).await
}

async fn read(response: Response<Body>) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// A record store whose backend is gone.
#[derive(Debug)]
pub struct BrokenStore;

#[async_trait]
impl RecordStore for BrokenStore {
    async fn list(
        &self,
        _collection: Collection,
        _owner: &str,
        _offset: u64,
        _limit: u64,
    ) -> Result<(u64, Vec<Record>), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn get(
        &self,
        _collection: Collection,
        _id: &str,
        _owner: &str,
    ) -> Result<Option<Record>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn put(
        &self,
        _collection: Collection,
        _id: Option<&str>,
        _owner: &str,
        _data: Value,
    ) -> Result<String, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn delete(
        &self,
        _collection: Collection,
        _id: &str,
        _owner: &str,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

pub fn broken_state() -> ServiceState {
    ServiceState::new(
        Arc::new(BrokenStore),
        Arc::new(DirectoryCatalog::new("/nonexistent")),
        Arc::new(InsecureAuthenticator),
        Arc::new(StaticDirectory::new(Vec::new())),
    )
    .unwrap()
}
