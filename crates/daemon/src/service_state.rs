use std::sync::Arc;
use std::time::Duration;

use url::Url;

use common::directory::{NodeDirectory, StaticDirectory};
use common::federation::Aggregator;
use common::store::{MemoryStore, RecordStore};

use crate::auth::{Authenticator, InsecureAuthenticator, UserInfoAuthenticator};
use crate::catalog::{DirectoryCatalog, ToolCatalog};
use crate::database::{Database, DatabaseSetupError};
use crate::service_config::{Config, StoreBackend};

/// Shared state of a running gateway node.
#[derive(Clone, Debug)]
pub struct State {
    store: Arc<dyn RecordStore>,
    catalog: Arc<dyn ToolCatalog>,
    authenticator: Arc<dyn Authenticator>,
    aggregator: Aggregator,
    http_client: reqwest::Client,
    public_url: Option<Url>,
    self_node_id: Option<String>,
}

impl State {
    pub fn new(
        store: Arc<dyn RecordStore>,
        catalog: Arc<dyn ToolCatalog>,
        authenticator: Arc<dyn Authenticator>,
        directory: Arc<dyn NodeDirectory>,
    ) -> Result<Self, StateSetupError> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| StateSetupError::HttpClient(e.to_string()))?;

        Ok(Self {
            store,
            catalog,
            authenticator,
            aggregator: Aggregator::new(directory),
            http_client,
            public_url: None,
            self_node_id: None,
        })
    }

    pub fn with_public_url(mut self, public_url: Option<Url>) -> Self {
        self.public_url = public_url;
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.aggregator = self.aggregator.with_remote_timeout(timeout);
        self
    }

    pub fn with_self_node_id(mut self, node_id: Option<String>) -> Self {
        self.self_node_id = node_id;
        self
    }

    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup record store
        let store: Arc<dyn RecordStore> = match &config.store {
            StoreBackend::Sqlite(path) => {
                let url = Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)?;
                tracing::info!(url = %url, "using sqlite record store");
                Arc::new(Database::connect(&url).await?)
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory record store, records are lost on exit");
                Arc::new(MemoryStore::new())
            }
        };

        // 2. Tool catalog
        tracing::info!(path = %config.catalog_path.display(), "serving tool blueprints");
        let catalog = Arc::new(DirectoryCatalog::new(&config.catalog_path));

        // 3. Authentication
        let authenticator: Arc<dyn Authenticator> = match &config.userinfo_url {
            Some(url) => Arc::new(UserInfoAuthenticator::new(reqwest::Client::new(), url.clone())),
            None => {
                tracing::warn!("no userinfo endpoint configured, accepting any bearer token");
                Arc::new(InsecureAuthenticator)
            }
        };

        // 4. Federation
        let directory = StaticDirectory::new(config.nodes.clone())
            .excluding(config.self_node_id.as_deref());
        tracing::info!(nodes = directory.len(), "federation directory loaded");

        Ok(Self::new(store, catalog, authenticator, Arc::new(directory))?
            .with_public_url(config.public_url.clone())
            .with_remote_timeout(config.remote_timeout)
            .with_self_node_id(config.self_node_id.clone()))
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn catalog(&self) -> &dyn ToolCatalog {
        self.catalog.as_ref()
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub fn public_url(&self) -> Option<&Url> {
        self.public_url.as_ref()
    }

    pub fn self_node_id(&self) -> Option<&str> {
        self.self_node_id.as_deref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database setup error: {0}")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}
