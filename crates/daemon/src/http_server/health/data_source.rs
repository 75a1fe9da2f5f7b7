use std::fmt::Debug;
use std::ops::Deref;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::ServiceState;

#[async_trait]
pub trait DataSource {
    /// Check that every dependency a request needs is reachable.
    async fn is_ready(&self) -> Result<(), DataSourceError>;
}

pub const RECORD_STORE: &str = "record store";
pub const TOOL_CATALOG: &str = "tool catalog";

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("{dependency} unavailable: {reason}")]
    DependencyFailure {
        dependency: &'static str,
        reason: String,
    },
}

impl DataSourceError {
    fn failure(dependency: &'static str, err: impl std::fmt::Display) -> Self {
        tracing::warn!(dependency, error = %err, "readiness check failed");
        DataSourceError::DependencyFailure {
            dependency,
            reason: err.to_string(),
        }
    }
}

pub type DynDataSource = Arc<dyn DataSource + Send + Sync>;

pub struct StateDataSource(DynDataSource);

impl Debug for StateDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDataSource").finish()
    }
}

impl StateDataSource {
    #[cfg(test)]
    pub fn new(dds: DynDataSource) -> Self {
        Self(dds)
    }
}

impl Deref for StateDataSource {
    type Target = DynDataSource;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Local dependencies of a node, checked in order. Remote nodes are
///  optional and never make a node unready.
struct NodeDependencies {
    state: ServiceState,
}

#[async_trait]
impl DataSource for NodeDependencies {
    async fn is_ready(&self) -> Result<(), DataSourceError> {
        self.state
            .store()
            .ping()
            .await
            .map_err(|e| DataSourceError::failure(RECORD_STORE, e))?;
        self.state
            .catalog()
            .list(0, 0)
            .await
            .map_err(|e| DataSourceError::failure(TOOL_CATALOG, e))?;
        Ok(())
    }
}

#[async_trait]
impl FromRequestParts<ServiceState> for StateDataSource {
    type Rejection = ();

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        Ok(StateDataSource(Arc::new(NodeDependencies {
            state: state.clone(),
        })))
    }
}
