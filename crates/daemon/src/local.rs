use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use common::federation::{Slice, Source, SourceError};
use common::models::{
    Allocation, AllocationInfo, Deployment, DeploymentInfo, DeploymentStatus, ToolInfo,
};
use common::resource::{Resource, ResourceKind};
use common::store::{Collection, Record, RecordStore, StoreError};

use crate::catalog::ToolCatalog;

/// Link to a single item: `{base}/{tool|allocation|deployment}/{id}`.
pub fn item_link(base: &Url, kind: ResourceKind, id: &str) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(kind.item_segment()).push(id);
    }
    url
}

/// Payload of a stored deployment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDeployment {
    pub deployment: Deployment,
    #[serde(default)]
    pub status: DeploymentStatus,
}

/// A resource kept in the node's record store.
pub trait StoredResource: Resource {
    const COLLECTION: Collection;

    fn from_record(record: &Record, self_link: Url) -> Result<Self, StoreError>;
}

impl StoredResource for AllocationInfo {
    const COLLECTION: Collection = Collection::Allocations;

    fn from_record(record: &Record, self_link: Url) -> Result<Self, StoreError> {
        Ok(AllocationInfo {
            id: record.id.clone(),
            self_link: Some(self_link),
            allocation: record.decode::<Allocation>()?,
        })
    }
}

impl StoredResource for DeploymentInfo {
    const COLLECTION: Collection = Collection::Deployments;

    fn from_record(record: &Record, self_link: Url) -> Result<Self, StoreError> {
        let stored = record.decode::<StoredDeployment>()?;
        Ok(DeploymentInfo {
            id: record.id.clone(),
            deployment: stored.deployment,
            status: stored.status,
            self_link: Some(self_link),
        })
    }
}

fn store_error(err: StoreError) -> SourceError {
    match err {
        StoreError::Corrupt(..) => SourceError::Malformed(err.to_string()),
        _ => SourceError::Unavailable(err.to_string()),
    }
}

/// The caller's own records of one collection.
pub struct StoreSource<'a, T> {
    store: &'a dyn RecordStore,
    owner: &'a str,
    base: &'a Url,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: StoredResource> StoreSource<'a, T> {
    pub fn new(store: &'a dyn RecordStore, owner: &'a str, base: &'a Url) -> Self {
        Self {
            store,
            owner,
            base,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<'a, T: StoredResource> Source<T> for StoreSource<'a, T> {
    async fn fetch(&self, offset: u64, limit: u64) -> Result<Slice<T>, SourceError> {
        let (count, records) = self
            .store
            .list(T::COLLECTION, self.owner, offset, limit)
            .await
            .map_err(store_error)?;

        let items = records
            .iter()
            .map(|record| T::from_record(record, item_link(self.base, T::KIND, &record.id)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(store_error)?;

        Ok(Slice::new(count, items))
    }
}

/// The node's tool catalog, the same for every caller.
pub struct CatalogSource<'a> {
    catalog: &'a dyn ToolCatalog,
    base: &'a Url,
    node_id: Option<&'a str>,
}

impl<'a> CatalogSource<'a> {
    pub fn new(catalog: &'a dyn ToolCatalog, base: &'a Url, node_id: Option<&'a str>) -> Self {
        Self {
            catalog,
            base,
            node_id,
        }
    }
}

/// Stamp a catalog entry with this node's links.
pub fn localize_tool(mut tool: ToolInfo, base: &Url, node_id: Option<&str>) -> ToolInfo {
    tool.self_link = Some(item_link(base, ResourceKind::Tools, &tool.id));
    if tool.node_id.is_none() {
        tool.node_id = node_id.map(str::to_string);
    }
    tool
}

#[async_trait]
impl<'a> Source<ToolInfo> for CatalogSource<'a> {
    async fn fetch(&self, offset: u64, limit: u64) -> Result<Slice<ToolInfo>, SourceError> {
        let (count, tools) = self
            .catalog
            .list(offset, limit)
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        let tools = tools
            .into_iter()
            .map(|tool| localize_tool(tool, self.base, self.node_id))
            .collect();

        Ok(Slice::new(count, tools))
    }
}
