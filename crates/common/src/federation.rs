use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use crate::directory::{Node, NodeDirectory};
use crate::resource::Resource;
use crate::window::WindowRequest;

pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// What a source answers for one windowed query: its total
///  item count and the items of the requested range.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice<T> {
    pub count: u64,
    pub items: Vec<T>,
}

impl<T> Slice<T> {
    pub fn new(count: u64, items: Vec<T>) -> Self {
        Self { count, items }
    }

    pub fn empty() -> Self {
        Self {
            count: 0,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed source response: {0}")]
    Malformed(String),
    #[error("source did not answer within {0:?}")]
    Timeout(Duration),
}

/// Anything that can answer "items `[offset, offset + limit)` and
///  your total count" for one resource kind.
#[async_trait]
pub trait Source<T>: Send + Sync {
    async fn fetch(&self, offset: u64, limit: u64) -> Result<Slice<T>, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FederationError {
    /// The local source is the base of every listing;
    ///  without it there is no page to return.
    #[error("local source unavailable: {0}")]
    LocalUnavailable(#[source] SourceError),
}

/// The sub-range one source has to contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubWindow {
    pub offset: u64,
    pub limit: u64,
}

const MAX_REMOTE_LIMIT: u64 = i64::MAX as u64;

/// Tracks a window over the virtual concatenation of sources while
///  they are absorbed in order.
///
/// `consumed` counts the items of every source absorbed so far,
///  `have` the items already placed in the page. Absorbing a source
///  translates the global window into that source's own offset space.
#[derive(Debug, Clone)]
pub struct WindowPlanner {
    window: WindowRequest,
    consumed: u64,
    have: u64,
    total: u64,
}

impl WindowPlanner {
    pub fn new(window: WindowRequest) -> Self {
        Self {
            window,
            consumed: 0,
            have: 0,
            total: 0,
        }
    }

    /// Range the next source must provide, in its own offset space.
    pub fn sub_window(&self) -> SubWindow {
        SubWindow {
            offset: self.window.from.saturating_sub(self.consumed),
            limit: self.window.limit.saturating_sub(self.have),
        }
    }

    /// Items a remote must return when asked from its offset 0 so that
    ///  any remote in the federation can fill its sub-window. Every
    ///  later sub-window starts no further and is no longer than this.
    ///
    /// Capped at `i64::MAX`, the largest limit a peer accepts.
    pub fn remote_fetch_limit(&self) -> u64 {
        let sub = self.sub_window();
        sub.offset.saturating_add(sub.limit).min(MAX_REMOTE_LIMIT)
    }

    pub fn is_full(&self) -> bool {
        self.have >= self.window.limit
    }

    /// Absorb a slice that was fetched at [`Self::sub_window`], i.e.
    ///  whose items already start at the sub-window offset.
    pub fn absorb_windowed<T>(&mut self, slice: Slice<T>) -> Vec<T> {
        let sub = self.sub_window();
        self.absorb(slice, 0, sub.limit)
    }

    /// Absorb a slice fetched from the source's offset 0.
    pub fn absorb_from_start<T>(&mut self, slice: Slice<T>) -> Vec<T> {
        let sub = self.sub_window();
        self.absorb(slice, sub.offset, sub.limit)
    }

    fn absorb<T>(&mut self, slice: Slice<T>, skip: u64, take: u64) -> Vec<T> {
        let items: Vec<T> = slice
            .items
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(take).unwrap_or(usize::MAX))
            .collect();

        self.have += items.len() as u64;
        self.consumed = self.consumed.saturating_add(slice.count);
        self.total = self.total.saturating_add(slice.count);
        items
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Merged result of a federated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate<T> {
    pub items: Vec<T>,
    pub count: u64,
    /// Node ids whose contribution was dropped for this call
    pub failed_nodes: Vec<String>,
}

/// Drives the local source and, for `allNodes` requests, every node
///  of the directory, merging results in directory order.
#[derive(Debug, Clone)]
pub struct Aggregator {
    directory: Arc<dyn NodeDirectory>,
    remote_timeout: Duration,
}

impl Aggregator {
    pub fn new(directory: Arc<dyn NodeDirectory>) -> Self {
        Self {
            directory,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn remote_timeout(&self) -> Duration {
        self.remote_timeout
    }

    /// Build one page worth of items.
    ///
    /// `connect` turns a directory node into a source for `T`. Remote
    ///  fetches run concurrently; a remote that fails or times out
    ///  contributes nothing and is reported in `failed_nodes`.
    pub async fn aggregate<T, F>(
        &self,
        window: WindowRequest,
        local: &dyn Source<T>,
        connect: F,
    ) -> Result<Aggregate<T>, FederationError>
    where
        T: Resource,
        F: Fn(&Node) -> Box<dyn Source<T>> + Send + Sync,
    {
        let kind = T::KIND;
        let mut planner = WindowPlanner::new(window);

        let sub = planner.sub_window();
        let local_slice = local
            .fetch(sub.offset, sub.limit)
            .await
            .map_err(FederationError::LocalUnavailable)?;
        let mut items = planner.absorb_windowed(local_slice);

        if !window.all_nodes {
            return Ok(Aggregate {
                items,
                count: planner.total(),
                failed_nodes: Vec::new(),
            });
        }

        let nodes = match self.directory.list_nodes().await {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "node directory failed, serving local items only");
                Vec::new()
            }
        };

        // A full page still needs every remote's count; one item
        //  is the cheapest request that carries it.
        let fetch_limit = planner.remote_fetch_limit().max(1);
        let timeout = self.remote_timeout;

        let fetches = nodes.iter().map(|node| {
            let source = connect(node);
            async move {
                match tokio::time::timeout(timeout, source.fetch(0, fetch_limit)).await {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::Timeout(timeout)),
                }
            }
        });
        let results = join_all(fetches).await;

        let mut failed_nodes = Vec::new();
        for (node, result) in nodes.iter().zip(results) {
            match result {
                Ok(slice) => {
                    tracing::debug!(
                        node_id = %node.node_id,
                        kind = %kind,
                        count = slice.count,
                        returned = slice.items.len(),
                        "remote source answered"
                    );
                    items.extend(planner.absorb_from_start(slice));
                }
                Err(e) => {
                    tracing::warn!(
                        node_id = %node.node_id,
                        endpoint = %node.endpoint,
                        kind = %kind,
                        error = %e,
                        "remote source failed, dropping its contribution"
                    );
                    failed_nodes.push(node.node_id.clone());
                }
            }
        }

        Ok(Aggregate {
            items,
            count: planner.total(),
            failed_nodes,
        })
    }
}
