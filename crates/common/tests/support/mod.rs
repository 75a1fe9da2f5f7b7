//! Shared fixtures for federation integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::prelude::*;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item(pub String);

impl Resource for Item {
    const KIND: ResourceKind = ResourceKind::Deployments;

    fn id(&self) -> &str {
        &self.0
    }
}

/// Source over a fixed item list; `None` behaves like an unreachable node.
#[derive(Debug, Clone)]
pub struct VecSource(pub Option<Vec<Item>>);

#[async_trait]
impl Source<Item> for VecSource {
    async fn fetch(&self, offset: u64, limit: u64) -> Result<Slice<Item>, SourceError> {
        let items = self
            .0
            .as_ref()
            .ok_or_else(|| SourceError::Unavailable("node down".to_string()))?;
        Ok(Slice::new(
            items.len() as u64,
            items
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
        ))
    }
}

/// Item lists named `{prefix}{n}` so results show where they came from.
pub fn items(prefix: &str, n: usize) -> Vec<Item> {
    (0..n).map(|i| Item(format!("{prefix}{i}"))).collect()
}

pub struct Federation {
    pub local: VecSource,
    pub remotes: HashMap<String, VecSource>,
    pub aggregator: Aggregator,
}

impl Federation {
    /// `remotes` in federation order; `None` marks a failing node.
    pub fn new(local: Vec<Item>, remotes: Vec<Option<Vec<Item>>>) -> Self {
        let nodes: Vec<Node> = (0..remotes.len())
            .map(|i| Node {
                node_id: format!("node-{i}"),
                node_name: None,
                endpoint: Url::parse(&format!("http://node-{i}.test/")).unwrap(),
            })
            .collect();
        let remotes = nodes
            .iter()
            .zip(remotes)
            .map(|(node, items)| (node.node_id.clone(), VecSource(items)))
            .collect();

        Self {
            local: VecSource(Some(local)),
            remotes,
            aggregator: Aggregator::new(Arc::new(StaticDirectory::new(nodes))),
        }
    }

    pub async fn list(&self, window: WindowRequest) -> Aggregate<Item> {
        self.aggregator
            .aggregate(window, &self.local, |node: &Node| {
                Box::new(self.remotes[&node.node_id].clone()) as Box<dyn Source<Item>>
            })
            .await
            .unwrap()
    }

    /// Everything the federation holds, in concatenation order,
    ///  skipping failing nodes.
    pub fn materialized(&self, all_nodes: bool) -> Vec<Item> {
        let mut all = self.local.0.clone().unwrap_or_default();
        if all_nodes {
            let mut ids: Vec<_> = self.remotes.keys().cloned().collect();
            ids.sort_by_key(|id| {
                id.trim_start_matches("node-")
                    .parse::<usize>()
                    .unwrap_or(usize::MAX)
            });
            for id in ids {
                all.extend(self.remotes[&id].0.clone().unwrap_or_default());
            }
        }
        all
    }
}
