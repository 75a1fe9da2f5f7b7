use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// A peer gateway that can be queried for its own local items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    pub endpoint: Url,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("node directory unavailable: {0}")]
    Unavailable(String),
}

/// Resolves the federation: the ordered list of remote nodes a
///  request with `allNodes=true` spans.
///
/// The order returned here is the concatenation order of the
///  federated listing, so implementations must keep it stable.
#[async_trait]
pub trait NodeDirectory: Send + Sync + std::fmt::Debug {
    async fn list_nodes(&self) -> Result<Vec<Node>, DirectoryError>;
}

/// Fixed node list, usually read from the config file.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    nodes: Vec<Node>,
}

impl StaticDirectory {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Drop the entry for this gateway's own node, if listed,
    ///  so it is not queried as its own remote.
    pub fn excluding(mut self, self_node_id: Option<&str>) -> Self {
        if let Some(self_id) = self_node_id {
            self.nodes.retain(|node| node.node_id != self_id);
        }
        self
    }

    pub fn get_node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.node_id == node_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[async_trait]
impl NodeDirectory for StaticDirectory {
    async fn list_nodes(&self) -> Result<Vec<Node>, DirectoryError> {
        Ok(self.nodes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> Node {
        Node {
            node_id: id.to_string(),
            node_name: None,
            endpoint: Url::parse(&format!("http://{id}.example.org/")).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_list_preserves_configured_order() {
        let directory = StaticDirectory::new(vec![node("b"), node("a"), node("c")]);
        let ids: Vec<_> = directory
            .list_nodes()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.node_id)
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_excluding_self() {
        let directory =
            StaticDirectory::new(vec![node("a"), node("me"), node("c")]).excluding(Some("me"));
        assert_eq!(directory.len(), 2);
        assert!(directory.get_node("me").is_none());
        assert_eq!(directory.get_node("c").unwrap().node_id, "c");
    }
}
