use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The kinds of resource a gateway node lists.
///
/// The string form doubles as the path segment of the listing
///  endpoint, which is also what remote nodes are queried on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Tools,
    Allocations,
    Deployments,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Tools => "tools",
            ResourceKind::Allocations => "allocations",
            ResourceKind::Deployments => "deployments",
        }
    }

    /// Path segment of the single-item endpoint (`/tool/{id}`, ...)
    pub fn item_segment(&self) -> &'static str {
        match self {
            ResourceKind::Tools => "tool",
            ResourceKind::Allocations => "allocation",
            ResourceKind::Deployments => "deployment",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown resource kind: {0}")]
pub struct UnknownResourceKind(String);

impl FromStr for ResourceKind {
    type Err = UnknownResourceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tools" | "tool" => Ok(ResourceKind::Tools),
            "allocations" | "allocation" => Ok(ResourceKind::Allocations),
            "deployments" | "deployment" => Ok(ResourceKind::Deployments),
            other => Err(UnknownResourceKind(other.to_string())),
        }
    }
}

/// An item that can appear in a federated page.
pub trait Resource: Serialize + DeserializeOwned + Debug + Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    fn id(&self) -> &str;
}
