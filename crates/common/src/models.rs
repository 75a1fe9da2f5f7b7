use serde::{Deserialize, Serialize};
use url::Url;

use crate::resource::{Resource, ResourceKind};

// Tools

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    #[default]
    Vm,
    Container,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlueprintType {
    #[default]
    Tosca,
    Ansible,
    Helm,
}

/// A tool blueprint as listed by a node's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(rename = "type", default)]
    pub tool_type: ToolType,
    pub blueprint: String,
    #[serde(default)]
    pub blueprint_type: BlueprintType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Url>,
}

impl Resource for ToolInfo {
    const KIND: ResourceKind = ResourceKind::Tools;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Reference to a tool, as embedded in a deployment request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolId {
    pub id: String,
    #[serde(default = "latest_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_link: Option<Url>,
}

fn latest_version() -> String {
    "latest".to_string()
}

// Allocations

/// Credentials or environment a user can deploy workloads into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Allocation {
    KubernetesEnvironment {
        host: Url,
    },
    OpenStackEnvironment {
        host: Url,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tenant: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        domain: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        region: Option<String>,
        #[serde(
            rename = "userName",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        user_name: Option<String>,
    },
    EoscNodeEnvironment {
        #[serde(rename = "nodeId")]
        node_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationInfo {
    pub id: String,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Url>,
    pub allocation: Allocation,
}

impl Resource for AllocationInfo {
    const KIND: ResourceKind = ResourceKind::Allocations;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationId {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_link: Option<Url>,
}

// Deployments

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    #[default]
    Unknown,
    Pending,
    Running,
    Stopped,
    Off,
    Failed,
    Configured,
    Unconfigured,
    Deleting,
}

/// A request to deploy a tool into an allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub allocation: AllocationId,
    pub tool: ToolId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentInfo {
    pub id: String,
    pub deployment: Deployment,
    #[serde(default)]
    pub status: DeploymentStatus,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Url>,
}

impl Resource for DeploymentInfo {
    const KIND: ResourceKind = ResourceKind::Deployments;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentId {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_link: Option<Url>,
}

// Users

/// The caller as seen by the identity provider.
///
/// Field names are snake_case on the wire, unlike the resource models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub base_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_dn: Option<String>,
    /// Virtual organisations the user is entitled to.
    #[serde(default)]
    pub vos: Vec<String>,
}

// Envelopes

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub id: String,
    pub description: String,
}

impl ErrorBody {
    pub fn new(status: u16, description: impl Into<String>) -> Self {
        Self {
            id: status.to_string(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Success {
    pub message: String,
}
