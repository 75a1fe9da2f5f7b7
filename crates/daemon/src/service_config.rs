use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use common::directory::Node;

/// Where a node keeps its owned records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// a path to a sqlite database
    Sqlite(PathBuf),
    /// records live only as long as the process
    Memory,
}

/// Resolved runtime configuration of a gateway node.
#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Port for the HTTP server
    pub api_port: u16,
    /// Externally visible base URL, used for `self` and page links.
    ///  If unset, links are built from the request's Host header.
    pub public_url: Option<Url>,

    // data store configuration
    pub store: StoreBackend,
    /// Directory holding tool blueprints
    pub catalog_path: PathBuf,

    // auth
    /// OIDC userinfo endpoint; without it any bearer token is
    ///  accepted as its own subject
    pub userinfo_url: Option<Url>,

    // federation
    /// Peer nodes in concatenation order
    pub nodes: Vec<Node>,
    /// This node's id, so it is not queried as its own remote
    pub self_node_id: Option<String>,
    pub remote_timeout: Duration,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}
