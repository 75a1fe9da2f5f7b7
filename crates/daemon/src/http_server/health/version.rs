use axum::extract::State;
use axum::Json;
use serde::Serialize;
use url::Url;

use common::version::{build_info, BuildInfo};

use crate::ServiceState;

/// Build of this binary plus how the node identifies itself to the
///  federation.
#[derive(Debug, Serialize)]
pub struct NodeVersion {
    #[serde(flatten)]
    pub build: BuildInfo,
    pub node_id: Option<String>,
    pub public_url: Option<Url>,
}

#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> Json<NodeVersion> {
    Json(NodeVersion {
        build: build_info(),
        node_id: state.self_node_id().map(str::to_string),
        public_url: state.public_url().cloned(),
    })
}
