use clap::Args;

use awm_daemon::http_server::api::client::ApiError;
use awm_daemon::http_server::api::ListRequest;
use common::resource::ResourceKind;

/// List tools, allocations or deployments of a node, optionally
///  across the whole federation.
#[derive(Args, Debug, Clone)]
pub struct List {
    /// tools | allocations | deployments
    pub kind: ResourceKind,

    #[arg(long, default_value_t = 0)]
    pub from: u64,

    #[arg(long, default_value_t = 100)]
    pub limit: u64,

    /// Span every node of the federation
    #[arg(long)]
    pub all_nodes: bool,

    /// Bearer token forwarded to the node
    #[arg(long, env = "AWM_TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("request failed: {0}")]
    Api(#[from] ApiError),
    #[error("failed to render page: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for List {
    type Error = ListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let request = ListRequest::<serde_json::Value>::new(self.kind, self.from, self.limit)
            .with_all_nodes(self.all_nodes)
            .with_token(&self.token);

        let page = ctx.client.call(request).await?;
        Ok(serde_json::to_string_pretty(&page)?)
    }
}
