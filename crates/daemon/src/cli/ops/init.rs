use clap::Args;
use url::Url;

use awm_daemon::state::{AppConfig, AppState, StateError, StoreConfig};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server port
    #[arg(long, default_value_t = 8080)]
    pub api_port: u16,

    /// Externally visible base URL of this node
    #[arg(long)]
    pub public_url: Option<Url>,

    /// Id of this node in the federation directory
    #[arg(long)]
    pub node_id: Option<String>,

    /// Keep records in memory instead of SQLite
    #[arg(long)]
    pub in_memory: bool,

    /// OIDC userinfo endpoint used to validate bearer tokens
    #[arg(long)]
    pub userinfo_url: Option<Url>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = StateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut config = AppConfig {
            api_port: self.api_port,
            public_url: self.public_url.clone(),
            self_node_id: self.node_id.clone(),
            store: if self.in_memory {
                StoreConfig::Memory
            } else {
                StoreConfig::Sqlite { path: None }
            },
            ..Default::default()
        };
        config.auth.userinfo_url = self.userinfo_url.clone();

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(format!(
            "Initialized awm directory at {}\n  config: {}\n  tools:  {}\n\nAdd federation peers as [[nodes]] entries in the config file.",
            state.awm_dir.display(),
            state.config_path.display(),
            state.tools_path.display(),
        ))
    }
}
