use clap::Args;
use url::Url;

use awm_daemon::state::AppState;
use awm_daemon::{spawn_service, ProcessError};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Externally visible base URL used in page and item links
    #[arg(long)]
    pub public_url: Option<Url>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] awm_daemon::state::StateError),

    #[error("daemon failed: {0}")]
    Failed(#[from] ProcessError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.awm)
        let state = AppState::load(ctx.config_path.clone())?;
        let mut config = state.service_config()?;

        // Flags win over the config file
        if let Some(api_port) = self.api_port {
            config.api_port = api_port;
        }
        if let Some(public_url) = &self.public_url {
            config.public_url = Some(public_url.clone());
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = Some(log_dir.clone());
        }

        spawn_service(&config).await?;
        Ok("daemon ended".to_string())
    }
}
