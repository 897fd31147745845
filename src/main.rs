use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use draft_content_api::config::Config;
use draft_content_api::infra::content_api_adapter::ContentApiCredentials;
use draft_content_api::server::{start_server, AppState};
use draft_content_api::{logging, metrics};

#[derive(Parser)]
#[command(name = "draft-content-api")]
#[command(about = "Serves draft content, falling back to validated published content")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "CONFIG_FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Overrides `server.port`
    #[arg(long, env = "APP_PORT")]
    port: Option<u16>,

    /// Basic auth username for the content API
    #[arg(long, env = "CONTENT_API_USERNAME")]
    content_api_username: Option<String>,

    #[arg(long, env = "CONTENT_API_PASSWORD", hide_env_values = true)]
    content_api_password: Option<String>,

    /// Sent as `X-Api-Key`; used when no basic auth is given
    #[arg(long, env = "CAPI_APIKEY", hide_env_values = true)]
    content_api_key: Option<String>,
}

impl Cli {
    fn credentials(&self) -> anyhow::Result<ContentApiCredentials> {
        match (&self.content_api_username, &self.content_api_password, &self.content_api_key) {
            (Some(username), Some(password), _) => Ok(ContentApiCredentials::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            (Some(_), None, _) | (None, Some(_), _) => {
                bail!("content API basic auth needs both a username and a password")
            }
            (None, None, Some(key)) => Ok(ContentApiCredentials::ApiKey(key.clone())),
            (None, None, None) => Ok(ContentApiCredentials::Anonymous),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _log_guard = logging::init_logging(config.server.log_dir.as_deref());
    info!(
        system_code = %config.server.app_system_code,
        content_types = config.content_types.len(),
        "Starting {}",
        config.server.app_name
    );

    match config.server.metrics_addr {
        Some(addr) => metrics::init_metrics(addr),
        None => warn!("No metrics_addr configured, Prometheus exporter disabled"),
    }

    let credentials = cli.credentials()?;
    if matches!(credentials, ContentApiCredentials::Anonymous) {
        warn!("No content API credentials configured");
    }

    let state = AppState::from_config(&config, credentials)?;
    start_server(state, config.server.port).await
}
