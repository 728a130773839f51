mod backend;
mod cli;
mod config;
mod console;
mod error;
mod identifier;
mod repl;
mod secrets;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use backend::aws::SecretsManagerClient;
use cli::Cli;
use config::Settings;
use console::Terminal;
use secrets::SecretManager;

const LOG_ENV: &str = "PASSKEEP_LOG";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => config::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let path = config::config_path(&config::project_root()?);
            config::read_or_default(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?
        }
    };
    let settings = Settings::resolve(file, cli.overrides(), |key| std::env::var(key).ok());

    debug!(
        profile = settings.profile.as_deref().unwrap_or("default"),
        endpoint = settings.endpoint_url.as_deref().unwrap_or("default"),
        "starting"
    );

    let client = SecretsManagerClient::connect(&settings)
        .context("Failed to configure Secrets Manager access")?;
    let manager = SecretManager::new(client, settings.output_file);
    debug!(output = %manager.output_file().display(), "retrieved secrets go to local file");

    repl::run(&manager, &mut Terminal::new()).context("Console I/O failed")?;

    Ok(())
}
