// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use paperless_deploy::config::ComponentConfig;
use paperless_deploy::deploy;

#[derive(Parser, Debug)]
#[command(name = "paperless-deploy", version, about = "Deploy Paperless to Kubernetes")]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, env = "PAPERLESS_DEPLOY_CONFIG", default_value = "paperless.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the desired cluster objects as YAML
    Render,
    /// Apply the deployment and publish the DNS record
    Up {
        /// Print the admin password instead of masking it
        #[arg(long)]
        show_secrets: bool,
    },
    /// Only reconcile the DNS record
    Dns,
    /// Delete the DNS record
    RemoveDns,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration before any cluster or DNS call
    let config = ComponentConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    info!("Configuration loaded: domain={}", config.fqdn());

    match cli.command {
        Command::Render => {
            print!("{}", deploy::render(&config)?);
        }
        Command::Up { show_secrets } => {
            let outputs = deploy::up(&config, show_secrets)
                .await
                .context("Deployment failed")?;
            println!("{}", outputs.to_json()?);
        }
        Command::Dns => {
            let outcome = deploy::dns_only(&config)
                .await
                .context("DNS reconciliation failed")?;
            info!(
                "DNS record {} -> {} ({:?})",
                outcome.record.key, outcome.record.value, outcome.action
            );
        }
        Command::RemoveDns => {
            if deploy::remove_dns(&config)
                .await
                .context("DNS record removal failed")?
            {
                info!("Removed DNS record for {}", config.fqdn());
            } else {
                info!("No DNS record for {}", config.fqdn());
            }
        }
    }

    Ok(())
}
