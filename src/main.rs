//! CLI entry point: fetch one page of supervision alerts and print it.

use anyhow::{Context, Result};
use clap::Parser;
use portal_alerts_core::config::{load_default_file_config, resolve_settings};
use portal_alerts_core::{AuthSession, HttpClient, SupervisionClient};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the payload; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let loaded = load_default_file_config()?;
    debug!(path = ?loaded.path, loaded = loaded.config.is_some(), "config resolved");

    let settings = resolve_settings(&args.config_layer(), loaded.config.as_ref(), |name| {
        std::env::var(name).ok()
    })?;
    info!(
        base_url = %settings.base_url,
        username = %settings.credentials.username(),
        "Portal alerts starting"
    );

    let client =
        HttpClient::with_settings(settings.client).context("Failed to build HTTP client")?;
    let session = AuthSession::new(client, settings.credentials);
    let mut supervision = SupervisionClient::new(session, &settings.base_url)?;
    let query = args.query();

    if args.names {
        let page = supervision
            .alerts_by_equipments(&query)
            .await
            .context("Unable to fetch alerts")?;
        for name in page.equipment_names() {
            println!("{name}");
        }
    } else {
        let payload = supervision
            .alerts_by_equipments_raw(&query)
            .await
            .context("Unable to fetch alerts")?;
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    Ok(())
}
