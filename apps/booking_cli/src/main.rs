use std::{io, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{BookingClient, WizardController};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod flow;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Book a restaurant table from the terminal")]
struct Args {
    /// Base URL of the booking API, e.g. https://localhost:7135/api
    #[arg(long)]
    api_url: Option<String>,
    /// Settings file; `booking.toml` in the working directory is used when present
    #[arg(long)]
    config: Option<PathBuf>,
    /// Check that the booking API answers, then exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let settings = load_settings(args.config.as_deref(), args.api_url.as_deref())?;
    info!(api_url = %settings.api_url, "booking API configured");

    let client = BookingClient::new(settings.api_url);

    if args.check {
        if !client.check_connection().await {
            warn!(api_url = client.api_url(), "booking API unreachable");
            bail!("booking API at {} is not reachable", client.api_url());
        }
        println!("Booking API at {} is reachable.", client.api_url());
        return Ok(());
    }

    let mut wizard = WizardController::new();
    let stdin = io::stdin();
    flow::run(&client, &mut wizard, stdin.lock(), io::stdout())
        .await
        .context("booking wizard stopped unexpectedly")
}
