//! # dashboard_app — Operator dashboard
//!
//! Mirrors the simulation's grid from its entity channel and lets an
//! operator place and destroy entities from the console.
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments (`NATS_URL`, `DASHBOARD_CSRF_TOKEN` as fallbacks).
//! 2. Connect to NATS and bootstrap the grid from a snapshot.
//! 3. Follow the entity, exchange and log channels while reading operator
//!    commands from stdin.
//!
//! `dashboard_app generate --layout <file>` instead prints grid-update code
//! for a painted map and exits.

mod config;
mod generator;
mod operator;
mod render;
mod runner;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Args, Command, DashboardConfig};
use generator::{MapDraft, MapLayout};
use runner::DashboardRunner;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dashboard_app=info".parse()?))
        .init();

    let args = Args::parse();

    if let Some(Command::Generate { layout }) = &args.command {
        let json = std::fs::read_to_string(layout).with_context(|| format!("reading layout {}", layout.display()))?;
        let layout: MapLayout = serde_json::from_str(&json).context("parsing layout")?;
        print!("{}", MapDraft::from_layout(&layout).generate_code());
        return Ok(());
    }

    let config = DashboardConfig::from_args(&args)?;
    info!(constructs = config.catalog.len(), bounds = ?config.bounds, "configuration loaded");

    DashboardRunner::new(config).run().await
}
