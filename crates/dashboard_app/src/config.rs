//! Command-line and environment configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dashboard_construction::ConstructCatalog;
use dashboard_grid::GridBounds;
use dashboard_net::connection::{DEFAULT_NATS_URL, NATS_URL_ENV};
use dashboard_net::subjects::DEFAULT_PREFIX;

/// Environment variable holding the anti-forgery token for commands.
pub const CSRF_TOKEN_ENV: &str = "DASHBOARD_CSRF_TOKEN";

#[derive(Debug, Parser)]
#[command(name = "dashboard_app", about = "Operator dashboard for the grid world simulation")]
pub struct Args {
    /// NATS server URL
    #[arg(long, env = NATS_URL_ENV, default_value = DEFAULT_NATS_URL)]
    pub nats_url: String,

    /// NATS subject prefix
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Anti-forgery token sent with every create/destroy command
    #[arg(long, env = CSRF_TOKEN_ENV, hide_env_values = true)]
    pub csrf_token: Option<String>,

    /// Grid width used until a snapshot reports the real bounds
    #[arg(long, default_value_t = 32)]
    pub grid_width: u32,

    /// Grid height used until a snapshot reports the real bounds
    #[arg(long, default_value_t = 32)]
    pub grid_height: u32,

    /// JSON file listing the constructs that can be placed
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate grid update code from a JSON layout, without connecting
    Generate {
        /// Layout file
        #[arg(long)]
        layout: PathBuf,
    },
}

/// Resolved configuration for a live dashboard session.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// NATS server URL.
    pub nats_url: String,
    /// Subject prefix.
    pub prefix: String,
    /// Anti-forgery token, if configured.
    pub csrf_token: Option<String>,
    /// Initial grid bounds.
    pub bounds: GridBounds,
    /// Placeable constructs.
    pub catalog: ConstructCatalog,
}

impl DashboardConfig {
    /// Build the configuration from parsed arguments, loading the catalog
    /// file if one was given.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be read or parsed.
    pub fn from_args(args: &Args) -> Result<Self> {
        let catalog = match &args.catalog {
            Some(path) => load_catalog(path)?,
            None => ConstructCatalog::new(),
        };
        Ok(Self {
            nats_url: args.nats_url.clone(),
            prefix: args.prefix.clone(),
            csrf_token: args.csrf_token.clone(),
            bounds: GridBounds::new(args.grid_width, args.grid_height),
            catalog,
        })
    }
}

fn load_catalog(path: &Path) -> Result<ConstructCatalog> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading construct catalog {}", path.display()))?;
    ConstructCatalog::from_json(&json).with_context(|| format!("parsing construct catalog {}", path.display()))
}
