//! CLI command definitions and dispatch

pub mod ambassador;
pub mod catalog;
pub mod request;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use equipment_checkout::{AppResult, AppState};

/// Equipment checkout: browse, request and manage equipment loans
#[derive(Debug, Parser)]
#[command(name = "equipment-checkout", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Equipment types and how many units are available
    Catalog(catalog::CatalogArgs),
    /// Every equipment unit
    Inventory,
    /// Units of a model that can be assigned right now
    Units {
        /// Equipment model, e.g. "Meta Quest 3"
        model: String,
    },
    /// Set the condition score (0-10) of a unit
    Condition {
        equipment_id: i32,
        condition: i32,
    },
    /// Request to check out one unit of a model
    Request(request::RequestArgs),
    /// Sign the equipment liability waiver
    SignWaiver(request::SignWaiverArgs),
    /// Ambassador console
    Ambassador(ambassador::AmbassadorArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, state: &AppState) -> AppResult<()> {
        match &self.command {
            Commands::Catalog(args) => catalog::execute(args, state, self.format).await,
            Commands::Inventory => catalog::inventory(state, self.format).await,
            Commands::Units { model } => catalog::units(model, state, self.format).await,
            Commands::Condition {
                equipment_id,
                condition,
            } => catalog::set_condition(*equipment_id, *condition, state, self.format).await,
            Commands::Request(args) => request::execute(args, state, self.format).await,
            Commands::SignWaiver(args) => request::sign_waiver(args, state, self.format).await,
            Commands::Ambassador(args) => ambassador::execute(args, state, self.format).await,
        }
    }
}

/// Wait for Ctrl-C; used by the watch commands
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
