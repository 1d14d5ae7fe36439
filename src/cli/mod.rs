//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Canopy using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Canopy - FreiData publication pipeline
#[derive(Parser, Debug)]
#[command(name = "canopy")]
#[command(version, about, long_about = None)]
#[command(author = "Canopy Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "canopy.toml", env = "CANOPY_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CANOPY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish one publication to FreiData
    Publish(commands::publish::PublishArgs),

    /// Run one scheduled pass: pending publications, then review sync
    Cron(commands::cron::CronArgs),

    /// Reconcile in-review publications against the repository
    Sync(commands::sync::SyncArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
