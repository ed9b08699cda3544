//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the loader using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Patient Loader - JSON patient records to PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "patient-loader")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "patient-loader.toml",
        env = "PATIENT_LOADER_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PATIENT_LOADER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load every .json file in a directory into PostgreSQL
    Load(commands::load::LoadArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
