//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Spreadhound - statistical-arbitrage pairs-trading engine
#[derive(Parser, Debug)]
#[command(
    name = "spreadhound",
    version = env!("CARGO_PKG_VERSION"),
    about = "Statistical-arbitrage pairs-trading engine",
    long_about = "Spreadhound screens a symbol universe for cointegrated, \
                  mean-reverting pairs and emits risk-managed entry/stop/take-profit \
                  recommendations from spread z-scores."
)]
pub struct CliApp {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen the symbol universe for viable pairs
    Screen(ScreenCmd),

    /// Run one analysis cycle and print recommendations
    Analyze(AnalyzeCmd),

    /// Evaluate an open position (JSON file) for exit
    CheckExit(CheckExitCmd),
}

#[derive(Parser, Debug)]
pub struct ScreenCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Ignore the screener cache and re-screen
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Parser, Debug)]
pub struct AnalyzeCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/default.toml")]
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
pub struct CheckExitCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/default.toml")]
    pub config: PathBuf,

    /// JSON file holding the open position's frozen metadata
    #[arg(short, long, value_name = "FILE")]
    pub position: PathBuf,
}
