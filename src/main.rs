//! Spreadhound - Statistical-Arbitrage Pairs-Trading Engine
//!
//! Screens for cointegrated pairs and emits mean-reversion trade
//! recommendations from spread z-scores.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use spreadhound::adapters::cli::{AnalyzeCmd, CheckExitCmd, CliApp, Command, ScreenCmd};
use spreadhound::adapters::FileCandleProvider;
use spreadhound::application::Orchestrator;
use spreadhound::config::{load_config, Config};
use spreadhound::domain::OpenSpreadPosition;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (environment overrides go here)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    init_logging(app.verbose, app.debug)?;

    match app.command {
        Command::Screen(cmd) => screen_command(cmd).await,
        Command::Analyze(cmd) => analyze_command(cmd).await,
        Command::CheckExit(cmd) => check_exit_command(cmd).await,
    }
}

fn init_logging(verbose: bool, debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };

    fmt().with_env_filter(filter).init();
    Ok(())
}

fn build_orchestrator(config: Config) -> Orchestrator {
    // Expand data dir path (handles ~ for home directory)
    let data_dir = shellexpand::tilde(&config.data.get_data_dir()).to_string();
    let provider = Arc::new(FileCandleProvider::new(data_dir));
    Orchestrator::new(config, provider, "spreadhound")
}

async fn screen_command(cmd: ScreenCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let orchestrator = build_orchestrator(config);

    let pairs = orchestrator
        .screen(!cmd.no_cache)
        .await
        .context("Screening failed")?;

    if pairs.is_empty() {
        tracing::warn!("No viable pairs found");
    }
    println!("{}", serde_json::to_string_pretty(&pairs)?);
    Ok(())
}

async fn analyze_command(cmd: AnalyzeCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let mut orchestrator = build_orchestrator(config);

    // Setup Ctrl+C handler
    let stopper = orchestrator.stopper();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        *stopper.write().await = true;
    });

    let recommendations = orchestrator
        .run_cycle()
        .await
        .context("Analysis cycle failed")?;

    if recommendations.is_empty() {
        tracing::info!("No actionable signals this cycle");
    }
    println!("{}", serde_json::to_string_pretty(&recommendations)?);
    Ok(())
}

async fn check_exit_command(cmd: CheckExitCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;

    let content = std::fs::read_to_string(&cmd.position)
        .with_context(|| format!("Failed to read position file {}", cmd.position.display()))?;
    let position: OpenSpreadPosition =
        serde_json::from_str(&content).context("Failed to parse position file")?;

    let orchestrator = build_orchestrator(config);
    let decision = orchestrator.check_exit_live(&position).await;

    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}
