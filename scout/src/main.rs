//! Scout - conversational travel planner
//!
//! CLI entry point.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::info;

use scout::chat::ChatSession;
use scout::cli::{Cli, Command, OutputFormat};
use scout::config::Config;
use scout::tools::ToolRegistry;
use tripstore::TripStore;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scout")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Log to file, not stdout - the terminal belongs to the conversation
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("scout.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("Scout loaded config: model={}", config.llm.model);

    match cli.command {
        Some(Command::Chat) | None => cmd_chat(config, &cli.user).await,
        Some(Command::Plan { request }) => cmd_plan(&config, &cli.user, &request).await,
        Some(Command::Trips { format }) => cmd_trips(&config, format),
        Some(Command::Tools) => cmd_tools(),
    }
}

async fn cmd_chat(config: Config, user: &str) -> Result<()> {
    ChatSession::new(config, user).run().await
}

async fn cmd_plan(config: &Config, user: &str, request: &str) -> Result<()> {
    let response = scout::agent::run_workflow(request, user, config).await;
    println!("{}", response);
    Ok(())
}

fn cmd_trips(config: &Config, format: OutputFormat) -> Result<()> {
    let store = TripStore::open(&config.storage.db_path).context("Failed to open trip store")?;
    let trips = store.trips_with_items().context("Failed to list trips")?;

    match format {
        OutputFormat::Json => {
            let payload: Vec<serde_json::Value> = trips
                .iter()
                .map(|(trip, items)| serde_json::json!({"trip": trip, "items": items}))
                .collect();
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Text => {
            if trips.is_empty() {
                println!("No trips saved yet.");
                return Ok(());
            }
            for (trip, items) in trips {
                println!(
                    "{} {} - {} ({} to {})",
                    format!("[{}]", trip.id).bright_black(),
                    trip.name.bold(),
                    trip.destination,
                    trip.start_date,
                    trip.end_date
                );
                for item in items {
                    let cost = item.cost.map(|c| format!(" ${:.2}", c)).unwrap_or_default();
                    println!(
                        "    {} {} ({}){}",
                        format!("[{}]", item.item_type).bright_black(),
                        item.title,
                        item.start_datetime,
                        cost
                    );
                }
            }
        }
    }
    Ok(())
}

fn cmd_tools() -> Result<()> {
    let registry = ToolRegistry::standard();
    for def in registry.definitions() {
        println!("{}", def.name.bold());
        println!("    {}", def.description.bright_black());
    }
    Ok(())
}
