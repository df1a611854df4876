//! Cloud-model output tool.
//!
//! Extracts vertical profiles from model runs into cached text records and
//! renders profile plots, height sections and pressure time sections as PNG.

mod config;
mod hovmoller;
mod profiles;
mod section;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use profile_store::Run;

#[derive(Parser, Debug)]
#[command(name = "cloudplot")]
#[command(about = "Extract, cache and plot cloud-model output")]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        env = "CLOUDPLOT_CONFIG",
        default_value = "cloudplot.yaml"
    )]
    config: PathBuf,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch vertical profiles, computing and caching missing ones
    Profiles {
        /// Variable to extract (default: from config)
        #[arg(long)]
        variable: Option<String>,

        /// Recompute even when a cache record exists
        #[arg(long)]
        force: bool,

        /// Comma-separated runs, e.g. `1,2,run7` (default: from config)
        #[arg(long, value_delimiter = ',')]
        runs: Vec<Run>,
    },

    /// Plot horizontal/height sections at one output time
    Section,

    /// Plot pressure perturbation against time at one height
    Hovmoller,
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level, args.json_logs)?;

    let config = config::load_config(&args.config)?;
    info!(
        config = %args.config.display(),
        data_dir = %config.store.data_dir.display(),
        cache_dir = %config.store.cache_dir.display(),
        "Loaded configuration"
    );

    match args.command {
        Command::Profiles {
            variable,
            force,
            runs,
        } => profiles::run(&config, variable.as_deref(), force, &runs),
        Command::Section => section::run(&config),
        Command::Hovmoller => hovmoller::run(&config),
    }
}
