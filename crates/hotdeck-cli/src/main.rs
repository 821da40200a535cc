//! Hotdeck CLI
//!
//! Command-line interface for a hotbar store directory

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hotdeck_core::logging_facility::{init, Profile};
use hotdeck_store::HotbarStore;

mod commands;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    /// Human-readable logs
    Pretty,
    /// JSON lines
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "hotdeck")]
#[command(about = "Hotdeck - pinned-entity hotbars", long_about = None)]
struct Cli {
    /// Directory holding lens-hotbar-store.json
    #[arg(long, env = "HOTDECK_DIR", default_value = ".hotdeck", global = true)]
    dir: PathBuf,

    /// Log output format (stderr)
    #[arg(
        long,
        env = "HOTDECK_LOG_FORMAT",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List hotbars and the slots of the active one
    List(commands::hotbar::ListArgs),
    /// Create a hotbar
    Add(commands::hotbar::AddArgs),
    /// Remove a hotbar
    Remove(commands::hotbar::RemoveArgs),
    /// Rename a hotbar
    Rename(commands::hotbar::RenameArgs),
    /// Show or change the active hotbar
    Active(commands::hotbar::ActiveArgs),
    /// Cycle the active hotbar
    Switch(commands::hotbar::SwitchArgs),
    /// Pin an entity to the active hotbar
    Pin(commands::pin::PinArgs),
    /// Unpin an entity
    Unpin(commands::pin::UnpinArgs),
    /// Move a pinned entity to another slot
    Restack(commands::pin::RestackArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Pretty => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!(dir = %cli.dir.display(), "opening hotbar store");
    let mut store = HotbarStore::open(cli.dir)?;
    store.load()?;

    match cli.command {
        Commands::List(args) => commands::hotbar::list(args, &store),
        Commands::Add(args) => commands::hotbar::add(args, &mut store),
        Commands::Remove(args) => commands::hotbar::remove(args, &mut store),
        Commands::Rename(args) => commands::hotbar::rename(args, &mut store),
        Commands::Active(args) => commands::hotbar::active(args, &mut store),
        Commands::Switch(args) => commands::hotbar::switch(args, &mut store),
        Commands::Pin(args) => commands::pin::pin(args, &mut store),
        Commands::Unpin(args) => commands::pin::unpin(args, &mut store),
        Commands::Restack(args) => commands::pin::restack(args, &mut store),
    }
}
