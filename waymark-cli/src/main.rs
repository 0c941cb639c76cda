//! Waymark CLI - command-line interface
//!
//! This binary provides marker management and a watch mode over the waymark
//! library: create markers, attach photos, and run the proximity engine
//! against a live or replayed location stream.

mod commands;
mod error;
mod sink;
mod source;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::photo::PhotoCommands;
use commands::watch::WatchArgs;
use error::CliError;

#[derive(Parser)]
#[command(
    name = "waymark",
    version,
    about = "Geographic markers with photo attachments and proximity notifications"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a marker
    Add {
        /// Latitude in degrees
        latitude: f64,

        /// Longitude in degrees
        longitude: f64,

        /// Display title
        title: String,
    },

    /// List markers
    List {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Delete a marker and its photos
    Delete {
        /// Marker id
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Delete all markers
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Manage photos attached to markers
    Photo {
        #[command(subcommand)]
        command: PhotoCommands,
    },

    /// Watch a location stream and raise proximity notifications
    Watch(WatchArgs),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        Commands::Add {
            latitude,
            longitude,
            title,
        } => commands::add::run(latitude, longitude, &title),
        Commands::List { json } => commands::list::run(json),
        Commands::Delete { id, yes } => commands::delete::run(id, yes),
        Commands::Clear { yes } => commands::delete::run_clear(yes),
        Commands::Photo { command } => commands::photo::run(command),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
