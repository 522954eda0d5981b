//! Chainwave CLI - Command-line interface for the fabrication engine
//!
//! This binary provides commands for demonstrating, running, and checking
//! the configuration of the continuous music fabrication engine.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use chainwave_cli::{commands, logger};

/// Chainwave - Continuous Generative Music Fabrication
#[derive(Parser)]
#[command(name = "chainwave")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fabricate a bounded number of segments and print what they became
    Demo {
        /// Number of segments to fabricate
        #[arg(short, long, default_value = "4")]
        segments: u64,

        /// Path to an engine config JSON file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<String>,

        /// Emit machine-readable JSON instead of the table
        #[arg(long)]
        json: bool,
    },

    /// Run the fabrication loop continuously until interrupted
    Run {
        /// Path to an engine config JSON file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<String>,

        /// Milliseconds between scheduler ticks
        #[arg(long, default_value = "1000")]
        tick_ms: u64,

        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(long)]
        duration_secs: Option<u64>,
    },

    /// Validate an engine config file without running anything
    CheckConfig {
        /// Path to the engine config JSON file
        #[arg(short, long)]
        config: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let result = match cli.command {
        Commands::Demo {
            segments,
            config,
            json,
        } => commands::demo::run(segments, config.as_deref(), json),
        Commands::Run {
            config,
            tick_ms,
            duration_secs,
        } => commands::run::run(config.as_deref(), tick_ms, duration_secs),
        Commands::CheckConfig { config } => commands::check_config::run(&config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
