//! Quince CLI - Development and operations tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed a demo catalog and print what was created
//! quince-cli seed
//!
//! # Run the full checkout walkthrough against an in-process store
//! quince-cli demo
//!
//! # Walkthrough with a custom lockout threshold
//! quince-cli demo --lockout-threshold 3
//! ```
//!
//! Both commands build their own in-process store; they exercise the
//! domain end to end without needing the server running.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quince-cli")]
#[command(author, version, about = "Quince CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed a demo catalog and accounts, printing a summary
    Seed,
    /// Run the scripted checkout walkthrough
    Demo {
        /// Failed logins before lockout
        #[arg(long, default_value_t = 5)]
        lockout_threshold: u32,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(&cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed => commands::seed::run()?,
        Commands::Demo { lockout_threshold } => commands::demo::run(lockout_threshold)?,
    }
    Ok(())
}
