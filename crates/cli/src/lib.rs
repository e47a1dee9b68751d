pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(
    name = "deadline",
    about = "Conference deadline bot operator CLI",
    long_about = "Look up conference deadlines, inspect configuration, and check source readiness.",
    after_help = "Examples:\n  deadline lookup iclr\n  deadline lookup nips --json\n  deadline doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Fetch live deadlines for a conference and print the Slack response")]
    Lookup {
        #[arg(help = "Conference key or alias, e.g. iclr or nips")]
        conference: String,
        #[arg(long, help = "Print the Block Kit payload as JSON")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution and redaction")]
    Config,
    #[command(about = "Validate config and conference source reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Lookup { conference, json } => commands::lookup::run(&conference, json),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(Level::WARN)
        .compact()
        .try_init();
}
