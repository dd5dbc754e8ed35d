use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use config::{load_config, DEFAULT_CONFIG_PATH};
use prompt::Prompter;

mod catalog;
mod config;
mod convert;
mod error;
mod fsutil;
mod loader;
mod models;
mod prompt;
mod tools;

/// Data file tools for the FCL download site
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// YAML config file; defaults are used when it does not exist
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert an old mdui-site data file to the NEXT layout (default)
    Convert,
    /// Remove the leading "click to select" entry from JSON lists
    Strip {
        /// Directory searched recursively for JSON files
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Move each subdirectory's only file up and name it after the directory
    Flatten,
    /// Generate a version file with one download URL per architecture
    Arch,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
    let result = match args.command.unwrap_or(Command::Convert) {
        Command::Convert => tools::convert::run(&mut prompter),
        Command::Strip { root } => tools::strip::run(&mut prompter, &root, &config),
        Command::Flatten => tools::flatten::run(&mut prompter),
        Command::Arch => tools::arch::run(&mut prompter, &config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // stdin closed: nothing left to ask
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "terminal i/o failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
