//! Mirror backup CLI
//!
//! Runs one backup: sync, classify, archive, prune, report.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use mirror_backup_core::prelude::*;
use tracing_subscriber::EnvFilter;

/// Mirror a remote tree, archive it and mail a report
#[derive(Parser, Debug)]
#[command(name = "mirror-backup")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "MIRROR_BACKUP_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    ExitCode::from(run(&cli).as_code())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> ExitStatusLike {
    let fs = RealFileSystem;

    // Without a configuration there is nobody to notify.
    let config = match Config::load(&fs, &cli.config) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err.describe(), "cannot load configuration");
            return ExitStatusLike::Error;
        }
    };

    let collaborators = Collaborators::from_config(&config, &fs);
    let now = Local::now().naive_local();
    match run_backup(&config, &collaborators, &fs, now) {
        Ok(_) => ExitStatusLike::Ok,
        Err(err) => {
            tracing::error!(error = %err.describe(), "backup run failed");
            notify_failure(&config, collaborators.mailer.as_ref(), now, &err);
            ExitStatusLike::Error
        }
    }
}
