//! Redconar-Sync main entry point
//!
//! Command-line interface for reconciling the local provider table against
//! the Redconar portal. Stdout carries exactly one result; logs go to stderr.

use anyhow::Context;
use clap::Parser;
use redconar_sync::config::{load_config_with_hash, validate, validate_credentials};
use redconar_sync::output::{render_comparison, to_json_line, ErrorReport};
use redconar_sync::storage::open_store;
use redconar_sync::sync::acquire_session;
use redconar_sync::{run_sync, Config, Credentials, SessionToken, SyncOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Redconar-Sync: links local providers to their Redconar listing by CUIT
#[derive(Parser, Debug)]
#[command(name = "redconar-sync")]
#[command(version)]
#[command(about = "Reconciles local providers against the Redconar portal", long_about = None)]
struct Cli {
    /// Existing PHPSESSID to reuse instead of logging in
    #[arg(value_name = "SESSION_ID")]
    session_id: Option<String>,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Redconar account email
    #[arg(long, env = "REDCONAR_EMAIL", hide_env_values = true)]
    email: Option<String>,

    /// Redconar account password
    #[arg(long, env = "REDCONAR_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log in, print the session id and exit
    #[arg(long, conflicts_with_all = ["report", "dry_run", "session_id"])]
    session_only: bool,

    /// Print a human-readable comparison without linking anything
    #[arg(long, conflicts_with_all = ["session_only", "dry_run"])]
    report: bool,

    /// Reconcile and print the summary without linking anything
    #[arg(long, conflicts_with_all = ["session_only", "report"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            let report = ErrorReport::new(format!("{:#}", e));
            match to_json_line(&report) {
                Ok(line) => println!("{}", line),
                Err(_) => println!("{{\"error\":\"unreportable error\"}}"),
            }
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("redconar_sync=info,warn"),
            1 => EnvFilter::new("redconar_sync=debug,info"),
            2 => EnvFilter::new("redconar_sync=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs the selected mode and returns what goes to stdout
async fn run(cli: Cli) -> anyhow::Result<String> {
    let (config, config_hash) = load_or_default(cli.config.as_deref())?;

    let credentials = Credentials::new(
        cli.email.unwrap_or_default(),
        cli.password.unwrap_or_default(),
    );
    validate_credentials(&credentials)?;

    if cli.session_only {
        let session = acquire_session(&config, &credentials).await?;
        tracing::info!("Session acquired");
        return Ok(session.to_string());
    }

    let db_path = Path::new(&config.storage.database_path);
    let mut store = open_store(db_path)
        .with_context(|| format!("opening provider database {}", db_path.display()))?;

    let options = SyncOptions {
        session: cli.session_id.map(SessionToken::new),
        dry_run: cli.dry_run || cli.report,
        config_hash,
    };

    let outcome = run_sync(&config, &credentials, &mut store, options).await?;

    if let Some(e) = &outcome.link_error {
        tracing::error!("{}", e);
    }

    if cli.report {
        return Ok(render_comparison(&outcome.result));
    }

    Ok(to_json_line(&outcome.report())?)
}

fn load_or_default(path: Option<&Path>) -> anyhow::Result<(Config, String)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, hash))
        }
        None => {
            let config = Config::default();
            validate(&config)?;
            tracing::debug!("No configuration file given; using defaults");
            Ok((config, "default".to_string()))
        }
    }
}
