//! # credstack CLI
//!
//! Entry point for the credstack command-line tool.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use credstack_cli::audit::{run_audit, AuditArgs};
use credstack_cli::check::{run_check, CheckArgs};
use credstack_cli::config::CliConfig;
use credstack_cli::resolve::{run_resolve, ResolveArgs};

/// credstack: credential schema resolution and tooling.
#[derive(Parser, Debug)]
#[command(name = "credstack", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (.json, .yaml or .yml).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a credential payload against a schema collection.
    Resolve(ResolveArgs),

    /// Report structural defects in schema collections.
    Audit(AuditArgs),

    /// Validate collection documents against the meta-schema.
    Check(CheckArgs),
}

fn level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbose)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if std::env::var("CREDSTACK_LOG_FORMAT").is_ok_and(|f| f == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = CliConfig::load_or_default(cli.config.as_deref()).and_then(|config| {
        match &cli.command {
            Commands::Resolve(args) => run_resolve(args, &config),
            Commands::Audit(args) => run_audit(args),
            Commands::Check(args) => run_check(args),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
