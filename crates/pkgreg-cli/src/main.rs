//! # pkgreg
//!
//! Pull-through registry for FHIR packages.
//!
//! Entry point of the `pkgreg` binary: parses the command line, sets up
//! logging and dispatches to the command handlers. Packages are fetched from
//! the configured source registry on first use and served from storage
//! afterwards.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use pkgreg_config::DEFAULT_CONFIG_FILE;
use pkgreg_core::RegistryError;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Pull-through FHIR package registry
#[derive(Parser)]
#[command(
    name = "pkgreg",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about = "Pull-through FHIR package registry"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, env = "PKGREG_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: Utf8PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the configured initial packages
    Preload,
    /// Fetch one package version and write its archive
    Get {
        name: String,
        version: String,
        /// Directory the archive is written to
        #[arg(short, long, default_value = ".")]
        output: Utf8PathBuf,
    },
    /// Print the overview document of the stored versions of a package
    Overview {
        name: String,
        /// Prefix of the tarball URLs in the document
        #[arg(long, default_value = "http://localhost:8080/packages")]
        base_url: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.log_json);
    setup_panic_handler();

    info!("Starting pkgreg v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    rt.block_on(async {
        let ctx = CommandContext::load(&cli.config).await?;
        commands::dispatch_command(cli.command, &ctx).await?;
        Ok::<(), anyhow::Error>(())
    })
}

/// Print `err` and map it to the process exit code
fn report(err: &anyhow::Error) -> ExitCode {
    let formatter = ErrorFormatter::new();

    match err.downcast_ref::<RegistryError>() {
        Some(registry_err) => {
            eprintln!("{}", formatter.format_error(registry_err));
            ExitCode::from(exit_code(registry_err))
        },
        None => {
            eprintln!("{}", formatter.format_simple(&format!("{:#}", err)));
            ExitCode::FAILURE
        },
    }
}

/// 2 for the not-found class, 1 for everything else
fn exit_code(err: &RegistryError) -> u8 {
    if err.is_not_found() {
        2
    } else {
        1
    }
}

fn setup_logging(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pkgreg={level},pkgreg_core={level},pkgreg_config={level},pkgreg_retriever={level},pkgreg_store={level},pkgreg_resolver={level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("pkgreg encountered an unexpected error: {}", panic_info);
        eprintln!("pkgreg crashed! This is a bug.");
        eprintln!("Error: {}", panic_info);
    }));
}
