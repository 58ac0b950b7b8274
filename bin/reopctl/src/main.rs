//! ---
//! reop_section: "05-networking-external-interfaces"
//! reop_subsection: "binary"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Control CLI for operators interacting with REOP."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use reop_common::version::VersionInfo;
use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

mod api;

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "REOP operator control utility",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print version information and exit"
    )]
    version: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Show daemon status")]
    Status(api::ApiOptions),
    #[command(about = "Fetch the latest telemetry snapshot as JSON")]
    Snapshot(api::ApiOptions),
    #[command(about = "Ask the dashboard assistant a question")]
    Ask(api::AskArgs),
    #[command(about = "Print the assistant conversation transcript")]
    Transcript(api::ApiOptions),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    if cli.version {
        println!("{}", VersionInfo::current());
        return Ok(());
    }
    match cli.command {
        Some(Commands::Status(options)) => api::status(&options)?,
        Some(Commands::Snapshot(options)) => api::snapshot(&options)?,
        Some(Commands::Ask(args)) => api::ask(&args)?,
        Some(Commands::Transcript(options)) => api::transcript(&options)?,
        None => {
            Cli::command().print_help()?;
        }
    }
    Ok(())
}

/// Baseline subscriber for CLI runs; `RUST_LOG` raises verbosity when needed.
fn init_tracing() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}
