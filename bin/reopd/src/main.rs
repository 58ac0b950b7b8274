//! ---
//! reop_section: "01-core-functionality"
//! reop_subsection: "binary"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Binary entrypoint for the REOP daemon."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use reop_api::{ApiServerBuilder, ApiServerHandle};
use reop_assistant::AssistantSession;
use reop_common::config::AppConfig;
use reop_common::logging::init_tracing;
use reop_common::version::VersionInfo;
use reop_core::{SnapshotRegister, TelemetryFeed};
use reop_metrics::{
    new_registry, spawn_http_server, AssistantMetrics, DaemonMetrics, FeedMetrics, SharedRegistry,
};
use reop_telemetry::{SiteProfile, TelemetryGenerator};
use tokio::signal;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    version = concat!("REOP ", env!("CARGO_PKG_VERSION")),
    about = "REOP daemon",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "SEED",
        help = "Fix the telemetry RNG seed for reproducible runs"
    )]
    seed: Option<u64>,

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
    #[command(about = "Run the telemetry feed and dashboard API")]
    Run,
    #[command(about = "Print one telemetry snapshot as JSON and exit")]
    Sample,
    #[command(about = "Answer a single assistant question offline and exit")]
    Ask {
        #[arg(value_name = "QUESTION")]
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let version = VersionInfo::current();
    if cli.version {
        println!("{version}");
        return Ok(());
    }
    let candidates = [
        PathBuf::from("configs/example.prod.toml"),
        PathBuf::from("configs/example.dev.toml"),
    ];

    let load_started = Instant::now();
    let loaded_config = AppConfig::load_with_source(cli.config.as_deref(), &candidates)?;
    let mut config = loaded_config.config;
    let config_path = loaded_config.source;
    let load_duration = load_started.elapsed();

    let metrics_registry = new_registry();
    let daemon_metrics = DaemonMetrics::new(metrics_registry.clone())?;
    daemon_metrics.observe_config_load(load_duration.as_secs_f64());
    daemon_metrics.inc_start();
    daemon_metrics.set_build_info(version.version, version.profile);

    if let Some(seed) = cli.seed {
        config.feed.seed = Some(seed);
    }

    // Sample and Ask reserve stdout for their payload; only the long-running
    // daemon initialises tracing.
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            init_tracing("reopd", &config.logging)?;
            info!(
                config_path = %config_path.display(),
                site = %config.site.name,
                seed = ?config.feed.seed,
                "configuration loaded"
            );
            run_daemon(config, metrics_registry).await?;
        }
        Commands::Sample => println!("{}", render_snapshot(&config)?),
        Commands::Ask { question } => println!("{}", render_answer(&config, &question)),
    }

    Ok(())
}

async fn run_daemon(config: AppConfig, metrics_registry: SharedRegistry) -> Result<()> {
    let metrics_settings = config.metrics.clone();
    let api_settings = config.api.clone();

    let metrics_server = if metrics_settings.enabled {
        info!(address = %metrics_settings.listen, "metrics exporter enabled");
        Some(spawn_http_server(
            metrics_registry.clone(),
            metrics_settings.listen,
        )?)
    } else {
        info!("metrics exporter disabled by configuration");
        None
    };

    let profile = SiteProfile::from_config(&config.site);
    let generator = TelemetryGenerator::new(profile, config.feed.seed);
    let register = SnapshotRegister::new();
    let feed_metrics = FeedMetrics::new(metrics_registry.clone())?;
    let feed = TelemetryFeed::new(generator, register.clone(), config.feed.interval)
        .with_metrics(feed_metrics)
        .spawn();

    let mut api_server: Option<ApiServerHandle> = None;
    if api_settings.enabled {
        let static_dir = api_settings.static_dir.clone().and_then(|dir| {
            if dir.is_dir() {
                Some(dir)
            } else {
                warn!(static_dir = %dir.display(), "api static_dir not found; serving API without assets");
                None
            }
        });
        let session = AssistantSession::new(config.feed.seed);
        let mut builder = ApiServerBuilder::new(
            api_settings.listen,
            register.clone(),
            session,
            config.site.name.clone(),
        )
        .with_assistant_metrics(AssistantMetrics::new(metrics_registry.clone())?);
        if let Some(dir) = static_dir {
            builder = builder.with_static_dir(dir);
        }
        if let Some(server) = &metrics_server {
            builder = builder.with_metrics_endpoint(format!("http://{}/metrics", server.addr()));
        }
        match builder.spawn().await {
            Ok(server) => {
                info!(address = %server.local_addr(), "api server listening");
                api_server = Some(server);
            }
            Err(err) => {
                warn!(error = %err, "failed to start api server");
            }
        }
    } else {
        info!("api server disabled by configuration");
    }

    info!(site = %config.site.name, "daemon running; waiting for termination signal");
    signal::ctrl_c().await?;
    info!("ctrl-c received; shutting down");

    if let Some(server) = api_server {
        server.shutdown().await?;
    }
    feed.shutdown().await?;
    if let Some(server) = metrics_server {
        server.shutdown().await?;
    }

    Ok(())
}

fn render_snapshot(config: &AppConfig) -> Result<String> {
    let profile = SiteProfile::from_config(&config.site);
    let mut generator = TelemetryGenerator::new(profile, config.feed.seed);
    let snapshot = generator.snapshot();
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

fn render_answer(config: &AppConfig, question: &str) -> String {
    let profile = SiteProfile::from_config(&config.site);
    let mut generator = TelemetryGenerator::new(profile, config.feed.seed);
    let snapshot = generator.snapshot();
    let mut session = AssistantSession::new(config.feed.seed);
    let exchange = session.ask(question, &snapshot);
    exchange.reply.content
}
