//! ---
//! reop_section: "04-observability"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Metrics collection and export utilities."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, StatusCode};
use axum::routing::get;
use axum::{response::IntoResponse, Router};
use prometheus::{
    Gauge, GaugeVec, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

use reop_telemetry::model::EnergySnapshot;

/// Shared registry type used across services.
pub type SharedRegistry = Arc<Registry>;

/// Produce a new shared registry.
pub fn new_registry() -> SharedRegistry {
    Arc::new(Registry::new())
}

/// Spawn an HTTP server that exposes the registry at `/metrics`.
pub fn spawn_http_server(registry: SharedRegistry, addr: SocketAddr) -> Result<MetricsServer> {
    let app = Router::new().route(
        "/metrics",
        get({
            let registry = registry.clone();
            move || metrics_handler(registry.clone())
        }),
    );

    let std_listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind metrics listener {}", addr))?;
    std_listener
        .set_nonblocking(true)
        .with_context(|| "failed to configure metrics listener as non-blocking")?;
    let local_addr = std_listener
        .local_addr()
        .with_context(|| "failed to resolve metrics listener address")?;
    let listener = TcpListener::from_std(std_listener)
        .with_context(|| "failed to convert std listener into tokio listener")?;

    info!(address = %local_addr, "metrics server starting");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let service = app.into_make_service();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        axum::serve(listener, service)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .context("metrics server encountered an error")?;
        Ok(())
    });

    Ok(MetricsServer {
        addr: local_addr,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}

/// Prometheus scrape endpoint. Returns `text/plain` metrics even on large registries.
async fn metrics_handler(registry: SharedRegistry) -> impl IntoResponse {
    let families = registry.gather();
    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&families) {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(prometheus::TEXT_FORMAT),
            )],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("metrics encoding error"),
            )
                .into_response()
        }
    }
}

/// Handle to the running HTTP exporter.
#[derive(Debug)]
pub struct MetricsServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl MetricsServer {
    /// Return the bound address for convenience.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal shutdown and await task completion.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err),
            Err(join_err) => Err(anyhow::Error::new(join_err)),
        }
    }
}

/// Metrics recorded by the daemon process itself.
#[derive(Clone)]
pub struct DaemonMetrics {
    registry: SharedRegistry,
    starts_total: IntCounter,
    config_load_seconds: Histogram,
    build_info: GaugeVec,
}

impl DaemonMetrics {
    pub fn new(registry: SharedRegistry) -> Result<Self> {
        let starts_total = IntCounter::with_opts(Opts::new(
            "reopd_starts_total",
            "Total number of times the REOP daemon has initialised",
        ))?;
        registry.register(Box::new(starts_total.clone()))?;

        let buckets = prometheus::exponential_buckets(0.001, 2.0, 16)
            .context("failed to construct histogram buckets")?;
        let config_load_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "reopd_config_load_seconds",
                "Time spent loading and validating configuration",
            )
            .buckets(buckets),
        )?;
        registry.register(Box::new(config_load_seconds.clone()))?;

        let build_info = GaugeVec::new(
            Opts::new(
                "reopd_build_info",
                "Build metadata for the running daemon binary",
            ),
            &["version", "profile"],
        )?;
        registry.register(Box::new(build_info.clone()))?;

        Ok(Self {
            registry,
            starts_total,
            config_load_seconds,
            build_info,
        })
    }

    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    pub fn inc_start(&self) {
        self.starts_total.inc();
    }

    pub fn observe_config_load(&self, seconds: f64) {
        self.config_load_seconds.observe(seconds);
    }

    pub fn set_build_info(&self, version: &str, profile: &str) {
        self.build_info
            .with_label_values(&[version, profile])
            .set(1.0);
    }
}

/// Metrics describing the telemetry feed and the snapshots it publishes.
#[derive(Clone)]
pub struct FeedMetrics {
    registry: SharedRegistry,
    ticks_total: IntCounter,
    generation_kw: GaugeVec,
    consumption_kw: Gauge,
    storage_level_kwh: Gauge,
    alerts_emitted: IntCounterVec,
}

impl FeedMetrics {
    pub fn new(registry: SharedRegistry) -> Result<Self> {
        let ticks_total = IntCounter::with_opts(Opts::new(
            "reop_feed_ticks_total",
            "Snapshots published by the telemetry feed",
        ))?;
        registry.register(Box::new(ticks_total.clone()))?;

        let generation_kw = GaugeVec::new(
            Opts::new(
                "reop_generation_kw",
                "Instantaneous generation by source in kW",
            ),
            &["source"],
        )?;
        registry.register(Box::new(generation_kw.clone()))?;

        let consumption_kw = Gauge::with_opts(Opts::new(
            "reop_consumption_kw",
            "Instantaneous site demand in kW",
        ))?;
        registry.register(Box::new(consumption_kw.clone()))?;

        let storage_level_kwh = Gauge::with_opts(Opts::new(
            "reop_storage_level_kwh",
            "Battery state of charge in kWh",
        ))?;
        registry.register(Box::new(storage_level_kwh.clone()))?;

        let alerts_emitted = IntCounterVec::new(
            Opts::new(
                "reop_alerts_emitted_total",
                "Alerts attached to published snapshots, by severity",
            ),
            &["severity"],
        )?;
        registry.register(Box::new(alerts_emitted.clone()))?;

        Ok(Self {
            registry,
            ticks_total,
            generation_kw,
            consumption_kw,
            storage_level_kwh,
            alerts_emitted,
        })
    }

    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    /// Update every gauge and counter from a freshly published snapshot.
    pub fn record_snapshot(&self, snapshot: &EnergySnapshot) {
        self.ticks_total.inc();
        self.generation_kw
            .with_label_values(&["solar"])
            .set(snapshot.solar.current);
        self.generation_kw
            .with_label_values(&["wind"])
            .set(snapshot.wind.current);
        self.consumption_kw.set(snapshot.consumption.current);
        self.storage_level_kwh.set(snapshot.storage.current);
        for alert in &snapshot.alerts {
            self.alerts_emitted
                .with_label_values(&[alert.kind.as_str()])
                .inc();
        }
    }
}

/// Metrics describing assistant traffic.
#[derive(Clone)]
pub struct AssistantMetrics {
    registry: SharedRegistry,
    replies_total: IntCounterVec,
}

impl AssistantMetrics {
    pub fn new(registry: SharedRegistry) -> Result<Self> {
        let replies_total = IntCounterVec::new(
            Opts::new(
                "reop_assistant_replies_total",
                "Assistant replies grouped by routed topic",
            ),
            &["topic"],
        )?;
        registry.register(Box::new(replies_total.clone()))?;

        Ok(Self {
            registry,
            replies_total,
        })
    }

    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    pub fn record_reply(&self, topic: &str) {
        self.replies_total.with_label_values(&[topic]).inc();
    }
}

pub use prometheus;
