//! ---
//! reop_section: "01-core-functionality"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Primary runtime wiring for the telemetry feed."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use reop_metrics::FeedMetrics;
use reop_telemetry::generator::TelemetryGenerator;

use crate::register::SnapshotRegister;

/// Periodic publisher that drives the [`SnapshotRegister`].
///
/// The feed owns the generator outright; there is exactly one writer per
/// register and every publish replaces the previous snapshot wholesale.
pub struct TelemetryFeed {
    generator: TelemetryGenerator,
    register: SnapshotRegister,
    interval: Duration,
    metrics: Option<FeedMetrics>,
}

impl TelemetryFeed {
    pub fn new(
        generator: TelemetryGenerator,
        register: SnapshotRegister,
        interval: Duration,
    ) -> Self {
        Self {
            generator,
            register,
            interval,
            metrics: None,
        }
    }

    /// Attach feed metrics updated on every publish.
    pub fn with_metrics(mut self, metrics: FeedMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Publish an initial snapshot, then keep publishing on the configured
    /// cadence until the handle requests shutdown.
    ///
    /// The register is primed synchronously, so readers never observe an
    /// empty slot once `spawn` has returned.
    pub fn spawn(mut self) -> FeedHandle {
        self.publish_once();

        let register = self.register.clone();
        let cadence = self.interval;
        let (shutdown, mut shutdown_rx) = broadcast::channel(1);

        info!(interval_secs = cadence.as_secs_f64(), site = %self.generator.profile().name, "telemetry feed starting");

        let task = tokio::spawn(async move {
            let mut ticker = interval(cadence);
            // The first tick completes immediately and the slot is already
            // primed, so consume it before entering the publish loop.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("telemetry feed shutdown signal received");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.publish_once();
                    }
                }
            }
        });

        FeedHandle {
            register,
            shutdown,
            task,
        }
    }

    fn publish_once(&mut self) {
        let snapshot = self.generator.snapshot();
        if let Some(metrics) = &self.metrics {
            metrics.record_snapshot(&snapshot);
        }
        debug!(
            generation_kw = snapshot.total_generation_kw(),
            consumption_kw = snapshot.consumption.current,
            storage_kwh = snapshot.storage.current,
            alerts = snapshot.alerts.len(),
            "telemetry snapshot published"
        );
        self.register.publish(snapshot);
    }
}

/// Handle to a running feed, used to read and to stop it.
#[derive(Debug)]
pub struct FeedHandle {
    register: SnapshotRegister,
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl FeedHandle {
    /// The register this feed publishes into.
    pub fn register(&self) -> SnapshotRegister {
        self.register.clone()
    }

    /// Signal shutdown and wait for the publish loop to finish.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(()) => Ok(()),
            Err(join) => Err(anyhow::anyhow!(join)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reop_telemetry::profile::SiteProfile;
    use tokio::time::sleep;

    fn feed_with_interval(interval: Duration) -> TelemetryFeed {
        let generator = TelemetryGenerator::new(SiteProfile::default(), Some(42));
        TelemetryFeed::new(generator, SnapshotRegister::new(), interval)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn spawn_primes_the_register() {
        let handle = feed_with_interval(Duration::from_secs(60)).spawn();
        let register = handle.register();

        assert!(register.latest().is_some());
        assert_eq!(register.publish_count(), 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn feed_keeps_publishing_on_cadence() {
        let handle = feed_with_interval(Duration::from_millis(10)).spawn();
        let register = handle.register();

        sleep(Duration::from_millis(80)).await;
        assert!(register.publish_count() >= 3);

        let latest = register.latest().expect("snapshot present");
        assert!(latest.consumption.current >= 0.0);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shutdown_stops_the_publish_loop() {
        let handle = feed_with_interval(Duration::from_millis(10)).spawn();
        let register = handle.register();

        sleep(Duration::from_millis(30)).await;
        handle.shutdown().await.unwrap();

        let count = register.publish_count();
        sleep(Duration::from_millis(40)).await;
        assert_eq!(register.publish_count(), count);
    }
}
