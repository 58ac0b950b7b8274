//! ---
//! reop_section: "06-testing-qa"
//! reop_subsection: "integration-tests"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "End-to-end tests for the REOP feed, API, and metrics stack."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use reop_api::{ApiServerBuilder, AskResponse, StatusReport, TranscriptResponse};
use reop_assistant::AssistantSession;
use reop_core::{SnapshotRegister, TelemetryFeed};
use reop_metrics::{new_registry, spawn_http_server, AssistantMetrics, FeedMetrics};
use reop_telemetry::{EnergySnapshot, SiteProfile, TelemetryGenerator};
use serde_json::json;

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().expect("loopback address")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn full_stack_serves_dashboard_traffic() -> Result<()> {
    let registry = new_registry();
    let register = SnapshotRegister::new();
    let generator = TelemetryGenerator::new(SiteProfile::default(), Some(7));
    let feed = TelemetryFeed::new(generator, register.clone(), Duration::from_millis(20))
        .with_metrics(FeedMetrics::new(registry.clone())?)
        .spawn();
    let metrics_server = spawn_http_server(registry.clone(), loopback())?;
    let api = ApiServerBuilder::new(
        loopback(),
        register.clone(),
        AssistantSession::new(Some(7)),
        "integration-site",
    )
    .with_assistant_metrics(AssistantMetrics::new(registry.clone())?)
    .with_metrics_endpoint(format!("http://{}/metrics", metrics_server.addr()))
    .spawn()
    .await?;

    let base = format!("http://{}", api.local_addr());
    let client = reqwest::Client::new();

    // The register is primed before spawn returns, so the snapshot endpoint
    // serves without waiting for a tick.
    let snapshot: EnergySnapshot = client
        .get(format!("{base}/api/snapshot"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert!(snapshot.solar.current >= 0.0);
    assert_eq!(snapshot.storage.capacity, 300.0);

    let status: StatusReport = client
        .get(format!("{base}/api/status"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(status.site, "integration-site");
    assert!(status.snapshots_published >= 1);
    assert!(status.metrics_endpoint.is_some());

    let ask: AskResponse = client
        .post(format!("{base}/api/assistant"))
        .json(&json!({ "message": "how is the battery doing?" }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ask.topic, "storage");
    assert!(ask.reply.content.starts_with("Battery storage is currently at"));

    let transcript: TranscriptResponse = client
        .get(format!("{base}/api/transcript"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(transcript.messages.len(), 3);

    // Let the feed tick a few times before scraping the exporter.
    tokio::time::sleep(Duration::from_millis(80)).await;
    let metrics_text = client
        .get(format!("http://{}/metrics", metrics_server.addr()))
        .send()
        .await?
        .text()
        .await?;
    assert!(metrics_text.contains("reop_feed_ticks_total"));
    assert!(metrics_text.contains("reop_assistant_replies_total"));

    api.shutdown().await?;
    feed.shutdown().await?;
    metrics_server.shutdown().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn api_rejects_questions_until_a_snapshot_exists() -> Result<()> {
    let register = SnapshotRegister::new();
    let api = ApiServerBuilder::new(
        loopback(),
        register.clone(),
        AssistantSession::new(Some(1)),
        "unprimed-site",
    )
    .spawn()
    .await?;

    let base = format!("http://{}", api.local_addr());
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/assistant"))
        .json(&json!({ "message": "status please" }))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 503);

    // Publishing directly into the register unblocks the assistant.
    let mut generator = TelemetryGenerator::new(SiteProfile::default(), Some(1));
    register.publish(generator.snapshot());

    let ask: AskResponse = client
        .post(format!("{base}/api/assistant"))
        .json(&json!({ "message": "any alerts?" }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ask.topic, "alerts");

    api.shutdown().await?;
    Ok(())
}
