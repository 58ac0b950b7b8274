//! ---
//! reop_section: "05-networking-external-interfaces"
//! reop_subsection: "binary"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Control CLI for operators interacting with REOP."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use anyhow::{anyhow, Context, Result};
use clap::Args;
use reop_api::{AskRequest, AskResponse, StatusReport, TranscriptResponse};
use reop_telemetry::EnergySnapshot;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::runtime::Runtime;

/// Connection options shared by every API command.
#[derive(Debug, Args)]
pub struct ApiOptions {
    /// Base URL of the daemon's dashboard API.
    #[arg(
        long = "api",
        value_name = "URL",
        env = "REOP_API",
        default_value = "http://127.0.0.1:8080"
    )]
    pub api: String,
}

impl ApiOptions {
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api.trim_end_matches('/'), path)
    }
}

/// Arguments for the `ask` command.
#[derive(Debug, Args)]
pub struct AskArgs {
    #[command(flatten)]
    pub options: ApiOptions,

    /// Question forwarded to the dashboard assistant.
    #[arg(value_name = "QUESTION")]
    pub question: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Render `/api/status` as a human readable summary.
pub fn status(options: &ApiOptions) -> Result<()> {
    let report: StatusReport = fetch(options, "/api/status")?;
    println!("Site: {}", report.site);
    println!("Version: {} ({})", report.version, report.profile);
    println!("Uptime: {}s", report.uptime_seconds);
    println!("Snapshots published: {}", report.snapshots_published);
    match report.last_snapshot_at {
        Some(at) => println!("Last snapshot: {}", at.to_rfc3339()),
        None => println!("Last snapshot: none"),
    }
    if let Some(endpoint) = report.metrics_endpoint {
        println!("Metrics: {endpoint}");
    }
    Ok(())
}

/// Print the latest snapshot exactly as the dashboard receives it.
pub fn snapshot(options: &ApiOptions) -> Result<()> {
    let snapshot: EnergySnapshot = fetch(options, "/api/snapshot")?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Submit one question and print the assistant's reply.
pub fn ask(args: &AskArgs) -> Result<()> {
    let runtime = Runtime::new()?;
    let response: AskResponse = runtime.block_on(async {
        let client = Client::new();
        let response = client
            .post(args.options.endpoint("/api/assistant"))
            .json(&AskRequest {
                message: args.question.clone(),
            })
            .send()
            .await
            .with_context(|| format!("failed to reach {}", args.options.api))?;
        decode(response).await
    })?;
    println!("[{}] {}", response.topic, response.reply.content);
    Ok(())
}

/// Print the retained conversation, greeting first.
pub fn transcript(options: &ApiOptions) -> Result<()> {
    let transcript: TranscriptResponse = fetch(options, "/api/transcript")?;
    for message in transcript.messages {
        println!("{:>4}  {}", message.role.as_str(), message.content);
    }
    Ok(())
}

fn fetch<T: DeserializeOwned>(options: &ApiOptions, path: &str) -> Result<T> {
    let runtime = Runtime::new()?;
    runtime.block_on(async {
        let client = Client::new();
        let response = client
            .get(options.endpoint(path))
            .send()
            .await
            .with_context(|| format!("failed to reach {}", options.api))?;
        decode(response).await
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|body| body.error)
            .unwrap_or(body);
        Err(anyhow!("daemon returned {status}: {detail}"))
    }
}
