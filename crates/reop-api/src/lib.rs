//! ---
//! reop_section: "05-networking-external-interfaces"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Dashboard HTTP API for telemetry and the assistant."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
//! HTTP surface of the daemon: read-only telemetry endpoints, the assistant
//! exchange endpoint, and optional static hosting of the dashboard bundle.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use reop_assistant::session::AssistantSession;
use reop_assistant::transcript::ChatMessage;
use reop_common::version::VersionInfo;
use reop_core::register::SnapshotRegister;
use reop_metrics::AssistantMetrics;
use reop_telemetry::model::EnergySnapshot;

/// Health and provenance summary returned by `/api/status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusReport {
    /// Configured site name.
    pub site: String,
    /// Workspace package version of the running daemon.
    pub version: String,
    /// Build profile of the running daemon.
    pub profile: String,
    /// Seconds since the API server started.
    pub uptime_seconds: u64,
    /// Snapshots published into the register since startup.
    pub snapshots_published: u64,
    /// Timestamp of the latest published snapshot, if any.
    pub last_snapshot_at: Option<DateTime<Utc>>,
    /// Optional URL pointing to the metrics endpoint.
    pub metrics_endpoint: Option<String>,
}

/// Request body for `/api/assistant`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// The operator's question, interpolated verbatim into fallback replies.
    pub message: String,
}

/// Response body for `/api/assistant`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// The assistant's side of the exchange.
    pub reply: ChatMessage,
    /// Topic label the question was routed to.
    pub topic: String,
}

/// Response body for `/api/transcript`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResponse {
    /// Conversation so far, greeting first.
    pub messages: Vec<ChatMessage>,
}

/// Errors surfaced to API clients as structured JSON.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The feed has not published a snapshot yet.
    #[error("no telemetry snapshot published yet")]
    SnapshotPending,
    /// The assistant request carried an empty or whitespace-only message.
    #[error("assistant request message must not be empty")]
    EmptyQuestion,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::SnapshotPending => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::EmptyQuestion => StatusCode::BAD_REQUEST,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Shared state injected into the axum handlers.
struct ApiState {
    register: SnapshotRegister,
    assistant: Mutex<AssistantSession>,
    assistant_metrics: Option<AssistantMetrics>,
    site: String,
    version: VersionInfo,
    metrics_endpoint: Option<String>,
    started_at: Instant,
}

/// Builder used to configure and spawn the dashboard API server.
pub struct ApiServerBuilder {
    listen: SocketAddr,
    register: SnapshotRegister,
    session: AssistantSession,
    site: String,
    static_dir: Option<PathBuf>,
    assistant_metrics: Option<AssistantMetrics>,
    metrics_endpoint: Option<String>,
}

impl ApiServerBuilder {
    /// Construct a new builder from mandatory components.
    pub fn new(
        listen: SocketAddr,
        register: SnapshotRegister,
        session: AssistantSession,
        site: impl Into<String>,
    ) -> Self {
        Self {
            listen,
            register,
            session,
            site: site.into(),
            static_dir: None,
            assistant_metrics: None,
            metrics_endpoint: None,
        }
    }

    /// Serve the dashboard bundle from `dir` for any non-API path.
    pub fn with_static_dir(mut self, dir: PathBuf) -> Self {
        self.static_dir = Some(dir);
        self
    }

    /// Count assistant replies by topic on the supplied metrics.
    pub fn with_assistant_metrics(mut self, metrics: AssistantMetrics) -> Self {
        self.assistant_metrics = Some(metrics);
        self
    }

    /// Advertise the metrics exporter location on the status endpoint.
    pub fn with_metrics_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.metrics_endpoint = Some(endpoint.into());
        self
    }

    /// Spawn the API server and return a handle that can be awaited for shutdown.
    pub async fn spawn(self) -> anyhow::Result<ApiServerHandle> {
        let listener = TcpListener::bind(self.listen).await?;
        let local_addr = listener.local_addr()?;
        info!(address = %local_addr, site = %self.site, "dashboard api listening");

        let state = Arc::new(ApiState {
            register: self.register,
            assistant: Mutex::new(self.session),
            assistant_metrics: self.assistant_metrics,
            site: self.site,
            version: VersionInfo::current(),
            metrics_endpoint: self.metrics_endpoint,
            started_at: Instant::now(),
        });

        let router = Router::new()
            .route("/api/status", get(get_status))
            .route("/api/snapshot", get(get_snapshot))
            .route("/api/transcript", get(get_transcript))
            .route("/api/assistant", post(post_assistant))
            .with_state(state);
        let router = match self.static_dir {
            Some(dir) => router.fallback_service(ServeDir::new(dir)),
            None => router,
        };
        let router = router.layer(TraceLayer::new_for_http());

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let server = axum::serve(listener, router).with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        });
        let task = tokio::spawn(async move {
            if let Err(err) = server.await {
                warn!(error = %err, "dashboard api server exited with error");
            }
        });

        Ok(ApiServerHandle {
            address: local_addr,
            task,
            shutdown: shutdown_tx,
        })
    }
}

/// Handle returned from [`ApiServerBuilder::spawn`] allowing the caller to await server completion.
pub struct ApiServerHandle {
    address: SocketAddr,
    task: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl ApiServerHandle {
    /// Retrieve the socket address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.address
    }

    /// Request graceful shutdown and wait for the server task to finish.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(()) => Ok(()),
            Err(join) => Err(anyhow::anyhow!(join)),
        }
    }
}

async fn get_status(State(state): State<Arc<ApiState>>) -> Json<StatusReport> {
    let last_snapshot_at = state.register.latest().map(|snapshot| snapshot.timestamp);
    Json(StatusReport {
        site: state.site.clone(),
        version: state.version.version.to_owned(),
        profile: state.version.profile.to_owned(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        snapshots_published: state.register.publish_count(),
        last_snapshot_at,
        metrics_endpoint: state.metrics_endpoint.clone(),
    })
}

async fn get_snapshot(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<EnergySnapshot>, ApiError> {
    state
        .register
        .latest()
        .map(Json)
        .ok_or(ApiError::SnapshotPending)
}

async fn get_transcript(State(state): State<Arc<ApiState>>) -> Json<TranscriptResponse> {
    let messages = state.assistant.lock().transcript();
    Json(TranscriptResponse { messages })
}

async fn post_assistant(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::EmptyQuestion);
    }
    let Some(snapshot) = state.register.latest() else {
        return Err(ApiError::SnapshotPending);
    };

    let exchange = state.assistant.lock().ask(&request.message, &snapshot);
    if let Some(metrics) = &state.assistant_metrics {
        metrics.record_reply(exchange.topic);
    }
    info!(topic = exchange.topic, "assistant reply generated");

    Ok(Json(AskResponse {
        reply: exchange.reply,
        topic: exchange.topic.to_owned(),
    }))
}
