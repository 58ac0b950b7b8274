//! ---
//! reop_section: "01-core-functionality"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Shared primitives and utilities for the REOP runtime."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_site_name() -> String {
    "microgrid".to_owned()
}

fn default_solar_capacity_kw() -> f64 {
    200.0
}

fn default_wind_capacity_kw() -> f64 {
    150.0
}

fn default_storage_capacity_kwh() -> f64 {
    300.0
}

fn default_base_load_kw() -> f64 {
    80.0
}

fn default_feed_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_listen() -> SocketAddr {
    "0.0.0.0:9898"
        .parse()
        .expect("valid default metrics address")
}

fn default_api_enabled() -> bool {
    true
}

fn default_api_listen() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default api address")
}

/// Primary configuration object for the REOP runtime.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "REOP_CONFIG";

    /// Load configuration from disk, resolving the source path like
    /// [`AppConfig::load_with_source`].
    pub fn load<P: AsRef<Path>>(explicit: Option<&Path>, candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(explicit, candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    ///
    /// An explicitly requested path (the daemon's `--config` flag) always
    /// wins and must exist. Without one, `REOP_CONFIG` is consulted, then the
    /// candidate list is scanned for the first existing file.
    pub fn load_with_source<P: AsRef<Path>>(
        explicit: Option<&Path>,
        candidates: &[P],
    ) -> Result<LoadedAppConfig> {
        if let Some(path) = explicit {
            let path = path.to_path_buf();
            let config = Self::from_path(path.clone())?;
            return Ok(LoadedAppConfig {
                config,
                source: path,
            });
        }

        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.site.validate()?;
        self.feed.validate()?;
        self.api.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Physical parameters of the site the telemetry feed models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Human readable site identifier, surfaced in logs and the status endpoint.
    #[serde(default = "default_site_name")]
    pub name: String,
    /// Nameplate solar capacity in kW.
    #[serde(default = "default_solar_capacity_kw")]
    pub solar_capacity_kw: f64,
    /// Nameplate wind capacity in kW.
    #[serde(default = "default_wind_capacity_kw")]
    pub wind_capacity_kw: f64,
    /// Battery capacity in kWh.
    #[serde(default = "default_storage_capacity_kwh")]
    pub storage_capacity_kwh: f64,
    /// Baseline consumption in kW around which demand oscillates.
    #[serde(default = "default_base_load_kw")]
    pub base_load_kw: f64,
}

impl SiteConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.solar_capacity_kw.is_finite() && self.solar_capacity_kw > 0.0) {
            return Err(anyhow!("site solar_capacity_kw must be positive"));
        }
        if !(self.wind_capacity_kw.is_finite() && self.wind_capacity_kw > 0.0) {
            return Err(anyhow!("site wind_capacity_kw must be positive"));
        }
        if !(self.storage_capacity_kwh.is_finite() && self.storage_capacity_kwh > 0.0) {
            return Err(anyhow!("site storage_capacity_kwh must be positive"));
        }
        if !(self.base_load_kw.is_finite() && self.base_load_kw >= 0.0) {
            return Err(anyhow!("site base_load_kw must be zero or positive"));
        }
        Ok(())
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            solar_capacity_kw: default_solar_capacity_kw(),
            wind_capacity_kw: default_wind_capacity_kw(),
            storage_capacity_kwh: default_storage_capacity_kwh(),
            base_load_kw: default_base_load_kw(),
        }
    }
}

/// Cadence and seeding of the telemetry feed.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Interval between published snapshots.
    #[serde(default = "default_feed_interval")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub interval: Duration,
    /// Fixed RNG seed for reproducible runs. Entropy-seeded when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl FeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(anyhow!("feed interval must be at least one second"));
        }
        Ok(())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval: default_feed_interval(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_listen")]
    pub listen: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            listen: default_metrics_listen(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_enabled")]
    pub enabled: bool,
    #[serde(default = "default_api_listen")]
    pub listen: SocketAddr,
    /// Optional directory of dashboard assets served at `/`.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: default_api_enabled(),
            listen: default_api_listen(),
            static_dir: None,
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.enabled {
            if let Some(dir) = &self.static_dir {
                if !dir.is_dir() {
                    return Err(anyhow!(
                        "api static_dir {} does not exist or is not a directory",
                        dir.display()
                    ));
                }
            }
        }
        Ok(())
    }
}
