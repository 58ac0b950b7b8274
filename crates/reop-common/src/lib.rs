//! ---
//! reop_section: "01-core-functionality"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Shared primitives and utilities for the REOP runtime."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
//! Core shared primitives for the REOP workspace.
//! This crate exposes configuration loading, logging, and version
//! metadata utilities consumed across the workspace.

pub mod config;
pub mod logging;
pub mod version;

pub use config::{
    ApiConfig, AppConfig, FeedConfig, LoadedAppConfig, LoggingConfig, MetricsConfig, SiteConfig,
};
pub use logging::{init_tracing, LogFormat};
pub use version::VersionInfo;
