//! ---
//! reop_section: "01-core-functionality"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Shared primitives and utilities for the REOP runtime."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use std::fmt;

use serde::Serialize;

/// Build metadata reported by the daemon at startup and on the status endpoint.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct VersionInfo {
    /// Workspace package version.
    pub version: &'static str,
    /// Build profile the binary was compiled with.
    pub profile: &'static str,
}

impl VersionInfo {
    /// Capture the metadata baked in at compile time.
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version, self.profile)
    }
}
