//! ---
//! reop_section: "01-core-functionality"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Primary runtime wiring for the telemetry feed."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
//! Runtime core of the REOP daemon: the single-slot register holding the
//! latest snapshot and the background feed that refreshes it.

pub mod feed;
pub mod register;

pub use feed::{FeedHandle, TelemetryFeed};
pub use register::SnapshotRegister;
