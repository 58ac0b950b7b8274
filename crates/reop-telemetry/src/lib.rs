//! ---
//! reop_section: "02-telemetry"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Telemetry model and simulated snapshot generation."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
//! Telemetry domain for the REOP workspace: the wire model consumed by the
//! dashboard and the generator that synthesises plausible microgrid readings
//! on every feed tick.

pub mod generator;
pub mod model;
pub mod profile;

pub use generator::TelemetryGenerator;
pub use model::{
    Alert, AlertSeverity, CarbonSavings, ConsumptionBreakdown, ConsumptionTelemetry,
    EnergySnapshot, GridExchange, SolarTelemetry, StorageTelemetry, WindTelemetry,
};
pub use profile::SiteProfile;
