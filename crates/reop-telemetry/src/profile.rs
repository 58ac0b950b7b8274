//! ---
//! reop_section: "02-telemetry"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Telemetry model and simulated snapshot generation."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use reop_common::config::SiteConfig;

/// Physical parameters the generator models a site against.
///
/// Decoupled from [`SiteConfig`] so the generator can be driven directly in
/// tests without assembling a full configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteProfile {
    /// Site identifier carried into logs.
    pub name: String,
    /// Nameplate solar capacity in kW.
    pub solar_capacity_kw: f64,
    /// Nameplate wind capacity in kW.
    pub wind_capacity_kw: f64,
    /// Battery capacity in kWh.
    pub storage_capacity_kwh: f64,
    /// Baseline demand in kW the consumption curve oscillates around.
    pub base_load_kw: f64,
}

impl SiteProfile {
    pub fn from_config(site: &SiteConfig) -> Self {
        Self {
            name: site.name.clone(),
            solar_capacity_kw: site.solar_capacity_kw,
            wind_capacity_kw: site.wind_capacity_kw,
            storage_capacity_kwh: site.storage_capacity_kwh,
            base_load_kw: site.base_load_kw,
        }
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::from_config(&SiteConfig::default())
    }
}
