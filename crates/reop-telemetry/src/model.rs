//! ---
//! reop_section: "02-telemetry"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Telemetry model and simulated snapshot generation."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Point-in-time view of the whole microgrid.
///
/// This is the payload published to the dashboard, so the serialized field
/// names follow the dashboard's camelCase contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnergySnapshot {
    /// Moment the snapshot was generated.
    pub timestamp: DateTime<Utc>,
    pub solar: SolarTelemetry,
    pub wind: WindTelemetry,
    pub consumption: ConsumptionTelemetry,
    pub storage: StorageTelemetry,
    pub grid: GridExchange,
    pub carbon_savings: CarbonSavings,
    /// Active alerts, empty when all equipment is nominal.
    pub alerts: Vec<Alert>,
}

impl EnergySnapshot {
    /// Combined solar and wind output in kW.
    pub fn total_generation_kw(&self) -> f64 {
        self.solar.current + self.wind.current
    }

    /// Share of demand covered by on-site generation, as a percentage.
    ///
    /// Returns 0.0 when there is no consumption to avoid dividing by zero.
    /// Deliberately unclamped above 100 when generation exceeds demand.
    pub fn grid_independence_pct(&self) -> f64 {
        if self.consumption.current == 0.0 {
            return 0.0;
        }
        self.total_generation_kw() / self.consumption.current * 100.0
    }
}

/// Solar array output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolarTelemetry {
    /// Instantaneous output in kW.
    pub current: f64,
    /// Nameplate capacity in kW.
    pub capacity: f64,
    /// Hourly production forecast in kW, one entry per hour of day.
    pub forecast_24h: Vec<f64>,
    /// Panel efficiency as a whole-number percentage.
    pub efficiency: f64,
}

/// Wind turbine output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WindTelemetry {
    /// Instantaneous output in kW.
    pub current: f64,
    /// Nameplate capacity in kW.
    pub capacity: f64,
    /// Hourly production forecast in kW, one entry per hour of day.
    pub forecast_24h: Vec<f64>,
    /// Turbine efficiency as a whole-number percentage.
    pub efficiency: f64,
}

/// Site demand and its composition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionTelemetry {
    /// Instantaneous demand in kW.
    pub current: f64,
    /// Hourly demand forecast in kW, one entry per hour of day.
    pub forecast_24h: Vec<f64>,
    pub by_category: ConsumptionBreakdown,
}

/// Demand split across fixed load categories, in kW.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionBreakdown {
    pub hvac: f64,
    pub lighting: f64,
    pub equipment: f64,
    pub other: f64,
}

/// Battery state of charge and flow rates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageTelemetry {
    /// Stored energy in kWh, always within `[0, capacity]`.
    pub current: f64,
    /// Usable capacity in kWh.
    pub capacity: f64,
    /// Inbound power in kW.
    pub charge_rate: f64,
    /// Outbound power in kW.
    pub discharge_rate: f64,
    /// Lifetime charge cycles completed.
    pub cycle_count: u32,
}

impl StorageTelemetry {
    /// State of charge as a percentage of capacity, 0.0 when capacity is unset.
    pub fn percent_full(&self) -> f64 {
        if self.capacity <= 0.0 {
            return 0.0;
        }
        self.current / self.capacity * 100.0
    }

    /// Net power flow into the battery in kW. Negative while discharging.
    pub fn net_rate_kw(&self) -> f64 {
        self.charge_rate - self.discharge_rate
    }

    /// The battery is charging only when inflow strictly exceeds outflow.
    pub fn is_charging(&self) -> bool {
        self.charge_rate > self.discharge_rate
    }
}

/// Power exchanged with the utility grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridExchange {
    /// Power drawn from the grid in kW. Zero while the site over-produces.
    pub import: f64,
    /// Power fed back to the grid in kW. Zero while the site under-produces.
    pub export: f64,
    /// Current tariff in currency units per kWh.
    pub cost: f64,
}

/// Accumulated emission savings in kg CO2.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarbonSavings {
    pub today: f64,
    pub monthly: f64,
    pub yearly: f64,
    /// Lifetime offset since commissioning.
    pub total_offset: f64,
}

/// Operator-facing notification attached to a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Unique id, regenerated for every emission.
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AlertSeverity,
    pub message: String,
    /// When the underlying condition was first observed.
    pub timestamp: DateTime<Utc>,
    /// Whether an operator has acknowledged the alert.
    pub acknowledged: bool,
}

/// Alert severity ladder used by the dashboard for styling and filtering.
///
/// The generator currently only emits `Info` and `Warning`; the remaining
/// levels exist so manually injected or future alerts share the same shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
    Success,
}

impl AlertSeverity {
    /// Stable lowercase name, also used as a metrics label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Error => "error",
            AlertSeverity::Success => "success",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_snapshot() -> EnergySnapshot {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        EnergySnapshot {
            timestamp: now,
            solar: SolarTelemetry {
                current: 150.0,
                capacity: 200.0,
                forecast_24h: vec![0.0; 24],
                efficiency: 82.0,
            },
            wind: WindTelemetry {
                current: 90.0,
                capacity: 150.0,
                forecast_24h: vec![0.0; 24],
                efficiency: 71.0,
            },
            consumption: ConsumptionTelemetry {
                current: 96.0,
                forecast_24h: vec![0.0; 24],
                by_category: ConsumptionBreakdown {
                    hvac: 38.4,
                    lighting: 24.0,
                    equipment: 19.2,
                    other: 14.4,
                },
            },
            storage: StorageTelemetry {
                current: 180.0,
                capacity: 300.0,
                charge_rate: 18.0,
                discharge_rate: 8.0,
                cycle_count: 1247,
            },
            grid: GridExchange {
                import: 0.0,
                export: 144.0,
                cost: 5.1,
            },
            carbon_savings: CarbonSavings {
                today: 48.0,
                monthly: 1300.0,
                yearly: 15200.0,
                total_offset: 88000.0,
            },
            alerts: Vec::new(),
        }
    }

    #[test]
    fn serializes_with_dashboard_field_names() {
        let mut snapshot = sample_snapshot();
        snapshot.alerts.push(Alert {
            id: Uuid::new_v4(),
            kind: AlertSeverity::Warning,
            message: "Wind turbine #2 efficiency below optimal threshold".to_owned(),
            timestamp: snapshot.timestamp,
            acknowledged: false,
        });

        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(value["carbonSavings"]["totalOffset"].is_f64());
        assert!(value["solar"]["forecast24h"].is_array());
        assert!(value["consumption"]["byCategory"]["hvac"].is_f64());
        assert!(value["storage"]["chargeRate"].is_f64());
        assert_eq!(value["alerts"][0]["type"], "warning");
        assert_eq!(value["alerts"][0]["acknowledged"], false);
    }

    #[test]
    fn total_generation_sums_sources() {
        let snapshot = sample_snapshot();
        assert_eq!(snapshot.total_generation_kw(), 240.0);
    }

    #[test]
    fn grid_independence_guards_zero_consumption() {
        let mut snapshot = sample_snapshot();
        snapshot.consumption.current = 0.0;
        assert_eq!(snapshot.grid_independence_pct(), 0.0);

        snapshot.consumption.current = 120.0;
        assert!((snapshot.grid_independence_pct() - 200.0).abs() < 1e-9);
        assert!(snapshot.grid_independence_pct().is_finite());
    }

    #[test]
    fn storage_percent_guards_zero_capacity() {
        let mut storage = sample_snapshot().storage;
        assert!((storage.percent_full() - 60.0).abs() < 1e-9);

        storage.capacity = 0.0;
        assert_eq!(storage.percent_full(), 0.0);
    }

    #[test]
    fn equal_flow_rates_count_as_discharging() {
        let mut storage = sample_snapshot().storage;
        storage.charge_rate = 10.0;
        storage.discharge_rate = 10.0;
        assert!(!storage.is_charging());
        assert_eq!(storage.net_rate_kw(), 0.0);
    }
}
