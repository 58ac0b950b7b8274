//! ---
//! reop_section: "01-core-functionality"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Primary runtime wiring for the telemetry feed."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use reop_telemetry::model::EnergySnapshot;

/// Single-slot store for the most recent [`EnergySnapshot`].
///
/// One writer (the feed) replaces the slot wholesale; any number of readers
/// clone the current value out. Readers either see the previous snapshot or
/// the new one, never a partial update, and the register keeps no history.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRegister {
    inner: Arc<RegisterInner>,
}

#[derive(Debug, Default)]
struct RegisterInner {
    slot: RwLock<Option<EnergySnapshot>>,
    publishes: AtomicU64,
}

impl SnapshotRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored snapshot with `snapshot`.
    pub fn publish(&self, snapshot: EnergySnapshot) {
        *self.inner.slot.write() = Some(snapshot);
        self.inner.publishes.fetch_add(1, Ordering::Relaxed);
    }

    /// Clone out the latest snapshot, if one has been published yet.
    pub fn latest(&self) -> Option<EnergySnapshot> {
        self.inner.slot.read().clone()
    }

    /// Number of snapshots published since startup.
    pub fn publish_count(&self) -> u64 {
        self.inner.publishes.load(Ordering::Relaxed)
    }
}
