//! In-memory state store adapter.
//!
//! Implements [`StorePort`] over plain interior-mutable cells.  Serves the
//! simulation binary and the test suite; a host integration would
//! implement the same trait over its own keyed state store.
//!
//! Sentinel filtering lives here, on the raw ingestion path: the domain
//! core only ever sees typed values.

use core::cell::{Cell, RefCell};

use heapless::Vec;
use log::debug;

use crate::actuator::{ActuatorKind, parse_reading};
use crate::app::ports::StorePort;
use crate::predict::history::EnvReadings;
use crate::stage::PlantStage;

/// Addressable fields of the environment snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingField {
    TentTemp,
    TentHumidity,
    Vpd,
    Co2,
    LightPct,
    AmbientTemp,
    AmbientHumidity,
    OutsideTemp,
    OutsideHumidity,
}

/// [`StorePort`] backed by memory.
///
/// Setters take `&self`; the store is shared read-mostly between the
/// control loop and whatever feeds it.
pub struct MemoryStore {
    readings: Cell<EnvReadings>,
    stage: Cell<PlantStage>,
    bounds: RefCell<Vec<(ActuatorKind, (u8, u8)), 8>>,
    bounds_enabled: Cell<bool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            readings: Cell::new(EnvReadings::default()),
            stage: Cell::new(PlantStage::default()),
            bounds: RefCell::new(Vec::new()),
            bounds_enabled: Cell::new(false),
        }
    }

    pub fn set_readings(&self, readings: EnvReadings) {
        self.readings.set(readings);
    }

    pub fn set_stage(&self, stage: PlantStage) {
        self.stage.set(stage);
    }

    pub fn set_bounds_enabled(&self, enabled: bool) {
        self.bounds_enabled.set(enabled);
    }

    /// Install or replace the operator range for one device class.
    pub fn set_device_bounds(&self, kind: ActuatorKind, range: (u8, u8)) {
        let mut bounds = self.bounds.borrow_mut();
        if let Some(entry) = bounds.iter_mut().find(|(k, _)| *k == kind) {
            entry.1 = range;
            return;
        }
        let _ = bounds.push((kind, range));
    }

    /// Ingest one raw host state string into the snapshot.
    ///
    /// Sentinels ("unavailable", "unknown", ...) and non-numeric strings
    /// leave the previous value in place and return `false`.
    pub fn ingest(&self, field: ReadingField, raw: &str) -> bool {
        let value = match parse_reading(raw) {
            Ok(Some(v)) => v,
            Ok(None) => return false,
            Err(e) => {
                debug!("store: dropping {field:?} update {raw:?} ({e})");
                return false;
            }
        };

        let mut r = self.readings.get();
        match field {
            ReadingField::TentTemp => r.tent_temp_c = value,
            ReadingField::TentHumidity => r.tent_rh = value,
            ReadingField::Vpd => r.vpd_kpa = value,
            ReadingField::Co2 => r.co2_ppm = value,
            ReadingField::LightPct => r.light_pct = value,
            ReadingField::AmbientTemp => r.ambient_temp_c = value,
            ReadingField::AmbientHumidity => r.ambient_rh = value,
            ReadingField::OutsideTemp => r.outside_temp_c = value,
            ReadingField::OutsideHumidity => r.outside_rh = value,
        }
        self.readings.set(r);
        true
    }
}

impl StorePort for MemoryStore {
    fn readings(&self) -> EnvReadings {
        self.readings.get()
    }

    fn plant_stage(&self) -> PlantStage {
        self.stage.get()
    }

    fn device_bounds(&self, kind: ActuatorKind) -> Option<(u8, u8)> {
        self.bounds
            .borrow()
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, range)| *range)
    }

    fn bounds_enabled(&self) -> bool {
        self.bounds_enabled.get()
    }
}
