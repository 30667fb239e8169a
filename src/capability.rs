//! Capability registry — what the room can physically do.
//!
//! Downstream logic never asks "is there a humidifier?"; it asks whether
//! the [`Capability::Humidify`] slot is populated.  The registry is a
//! fixed-size table indexed by the capability discriminant, one row per
//! capability, each row holding a reference count and the device names
//! backing it.  Registration is idempotent: registering the same device
//! twice leaves count and membership unchanged.

use heapless::Vec;
use log::debug;

/// Device names are bounded; the host platform truncates longer ids upstream.
pub type DeviceName = heapless::String<32>;

/// Maximum devices backing a single capability.
pub const MAX_DEVICES_PER_CAP: usize = 4;

// ---------------------------------------------------------------------------
// Capability identity
// ---------------------------------------------------------------------------

/// Enumeration of everything a grow room can be equipped to do.
/// Must stay in sync with the registry table size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Capability {
    Light = 0,
    Exhaust = 1,
    Intake = 2,
    Ventilate = 3,
    Humidify = 4,
    Dehumidify = 5,
    Heat = 6,
    Cool = 7,
    Climate = 8,
    Co2 = 9,
    Pump = 10,
}

impl Capability {
    /// Total number of capabilities — used to size the registry table.
    pub const COUNT: usize = 11;

    /// Convert a table index back to a `Capability`.  Returns `None` on
    /// out-of-range rather than panicking.
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Self::Light),
            1 => Some(Self::Exhaust),
            2 => Some(Self::Intake),
            3 => Some(Self::Ventilate),
            4 => Some(Self::Humidify),
            5 => Some(Self::Dehumidify),
            6 => Some(Self::Heat),
            7 => Some(Self::Cool),
            8 => Some(Self::Climate),
            9 => Some(Self::Co2),
            10 => Some(Self::Pump),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// One row of the registry table.
#[derive(Debug, Default)]
struct CapEntry {
    count: u8,
    devices: Vec<DeviceName, MAX_DEVICES_PER_CAP>,
}

/// Fixed-size capability table for one room.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: [CapEntry; Capability::COUNT],
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `device` as a provider of `cap`.
    ///
    /// Idempotent: a device already present leaves the row untouched.
    /// Returns `true` when the device was newly added.
    pub fn register(&mut self, cap: Capability, device: &str) -> bool {
        let entry = &mut self.entries[cap as usize];
        if entry.devices.iter().any(|d| d.as_str() == device) {
            debug!("registry: {device} already provides {cap:?}");
            return false;
        }
        let Ok(name) = DeviceName::try_from(device) else {
            debug!("registry: device name too long, skipping: {device}");
            return false;
        };
        if entry.devices.push(name).is_err() {
            debug!("registry: {cap:?} provider table full, skipping {device}");
            return false;
        }
        entry.count += 1;
        debug!("registry: {device} provides {cap:?} (count={})", entry.count);
        true
    }

    /// Remove `device` from the providers of `cap`.
    /// Returns `true` when the device was present.
    pub fn unregister(&mut self, cap: Capability, device: &str) -> bool {
        let entry = &mut self.entries[cap as usize];
        let Some(pos) = entry.devices.iter().position(|d| d.as_str() == device) else {
            return false;
        };
        entry.devices.swap_remove(pos);
        entry.count -= 1;
        true
    }

    /// Whether at least one device provides `cap`.
    pub fn is_present(&self, cap: Capability) -> bool {
        self.entries[cap as usize].count > 0
    }

    /// Number of devices providing `cap`.
    pub fn count(&self, cap: Capability) -> u8 {
        self.entries[cap as usize].count
    }

    /// Device names providing `cap`.
    pub fn devices(&self, cap: Capability) -> &[DeviceName] {
        &self.entries[cap as usize].devices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent() {
        let mut reg = CapabilityRegistry::new();
        assert!(reg.register(Capability::Humidify, "humidifier_1"));
        assert!(!reg.register(Capability::Humidify, "humidifier_1"));
        assert!(!reg.register(Capability::Humidify, "humidifier_1"));
        assert_eq!(reg.count(Capability::Humidify), 1);
        assert_eq!(reg.devices(Capability::Humidify).len(), 1);
    }

    #[test]
    fn count_tracks_membership() {
        let mut reg = CapabilityRegistry::new();
        reg.register(Capability::Exhaust, "exhaust_a");
        reg.register(Capability::Exhaust, "exhaust_b");
        assert_eq!(reg.count(Capability::Exhaust), 2);
        assert_eq!(
            usize::from(reg.count(Capability::Exhaust)),
            reg.devices(Capability::Exhaust).len()
        );

        assert!(reg.unregister(Capability::Exhaust, "exhaust_a"));
        assert_eq!(reg.count(Capability::Exhaust), 1);
        assert!(!reg.unregister(Capability::Exhaust, "exhaust_a"));
    }

    #[test]
    fn absent_capability_reports_not_present() {
        let reg = CapabilityRegistry::new();
        assert!(!reg.is_present(Capability::Co2));
        assert_eq!(reg.count(Capability::Co2), 0);
        assert!(reg.devices(Capability::Co2).is_empty());
    }

    #[test]
    fn from_index_roundtrip() {
        for i in 0..Capability::COUNT {
            let cap = Capability::from_index(i).unwrap();
            assert_eq!(cap as usize, i);
        }
        assert!(Capability::from_index(Capability::COUNT).is_none());
    }

    #[test]
    fn provider_table_overflow_is_rejected() {
        let mut reg = CapabilityRegistry::new();
        for i in 0..MAX_DEVICES_PER_CAP {
            let name = format!("fan_{i}");
            assert!(reg.register(Capability::Ventilate, &name));
        }
        assert!(!reg.register(Capability::Ventilate, "fan_overflow"));
        assert_eq!(reg.count(Capability::Ventilate), MAX_DEVICES_PER_CAP as u8);
    }
}
