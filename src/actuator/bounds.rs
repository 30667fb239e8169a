//! Bounds enforcement — clamping, midpoint seeding, and the global toggle.
//!
//! Only the four airflow/light kinds react to the global bounds toggle;
//! switch-type devices (humidifier, heater, CO2, pump) are binary and
//! carry no range.  Toggle handling is pure: it mutates the actuator
//! models and returns the list of values that must be pushed to hardware,
//! leaving the async dispatch to the caller.

use heapless::Vec;
use log::info;

use super::{Actuator, ActuatorKind, MAX_ACTUATORS, RunState};
use crate::app::ports::StorePort;

/// Clamp a voltage reading into `bounds`; identity when no bounds are set.
pub fn clamp_voltage(value: f32, bounds: Option<(u8, u8)>) -> f32 {
    match bounds {
        Some((lo, hi)) => value.clamp(f32::from(lo), f32::from(hi)),
        None => value,
    }
}

/// Clamp a duty-cycle reading into `bounds`.  A missing reading falls back
/// to 50 percent before clamping.
pub fn clamp_duty(value: Option<f32>, bounds: Option<(u8, u8)>) -> f32 {
    clamp_voltage(value.unwrap_or(50.0), bounds)
}

/// Step-aligned midpoint of `[lo, hi]`.
///
/// Integer arithmetic throughout: `lo + ((hi-lo)/2/step)*step`.  A step of
/// zero disables alignment and yields the plain mean.
pub fn midpoint(lo: u8, hi: u8, step: u8) -> u8 {
    let span = hi.saturating_sub(lo);
    if step == 0 {
        return lo + span / 2;
    }
    lo + (span / 2 / step) * step
}

/// One hardware push produced by a toggle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsPush {
    /// Index into the room's actuator table.
    pub index: usize,
    pub value: u8,
}

/// Apply the global bounds toggle across the actuator table.
///
/// Enabling re-reads the per-kind ranges from the store, installs them,
/// and re-clamps each device's current value.  Disabling resets lights to
/// the plant-stage light window and fans to a per-device override or the
/// full 0-100 range, re-seeding the step-aligned midpoint.  Either way
/// only devices that are actually running produce a push.
pub fn apply_toggle(
    enabled: bool,
    actuators: &mut [Actuator],
    store: &impl StorePort,
) -> Vec<BoundsPush, MAX_ACTUATORS> {
    let mut pushes: Vec<BoundsPush, MAX_ACTUATORS> = Vec::new();
    let stage = store.plant_stage();

    for (index, act) in actuators.iter_mut().enumerate() {
        if act.kind != ActuatorKind::Light && !act.kind.is_fan() {
            continue;
        }

        let value = if enabled {
            if let Some(range) = store.device_bounds(act.kind) {
                act.set_bounds(Some(range), true);
            } else {
                act.set_bounds(act.bounds(), true);
            }
            let current = act.control_value().or_else(|| act.init_midpoint());
            match current {
                Some(v) => act.set_control_value(v),
                None => continue,
            }
        } else {
            let range = match act.kind {
                ActuatorKind::Light => stage.profile().light_range,
                _ => store.device_bounds(act.kind).unwrap_or((0, 100)),
            };
            act.set_bounds(Some(range), false);
            act.set_control_value(midpoint(range.0, range.1, act.step))
        };

        info!(
            "bounds: {} {} -> {value} (toggle {})",
            act.name,
            if enabled { "clamped" } else { "reset" },
            if enabled { "on" } else { "off" },
        );

        if act.running == RunState::On {
            // Table and push vector share MAX_ACTUATORS capacity.
            let _ = pushes.push(BoundsPush { index, value });
        }
    }

    pushes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::Quirk;
    use crate::adapters::memory_store::MemoryStore;

    #[test]
    fn midpoint_aligns_to_step() {
        assert_eq!(midpoint(20, 80, 10), 50);
        assert_eq!(midpoint(20, 80, 0), 50);
        assert_eq!(midpoint(20, 25, 10), 20, "step larger than half-span");
        assert_eq!(midpoint(20, 25, 0), 22, "plain mean fallback");
        assert_eq!(midpoint(0, 100, 25), 50);
    }

    #[test]
    fn clamp_duty_defaults_missing_reading() {
        assert!((clamp_duty(None, None) - 50.0).abs() < f32::EPSILON);
        assert!((clamp_duty(None, Some((60, 90))) - 60.0).abs() < f32::EPSILON);
        assert!((clamp_duty(Some(75.0), Some((10, 70))) - 70.0).abs() < f32::EPSILON);
    }

    #[test]
    fn clamp_voltage_identity_without_bounds() {
        assert!((clamp_voltage(123.0, None) - 123.0).abs() < f32::EPSILON);
    }

    #[test]
    fn enabling_toggle_pushes_running_devices_only() {
        let store = MemoryStore::new();
        store.set_device_bounds(ActuatorKind::Exhaust, (30, 70));

        let mut acts = [
            {
                let mut a = Actuator::new("exhaust_on", ActuatorKind::Exhaust, true);
                a.running = RunState::On;
                a.set_control_value(90);
                a
            },
            {
                let mut a = Actuator::new("exhaust_off", ActuatorKind::Exhaust, true);
                a.running = RunState::Off;
                a.set_control_value(90);
                a
            },
        ];

        let pushes = apply_toggle(true, &mut acts, &store);
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].index, 0);
        assert_eq!(pushes[0].value, 70, "90 clamped into [30,70]");
        assert_eq!(acts[1].control_value(), Some(70), "model updated even when not pushed");
    }

    #[test]
    fn disabling_toggle_resets_fans_to_full_range_midpoint() {
        let store = MemoryStore::new();
        let mut acts = [{
            let mut a = Actuator::new("intake", ActuatorKind::Intake, true).with_step(5);
            a.running = RunState::On;
            a.set_control_value(33);
            a
        }];

        let pushes = apply_toggle(false, &mut acts, &store);
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].value, midpoint(0, 100, 5));
        assert!(!acts[0].bounds_active());
    }

    #[test]
    fn disabling_toggle_resets_light_to_stage_window() {
        let store = MemoryStore::new();
        // default stage is LateVeg: light window 45-55
        let mut acts = [{
            let mut a = Actuator::new("light", ActuatorKind::Light, true);
            a.running = RunState::On;
            a.set_control_value(100);
            a
        }];

        let pushes = apply_toggle(false, &mut acts, &store);
        assert_eq!(pushes[0].value, midpoint(45, 55, 0));
        assert_eq!(acts[0].bounds(), Some((45, 55)));
    }

    #[test]
    fn switch_devices_ignore_the_toggle() {
        let store = MemoryStore::new();
        let mut acts = [{
            let mut a = Actuator::new("humidifier", ActuatorKind::Humidifier, false)
                .with_quirk(Quirk::Standard);
            a.running = RunState::On;
            a
        }];
        let pushes = apply_toggle(true, &mut acts, &store);
        assert!(pushes.is_empty());
        assert!(acts[0].bounds().is_none());
    }
}
