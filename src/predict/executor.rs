//! Direct actuation planning — targets in, device adjustments out.
//!
//! Pure comparison logic: the plan is a list of adjustments the service
//! dispatches afterwards.  Dimmable channels use a deadband so hardware is
//! not chased for marginal differences; binary channels use hysteresis so
//! they never chatter around the setpoint.

use heapless::Vec;

use super::targets::Targets;
use crate::config::ControlConfig;
use crate::predict::history::EnvReadings;

/// Upper bound: three dimmable sets plus three binary toggles.
pub const MAX_ADJUSTMENTS: usize = 8;

/// One device adjustment produced by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    SetLight(u8),
    SetExhaust(u8),
    SetIntake(u8),
    Humidifier(bool),
    Dehumidifier(bool),
    Heater(bool),
}

/// Current dimmable levels as last reported or commanded; `None` when a
/// device has never reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentLevels {
    pub light: Option<u8>,
    pub exhaust: Option<u8>,
    pub intake: Option<u8>,
}

/// Compare `targets` against the room and produce the adjustment list.
pub fn plan(
    targets: &Targets,
    readings: &EnvReadings,
    current: &CurrentLevels,
    config: &ControlConfig,
) -> Vec<Adjustment, MAX_ADJUSTMENTS> {
    let mut out: Vec<Adjustment, MAX_ADJUSTMENTS> = Vec::new();
    let deadband = i16::from(config.actuation_deadband);

    let mut dimmable = |target_pct: f32, current: Option<u8>, make: fn(u8) -> Adjustment| {
        let target = target_pct.round().clamp(0.0, 100.0) as u8;
        let outside_deadband = current
            .is_none_or(|cur| (i16::from(target) - i16::from(cur)).abs() > deadband);
        if outside_deadband {
            let _ = out.push(make(target));
        }
    };

    dimmable(targets.light_pct, current.light, Adjustment::SetLight);
    dimmable(targets.exhaust_pct, current.exhaust, Adjustment::SetExhaust);
    dimmable(targets.intake_pct, current.intake, Adjustment::SetIntake);

    // Humidity: act only outside the hysteresis band, and steer both
    // humidifier and dehumidifier so they never fight each other.
    let hum_err = readings.tent_rh - targets.humidity;
    if hum_err < -config.humidity_hysteresis {
        let _ = out.push(Adjustment::Humidifier(true));
        let _ = out.push(Adjustment::Dehumidifier(false));
    } else if hum_err > config.humidity_hysteresis {
        let _ = out.push(Adjustment::Dehumidifier(true));
        let _ = out.push(Adjustment::Humidifier(false));
    }

    // Heater: asymmetric thresholds prevent oscillation around the target.
    let temp_deficit = targets.temp_c - readings.tent_temp_c;
    if temp_deficit > config.heater_on_deficit {
        let _ = out.push(Adjustment::Heater(true));
    } else if -temp_deficit > config.heater_off_surplus {
        let _ = out.push(Adjustment::Heater(false));
    }

    out
}
