//! Target calculation — stage profile plus predicted drift.
//!
//! Targets lean against the prediction: when the tent is about to warm,
//! the temperature target is lowered pre-emptively so the executor starts
//! counteracting before the deviation materialises.  Every target is
//! independently clamped to its safe range.

use super::PredictionOutcome;
use crate::predict::history::EnvReadings;
use crate::stage::PlantStage;

/// Fraction of the predicted temperature drift compensated in the target.
const TEMP_COMPENSATION: f32 = 0.7;
/// Fraction of the predicted humidity drift compensated in the target.
const HUM_COMPENSATION: f32 = 0.6;

/// Humidity targets never leave this band regardless of stage or drift.
const HUMIDITY_FLOOR: f32 = 40.0;
const HUMIDITY_CEIL: f32 = 85.0;

/// Exhaust always keeps a minimum air exchange.
const EXHAUST_FLOOR: f32 = 10.0;

/// Intake tracks exhaust at a fixed ratio to keep negative tent pressure.
const INTAKE_RATIO: f32 = 0.85;

/// The setpoints one control cycle aims for.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Targets {
    pub temp_c: f32,
    pub humidity: f32,
    pub light_pct: f32,
    pub exhaust_pct: f32,
    pub intake_pct: f32,
}

/// Compute the cycle targets for `stage` given current readings and the
/// drift prediction.
pub fn compute(stage: PlantStage, readings: &EnvReadings, pred: &PredictionOutcome) -> Targets {
    let profile = stage.profile();

    let temp_c = (profile.temp_midpoint() - TEMP_COMPENSATION * pred.temp_delta)
        .clamp(profile.temp_range.0, profile.temp_range.1);

    let humidity = (profile.humidity_midpoint() - HUM_COMPENSATION * pred.hum_delta)
        .clamp(HUMIDITY_FLOOR, HUMIDITY_CEIL);

    let exhaust_pct = {
        let base = stage.exhaust_baseline()
            + vpd_adjustment(readings.vpd_kpa, stage)
            + ambient_nudge(readings.ambient_temp_c);
        let clamped = base.clamp(EXHAUST_FLOOR, 100.0);
        (clamped + pred.exhaust_preadjust).clamp(EXHAUST_FLOOR, 100.0)
    };

    let intake_pct = exhaust_pct * INTAKE_RATIO;

    let light_pct = {
        let mut light = stage.light_baseline();
        if pred.temp_delta > 1.0 {
            light -= (pred.temp_delta * 8.0).min(20.0);
        }
        light.clamp(0.0, 100.0)
    };

    Targets {
        temp_c,
        humidity,
        light_pct,
        exhaust_pct,
        intake_pct,
    }
}

/// Exhaust correction from the VPD position relative to the stage window.
fn vpd_adjustment(vpd: f32, stage: PlantStage) -> f32 {
    let profile = stage.profile();
    let (_, vpd_max) = profile.vpd_range;
    let target = profile.vpd_target();

    if vpd > vpd_max + 0.2 {
        15.0
    } else if vpd < target - 0.3 {
        -10.0
    } else if vpd > target + 0.1 {
        5.0
    } else {
        0.0
    }
}

/// Exhaust correction from extreme ambient temperature.
fn ambient_nudge(ambient_temp_c: f32) -> f32 {
    if ambient_temp_c > 28.0 {
        5.0
    } else if ambient_temp_c < 15.0 {
        -5.0
    } else {
        0.0
    }
}
