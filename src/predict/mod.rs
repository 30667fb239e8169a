//! Predictive controller — look-ahead drift estimation for the tent.
//!
//! ```text
//!  store readings ──▶ SensorHistory ──▶ GradientSet
//!                                          │
//!                                          ▼
//!                                   PredictionOutcome ──▶ Targets ──▶ plan
//!                                          ▲
//!                       AdaptiveLearner ───┘ (tunes ambient-tent inertia)
//! ```
//!
//! The chain outside→ambient→tent is modelled as two damped couplings.
//! Outside drift reaches the ambient room scaled by a fixed inertia; the
//! ambient change reaches the tent scaled by the transfer fraction and a
//! second inertia the learner tunes at runtime.  The tent's own short-term
//! trend is added on top over the prediction horizon.

pub mod executor;
pub mod gradient;
pub mod history;
pub mod learner;
pub mod targets;
pub mod task;

use gradient::GradientSet;
use history::{EnvSample, SensorHistory};
use learner::{AdaptiveLearner, CycleRecord};

use crate::config::ControlConfig;

/// Exhaust pre-adjust engages outside this predicted-drift deadzone.
const PREADJUST_DEADZONE: f32 = 0.5;
/// Gain and cap when pre-accelerating against warming.
const PREADJUST_UP_GAIN: f32 = 5.0;
const PREADJUST_UP_CAP: f32 = 15.0;
/// Gain and floor when pre-slowing against cooling.
const PREADJUST_DOWN_GAIN: f32 = 3.0;
const PREADJUST_DOWN_FLOOR: f32 = -10.0;

/// Predicted tent drift over the configured horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PredictionOutcome {
    /// Expected tent temperature change (degrees C).
    pub temp_delta: f32,
    /// Expected tent humidity change (percentage points).
    pub hum_delta: f32,
    /// Exhaust speed correction derived from `temp_delta` (points).
    pub exhaust_preadjust: f32,
}

/// History, gradients, prediction, and the learned inertia for one room.
#[derive(Debug)]
pub struct PredictiveController {
    history: SensorHistory,
    learner: AdaptiveLearner,
    ambient_tent_inertia: f32,
}

impl PredictiveController {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            history: SensorHistory::new(),
            learner: AdaptiveLearner::new(),
            ambient_tent_inertia: config.ambient_tent_inertia,
        }
    }

    /// Append one layered snapshot to the history.
    pub fn observe(&mut self, sample: EnvSample) {
        self.history.push(sample);
    }

    pub fn history(&self) -> &SensorHistory {
        &self.history
    }

    /// Current (possibly learner-tuned) ambient-to-tent inertia.
    pub fn ambient_tent_inertia(&self) -> f32 {
        self.ambient_tent_inertia
    }

    /// Gradients over the buffered history.
    pub fn gradients(&self) -> GradientSet {
        gradient::compute(&self.history)
    }

    /// Project tent drift over the configured horizon.
    pub fn predict(&self, grads: &GradientSet, config: &ControlConfig) -> PredictionOutcome {
        let horizon_h = f32::from(config.prediction_horizon_mins) / 60.0;

        let ambient_temp_delta = grads.outside_to_ambient_temp * config.outside_inertia * horizon_h;
        let ambient_hum_delta = grads.outside_to_ambient_hum * config.outside_inertia * horizon_h;

        let temp_delta = ambient_temp_delta * config.temp_transfer * self.ambient_tent_inertia
            + grads.temp_trend * horizon_h;
        let hum_delta = ambient_hum_delta * config.hum_transfer * self.ambient_tent_inertia
            + grads.hum_trend * horizon_h;

        PredictionOutcome {
            temp_delta,
            hum_delta,
            exhaust_preadjust: exhaust_preadjust(temp_delta),
        }
    }

    /// Journal a completed cycle for the learner.
    pub fn record_cycle(&mut self, record: CycleRecord) {
        self.learner.record(record);
    }

    /// Let the learner retune the inertia.  Returns `(old, new)` when the
    /// value moved.
    pub fn retune(&mut self) -> Option<(f32, f32)> {
        let old = self.ambient_tent_inertia;
        let new = self.learner.tuned_inertia(self.history.len(), old);
        if (new - old).abs() < f32::EPSILON {
            return None;
        }
        self.ambient_tent_inertia = new;
        Some((old, new))
    }
}

/// Exhaust correction from the predicted temperature drift.
fn exhaust_preadjust(temp_delta: f32) -> f32 {
    if temp_delta > PREADJUST_DEADZONE {
        (temp_delta * PREADJUST_UP_GAIN).min(PREADJUST_UP_CAP)
    } else if temp_delta < -PREADJUST_DEADZONE {
        (temp_delta * PREADJUST_DOWN_GAIN).max(PREADJUST_DOWN_FLOOR)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use history::EnvReadings;

    fn controller() -> PredictiveController {
        PredictiveController::new(&ControlConfig::default())
    }

    #[test]
    fn preadjust_deadzone_and_asymmetry() {
        assert!((exhaust_preadjust(0.3)).abs() < f32::EPSILON);
        assert!((exhaust_preadjust(-0.3)).abs() < f32::EPSILON);
        assert!((exhaust_preadjust(1.0) - 5.0).abs() < 0.001);
        assert!((exhaust_preadjust(10.0) - PREADJUST_UP_CAP).abs() < 0.001);
        assert!((exhaust_preadjust(-1.0) + 3.0).abs() < 0.001);
        assert!((exhaust_preadjust(-10.0) - PREADJUST_DOWN_FLOOR).abs() < 0.001);
    }

    #[test]
    fn empty_history_predicts_no_drift() {
        let c = controller();
        let pred = c.predict(&c.gradients(), &ControlConfig::default());
        assert_eq!(pred, PredictionOutcome::default());
    }

    #[test]
    fn warming_outside_predicts_positive_drift_and_preadjust() {
        let mut c = controller();
        let config = ControlConfig::default();

        // Outside far above ambient and the tent itself ramping up.
        for i in 0..10u64 {
            c.observe(EnvSample {
                at_ms: i * 30_000,
                readings: EnvReadings {
                    tent_temp_c: 24.0 + i as f32 * 0.2,
                    ambient_temp_c: 27.0,
                    outside_temp_c: 38.0,
                    ..Default::default()
                },
            });
        }

        let pred = c.predict(&c.gradients(), &config);
        assert!(pred.temp_delta > 0.0);
        assert!(pred.exhaust_preadjust > 0.0);
        assert!(pred.exhaust_preadjust <= PREADJUST_UP_CAP);
    }

    #[test]
    fn retune_reports_the_transition() {
        let mut c = controller();
        let strong = GradientSet {
            ambient_to_tent_temp: 5.0,
            ..Default::default()
        };
        for i in 0..learner::MIN_EVIDENCE as u64 {
            c.observe(EnvSample {
                at_ms: i * 30_000,
                readings: EnvReadings::default(),
            });
            c.record_cycle(CycleRecord {
                at_ms: i * 30_000,
                readings: EnvReadings::default(),
                targets: targets::Targets::default(),
                prediction: PredictionOutcome::default(),
                gradients: strong,
            });
        }

        let change = c.retune().expect("inertia should move");
        assert!((change.0 - 0.5).abs() < 0.001);
        assert!((change.1 - 0.55).abs() < 0.001);
        assert!((c.ambient_tent_inertia() - 0.55).abs() < 0.001);
    }

    #[test]
    fn retune_without_evidence_is_a_no_op() {
        let mut c = controller();
        assert!(c.retune().is_none());
        assert!((c.ambient_tent_inertia() - 0.5).abs() < f32::EPSILON);
    }
}
