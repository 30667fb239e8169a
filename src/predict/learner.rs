//! Adaptive learner — slow feedback on the ambient-to-tent coupling.
//!
//! Every cycle's observation is appended to a bounded journal.  Once
//! enough evidence has accumulated, the learner nudges the
//! ambient-to-tent inertia one small step per cycle: a strongly coupled
//! room (heat pours in) earns more damping, a well-isolated room less.
//! The walk is clamped to a conservative band so a burst of odd readings
//! can never run the parameter to an extreme.

use heapless::Deque;

use super::PredictionOutcome;
use super::gradient::GradientSet;
use super::targets::Targets;
use crate::predict::history::EnvReadings;

/// Cycle records retained.
pub const LEARN_CAPACITY: usize = 100;

/// Evidence required before tuning starts: this many cycle records and
/// this many buffered sensor samples.
pub const MIN_EVIDENCE: usize = 10;

/// Gradients averaged per tuning decision.
const AVG_WINDOW: usize = 10;

/// Inertia walk parameters.
const STEP: f32 = 0.05;
const INERTIA_MIN: f32 = 0.3;
const INERTIA_MAX: f32 = 0.8;

/// Coupling thresholds, units per hour.
const STRONG_COUPLING: f32 = 2.0;
const WEAK_COUPLING: f32 = 0.5;

/// Everything one control cycle observed and decided.
#[derive(Debug, Clone, Copy)]
pub struct CycleRecord {
    pub at_ms: u64,
    pub readings: EnvReadings,
    pub targets: Targets,
    pub prediction: PredictionOutcome,
    pub gradients: GradientSet,
}

/// Bounded journal of cycle records plus the tuning rule.
#[derive(Debug, Default)]
pub struct AdaptiveLearner {
    records: Deque<CycleRecord, LEARN_CAPACITY>,
}

impl AdaptiveLearner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cycle record, evicting the oldest at capacity.
    pub fn record(&mut self, record: CycleRecord) {
        if self.records.is_full() {
            let _ = self.records.pop_front();
        }
        let _ = self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compute the next ambient-to-tent inertia value.
    ///
    /// Returns `current` unchanged until both evidence thresholds are met.
    /// One call moves the value at most one step.
    pub fn tuned_inertia(&self, history_len: usize, current: f32) -> f32 {
        if self.records.len() < MIN_EVIDENCE || history_len < MIN_EVIDENCE {
            return current;
        }

        let skip = self.records.len().saturating_sub(AVG_WINDOW);
        let mut sum = 0.0f32;
        let mut n = 0usize;
        for rec in self.records.iter().skip(skip) {
            sum += rec.gradients.ambient_to_tent_temp;
            n += 1;
        }
        let avg = sum / n as f32;

        if avg > STRONG_COUPLING {
            (current + STEP).min(INERTIA_MAX)
        } else if avg < WEAK_COUPLING {
            (current - STEP).max(INERTIA_MIN)
        } else {
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_coupling(ambient_to_tent_temp: f32) -> CycleRecord {
        CycleRecord {
            at_ms: 0,
            readings: EnvReadings::default(),
            targets: Targets::default(),
            prediction: PredictionOutcome::default(),
            gradients: GradientSet {
                ambient_to_tent_temp,
                ..Default::default()
            },
        }
    }

    fn learner_with(coupling: f32, n: usize) -> AdaptiveLearner {
        let mut l = AdaptiveLearner::new();
        for _ in 0..n {
            l.record(record_with_coupling(coupling));
        }
        l
    }

    #[test]
    fn no_tuning_below_evidence_thresholds() {
        let l = learner_with(5.0, MIN_EVIDENCE - 1);
        assert!((l.tuned_inertia(20, 0.5) - 0.5).abs() < f32::EPSILON);

        let l = learner_with(5.0, MIN_EVIDENCE);
        assert!((l.tuned_inertia(MIN_EVIDENCE - 1, 0.5) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn strong_coupling_steps_inertia_up() {
        let l = learner_with(3.0, MIN_EVIDENCE);
        assert!((l.tuned_inertia(20, 0.5) - 0.55).abs() < 0.001);
    }

    #[test]
    fn weak_coupling_steps_inertia_down() {
        let l = learner_with(0.1, MIN_EVIDENCE);
        assert!((l.tuned_inertia(20, 0.5) - 0.45).abs() < 0.001);
    }

    #[test]
    fn moderate_coupling_leaves_inertia_alone() {
        let l = learner_with(1.0, MIN_EVIDENCE);
        assert!((l.tuned_inertia(20, 0.5) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn walk_is_clamped_to_band() {
        let strong = learner_with(10.0, MIN_EVIDENCE);
        assert!((strong.tuned_inertia(20, 0.79) - INERTIA_MAX).abs() < 0.001);
        assert!((strong.tuned_inertia(20, INERTIA_MAX) - INERTIA_MAX).abs() < f32::EPSILON);

        let weak = learner_with(0.0, MIN_EVIDENCE);
        assert!((weak.tuned_inertia(20, 0.31) - INERTIA_MIN).abs() < 0.001);
    }

    #[test]
    fn average_uses_only_the_recent_window() {
        // Old strong-coupling records must be outweighed by a full window
        // of recent weak ones.
        let mut l = AdaptiveLearner::new();
        for _ in 0..AVG_WINDOW {
            l.record(record_with_coupling(10.0));
        }
        for _ in 0..AVG_WINDOW {
            l.record(record_with_coupling(0.0));
        }
        assert!((l.tuned_inertia(20, 0.5) - 0.45).abs() < 0.001);
    }

    #[test]
    fn journal_evicts_at_capacity() {
        let l = learner_with(1.0, LEARN_CAPACITY + 10);
        assert_eq!(l.len(), LEARN_CAPACITY);
    }
}
