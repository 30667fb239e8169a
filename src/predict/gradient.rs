//! Gradient computation over the sensor history.
//!
//! Two families of rates, all in units per hour:
//!
//! - **layer gradients** — how strongly one environmental layer pulls on
//!   the next (outside vs ambient, ambient vs tent), taken from the most
//!   recent sample and divided by the wall-clock span of the buffer
//! - **tent trends** — short-term rate of change of the tent itself,
//!   averaged over the last few consecutive sample pairs

use super::history::SensorHistory;

/// Consecutive sample pairs averaged into the tent trend.
const TREND_PAIRS: usize = 3;

/// Fallback span when two samples carry the same timestamp.
const MIN_SPAN_HOURS: f32 = 0.5;

const MS_PER_HOUR: f32 = 3_600_000.0;

/// Rates of change across the environmental layers, units per hour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradientSet {
    pub outside_to_ambient_temp: f32,
    pub outside_to_ambient_hum: f32,
    pub ambient_to_tent_temp: f32,
    pub ambient_to_tent_hum: f32,
    pub temp_trend: f32,
    pub hum_trend: f32,
}

fn span_hours(from_ms: u64, to_ms: u64) -> f32 {
    let hours = to_ms.saturating_sub(from_ms) as f32 / MS_PER_HOUR;
    if hours > 0.0 { hours } else { MIN_SPAN_HOURS }
}

/// Compute the gradient set from the buffered history.
///
/// With fewer than two samples there is nothing to differentiate and the
/// result is all zeros; downstream prediction then degrades to baseline
/// targets instead of guessing.
pub fn compute(history: &SensorHistory) -> GradientSet {
    let (Some(oldest), Some(newest)) = (history.oldest(), history.newest()) else {
        return GradientSet::default();
    };
    if history.len() < 2 {
        return GradientSet::default();
    }

    let hours = span_hours(oldest.at_ms, newest.at_ms);
    let r = &newest.readings;

    GradientSet {
        outside_to_ambient_temp: (r.outside_temp_c - r.ambient_temp_c) / hours,
        outside_to_ambient_hum: (r.outside_rh - r.ambient_rh) / hours,
        ambient_to_tent_temp: (r.ambient_temp_c - r.tent_temp_c) / hours,
        ambient_to_tent_hum: (r.ambient_rh - r.tent_rh) / hours,
        temp_trend: trend(history, |s| s.tent_temp_c),
        hum_trend: trend(history, |s| s.tent_rh),
    }
}

/// Average rate of change over up to the last `TREND_PAIRS` consecutive
/// sample pairs.
fn trend(history: &SensorHistory, field: impl Fn(&super::history::EnvReadings) -> f32) -> f32 {
    let mut rates = [0.0f32; TREND_PAIRS];
    let mut count = 0usize;
    let mut prev: Option<(u64, f32)> = None;

    for sample in history.last_n(TREND_PAIRS + 1) {
        let value = field(&sample.readings);
        if let Some((prev_ms, prev_value)) = prev {
            rates[count] = (value - prev_value) / span_hours(prev_ms, sample.at_ms);
            count += 1;
        }
        prev = Some((sample.at_ms, value));
    }

    if count == 0 {
        return 0.0;
    }
    rates[..count].iter().sum::<f32>() / count as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::history::{EnvReadings, EnvSample};

    fn push(h: &mut SensorHistory, at_ms: u64, readings: EnvReadings) {
        h.push(EnvSample { at_ms, readings });
    }

    #[test]
    fn fewer_than_two_samples_yields_zeros() {
        let mut h = SensorHistory::new();
        assert_eq!(compute(&h), GradientSet::default());

        push(&mut h, 0, EnvReadings { tent_temp_c: 25.0, ..Default::default() });
        assert_eq!(compute(&h), GradientSet::default());
    }

    #[test]
    fn warmer_outside_gives_positive_outside_gradient() {
        let mut h = SensorHistory::new();
        let base = EnvReadings {
            tent_temp_c: 24.0,
            ambient_temp_c: 26.0,
            outside_temp_c: 32.0,
            ..Default::default()
        };
        push(&mut h, 0, base);
        push(&mut h, 30 * 60 * 1000, base); // half an hour later

        let g = compute(&h);
        // (32 - 26) / 0.5h = 12 units/h
        assert!((g.outside_to_ambient_temp - 12.0).abs() < 0.01);
        assert!((g.ambient_to_tent_temp - 4.0).abs() < 0.01);
    }

    #[test]
    fn zero_span_falls_back_to_half_hour() {
        let mut h = SensorHistory::new();
        let r = EnvReadings {
            ambient_temp_c: 25.0,
            outside_temp_c: 28.0,
            ..Default::default()
        };
        push(&mut h, 1000, r);
        push(&mut h, 1000, r);

        let g = compute(&h);
        assert!((g.outside_to_ambient_temp - 6.0).abs() < 0.01, "3 degrees / 0.5h");
    }

    #[test]
    fn trend_averages_recent_pairs() {
        let mut h = SensorHistory::new();
        // 0.1 degrees per 30s sample = 12 degrees/hour, steady ramp
        for i in 0..6u64 {
            push(
                &mut h,
                i * 30_000,
                EnvReadings {
                    tent_temp_c: 24.0 + i as f32 * 0.1,
                    ..Default::default()
                },
            );
        }
        let g = compute(&h);
        assert!((g.temp_trend - 12.0).abs() < 0.1);
    }

    #[test]
    fn trend_ignores_samples_outside_the_window() {
        let mut h = SensorHistory::new();
        // A wild early sample must not affect a flat recent trend.
        push(&mut h, 0, EnvReadings { tent_temp_c: 80.0, ..Default::default() });
        for i in 1..6u64 {
            push(
                &mut h,
                i * 30_000,
                EnvReadings { tent_temp_c: 24.0, ..Default::default() },
            );
        }
        let g = compute(&h);
        assert!(g.temp_trend.abs() < 0.01);
    }
}
