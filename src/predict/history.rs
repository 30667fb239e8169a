//! Bounded sensor history.
//!
//! A ring of the last [`HISTORY_LEN`] layered environment samples.  The
//! buffer lives entirely in memory and is never persisted; on restart the
//! controller simply re-learns from fresh samples.

use heapless::Deque;

/// Samples kept for gradient computation.
pub const HISTORY_LEN: usize = 20;

/// One layered snapshot of the environment: tent interior, ambient room,
/// and outside weather, read together from the store.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvReadings {
    pub tent_temp_c: f32,
    pub tent_rh: f32,
    pub vpd_kpa: f32,
    pub co2_ppm: f32,
    pub light_pct: f32,
    pub ambient_temp_c: f32,
    pub ambient_rh: f32,
    pub outside_temp_c: f32,
    pub outside_rh: f32,
}

/// A timestamped [`EnvReadings`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvSample {
    pub at_ms: u64,
    pub readings: EnvReadings,
}

/// Fixed-capacity sample ring; the oldest sample is evicted on overflow.
#[derive(Debug, Default)]
pub struct SensorHistory {
    buf: Deque<EnvSample, HISTORY_LEN>,
}

impl SensorHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample, evicting the oldest when the ring is full.
    pub fn push(&mut self, sample: EnvSample) {
        if self.buf.is_full() {
            let _ = self.buf.pop_front();
        }
        // Cannot fail: a slot was just freed if necessary.
        let _ = self.buf.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Oldest buffered sample.
    pub fn oldest(&self) -> Option<&EnvSample> {
        self.buf.front()
    }

    /// Most recent sample.
    pub fn newest(&self) -> Option<&EnvSample> {
        self.buf.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &EnvSample> {
        self.buf.iter()
    }

    /// The last `n` samples, oldest first.
    pub fn last_n(&self, n: usize) -> impl Iterator<Item = &EnvSample> {
        let skip = self.buf.len().saturating_sub(n);
        self.buf.iter().skip(skip)
    }
}
