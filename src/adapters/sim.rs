//! Simulation adapters for host-side runs.
//!
//! [`SimActuation`] accepts every service call and logs it, standing in
//! for a real device bus.  [`SystemClock`] maps the monotonic process
//! clock onto the [`Clock`] port.  [`SimEnvironment`] drifts the store's
//! readings between cycles so the demo binary has something to fight.

use log::info;

use crate::actuator::dispatch::ServiceCall;
use crate::adapters::memory_store::MemoryStore;
use crate::app::ports::{ActuationPort, Clock};
use crate::error::ActuateError;
use crate::predict::history::EnvReadings;

/// Actuation adapter that logs calls instead of driving hardware.
pub struct SimActuation {
    invocations: u64,
}

impl SimActuation {
    pub fn new() -> Self {
        Self { invocations: 0 }
    }

    pub fn invocations(&self) -> u64 {
        self.invocations
    }
}

impl Default for SimActuation {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuationPort for SimActuation {
    async fn invoke(&mut self, call: &ServiceCall) -> Result<(), ActuateError> {
        self.invocations += 1;
        info!(
            "CALL  | {}.{} {} {:?}",
            call.domain, call.service, call.device, call.param
        );
        Ok(())
    }
}

/// Monotonic process clock.
pub struct SystemClock {
    start: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Crude room physics: the tent relaxes towards the ambient room, the
/// ambient room towards outside.  Enough to exercise the gradient chain.
pub struct SimEnvironment {
    readings: EnvReadings,
}

impl SimEnvironment {
    pub fn new(initial: EnvReadings) -> Self {
        Self { readings: initial }
    }

    /// Advance the simulation by one step and publish into the store.
    pub fn step(&mut self, store: &MemoryStore) {
        let r = &mut self.readings;
        r.ambient_temp_c += (r.outside_temp_c - r.ambient_temp_c) * 0.10;
        r.ambient_rh += (r.outside_rh - r.ambient_rh) * 0.10;
        r.tent_temp_c += (r.ambient_temp_c - r.tent_temp_c) * 0.05;
        r.tent_rh += (r.ambient_rh - r.tent_rh) * 0.05;
        r.vpd_kpa = vpd(r.tent_temp_c, r.tent_rh);
        store.set_readings(*r);
    }
}

/// Vapour pressure deficit from temperature and relative humidity, via the
/// Magnus saturation approximation.
fn vpd(temp_c: f32, rh: f32) -> f32 {
    let svp = 0.6108 * (17.27 * temp_c / (temp_c + 237.3)).exp();
    svp * (1.0 - rh / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::StorePort;

    #[test]
    fn environment_drifts_towards_outside() {
        let store = MemoryStore::new();
        let mut env = SimEnvironment::new(EnvReadings {
            tent_temp_c: 24.0,
            tent_rh: 60.0,
            ambient_temp_c: 24.0,
            ambient_rh: 60.0,
            outside_temp_c: 35.0,
            outside_rh: 30.0,
            ..Default::default()
        });

        for _ in 0..10 {
            env.step(&store);
        }

        let r = store.readings();
        assert!(r.ambient_temp_c > 24.0 && r.ambient_temp_c < 35.0);
        assert!(r.tent_temp_c > 24.0);
        assert!(r.tent_rh < 60.0);
        assert!(r.vpd_kpa > 0.0);
    }

    #[test]
    fn vpd_sanity() {
        // ~1.2 kPa at 25C / 60% RH is the canonical checkpoint.
        let v = vpd(25.0, 60.0);
        assert!((v - 1.27).abs() < 0.1, "got {v}");
        assert!(vpd(25.0, 100.0).abs() < 0.01);
    }
}
