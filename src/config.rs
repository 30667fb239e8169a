//! Control-core configuration parameters
//!
//! All tunable parameters for one controlled grow room.  Values can be
//! overridden at startup by the host integration (deserialised from its
//! config store) or adjusted at runtime through commands.

use serde::{Deserialize, Serialize};

/// Core control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    // --- Control loop timing ---
    /// Interval between predictive control cycles (seconds)
    pub cycle_interval_secs: u16,
    /// Backoff after a failed cycle before retrying (seconds)
    pub error_backoff_secs: u16,
    /// Minimum spacing between turn-on commands per device (milliseconds)
    pub turn_on_cooldown_ms: u32,

    // --- Prediction ---
    /// Look-ahead horizon for drift prediction (minutes)
    pub prediction_horizon_mins: u16,
    /// Damping applied to the outside-to-ambient gradient (0.0-1.0)
    pub outside_inertia: f32,
    /// Damping applied to the ambient-to-tent transfer; tuned at runtime
    /// by the adaptive learner within [0.3, 0.8]
    pub ambient_tent_inertia: f32,
    /// Fraction of an ambient temperature change that reaches the tent
    pub temp_transfer: f32,
    /// Fraction of an ambient humidity change that reaches the tent
    pub hum_transfer: f32,

    // --- Actuation ---
    /// Change threshold below which dimmable devices are left alone (points)
    pub actuation_deadband: u8,
    /// Half-width of the humidity do-nothing band (percentage points)
    pub humidity_hysteresis: f32,
    /// Temperature deficit that switches the heater on (degrees C)
    pub heater_on_deficit: f32,
    /// Temperature surplus that switches the heater off (degrees C)
    pub heater_off_surplus: f32,

    // --- Lights ---
    /// Fallback light voltage when no bounds are configured (0-100)
    pub initial_light_voltage: u8,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            // Timing
            cycle_interval_secs: 30,
            error_backoff_secs: 30,
            turn_on_cooldown_ms: 3000,

            // Prediction
            prediction_horizon_mins: 5,
            outside_inertia: 0.7,
            ambient_tent_inertia: 0.5,
            temp_transfer: 0.30,
            hum_transfer: 0.40,

            // Actuation
            actuation_deadband: 5,
            humidity_hysteresis: 5.0,
            heater_on_deficit: 3.0,
            heater_off_surplus: 1.0,

            // Lights
            initial_light_voltage: 20,
        }
    }
}
