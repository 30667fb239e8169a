//! Actuator model — the uniform device abstraction.
//!
//! Every physical device in the room (light, fan, humidifier, heater,
//! CO2 valve, ...) is represented by one [`Actuator`].  The model keeps a
//! single 0-100 control value that is interpreted per device class:
//! voltage for lights, duty cycle for everything else.  Hardware oddities
//! are captured once at setup as a [`Quirk`] so the actuation path stays
//! branch-free at runtime.
//!
//! ```text
//!  feedback string ──▶ parse ──▶ quirk scale ──▶ clamp ──▶ control_value
//!  cycle targets   ──▶ dispatch::set_value ──▶ ServiceCall ──▶ invoke()
//! ```

pub mod bounds;
pub mod dispatch;
pub mod workmode;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::capability::{Capability, DeviceName};
use crate::error::SenseError;

/// Maximum actuators managed per room.
pub const MAX_ACTUATORS: usize = 16;

// ---------------------------------------------------------------------------
// Device classification
// ---------------------------------------------------------------------------

/// Functional class of an actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuatorKind {
    Light,
    Exhaust,
    Intake,
    Ventilation,
    Humidifier,
    Dehumidifier,
    Heater,
    Cooler,
    Climate,
    Co2,
    Pump,
    Generic,
}

impl ActuatorKind {
    /// The capability this kind provides, if any.  `Generic` devices are
    /// managed but advertise nothing.
    pub fn capability(self) -> Option<Capability> {
        match self {
            Self::Light => Some(Capability::Light),
            Self::Exhaust => Some(Capability::Exhaust),
            Self::Intake => Some(Capability::Intake),
            Self::Ventilation => Some(Capability::Ventilate),
            Self::Humidifier => Some(Capability::Humidify),
            Self::Dehumidifier => Some(Capability::Dehumidify),
            Self::Heater => Some(Capability::Heat),
            Self::Cooler => Some(Capability::Cool),
            Self::Climate => Some(Capability::Climate),
            Self::Co2 => Some(Capability::Co2),
            Self::Pump => Some(Capability::Pump),
            Self::Generic => None,
        }
    }

    /// How the 0-100 control value is interpreted for this kind.
    pub fn channel(self) -> ControlChannel {
        match self {
            Self::Light => ControlChannel::Voltage,
            _ => ControlChannel::Duty,
        }
    }

    /// Air-moving fan kinds share bounds-toggle and speed semantics.
    pub fn is_fan(self) -> bool {
        matches!(self, Self::Exhaust | Self::Intake | Self::Ventilation)
    }
}

/// Interpretation of the control value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlChannel {
    /// Light dimming voltage, percent of full scale.
    Voltage,
    /// Fan/device duty cycle, percent.
    Duty,
}

/// Hardware-specific actuation path, decided once at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quirk {
    /// Plain domain verbs (`fan.set_percentage`, `switch.turn_on`, ...).
    #[default]
    Standard,
    /// Fan controlled through a light entity (`light.turn_on` + brightness).
    LightVerb,
    /// Controller exposing a 0-10 number entity plus an On/Off select;
    /// feedback arrives tenth-scaled and is multiplied by 10 on ingest.
    SelectX10,
}

/// Observed on/off state.  `Unknown` until the first state update arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    On,
    Off,
    #[default]
    Unknown,
}

// ---------------------------------------------------------------------------
// Reading ingestion
// ---------------------------------------------------------------------------

/// Placeholder states the host platform reports for dead entities.
const SENTINELS: [&str; 4] = ["unavailable", "unknown", "None", "Unbekannt"];

/// Parse a raw state string into a numeric reading.
///
/// Returns `Ok(None)` for platform placeholder states — those are skipped
/// without logging.  A non-empty, non-placeholder string that fails to
/// parse is a [`SenseError::NotNumeric`].
pub fn parse_reading(raw: &str) -> Result<Option<f32>, SenseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if SENTINELS.iter().any(|s| trimmed.eq_ignore_ascii_case(s)) {
        return Ok(None);
    }
    trimmed
        .parse::<f32>()
        .map(Some)
        .map_err(|_| SenseError::NotNumeric)
}

/// Result of feeding one feedback update into an actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// Placeholder state or suppressed by an in-flight command.
    Skipped,
    /// Value stored.  `requested` is the scaled reading before clamping;
    /// when it differs from `stored`, bounds enforcement fired.
    Stored { requested: u8, stored: u8 },
}

// ---------------------------------------------------------------------------
// Actuator
// ---------------------------------------------------------------------------

/// One managed device.
#[derive(Debug, Clone)]
pub struct Actuator {
    pub name: DeviceName,
    pub kind: ActuatorKind,
    pub dimmable: bool,
    pub quirk: Quirk,
    control_value: Option<u8>,
    bounds: Option<(u8, u8)>,
    bounds_active: bool,
    pub running: RunState,
    pub in_work_mode: bool,
    /// Work-mode signal received while the room light was off, to be
    /// replayed when the light returns.
    pub pending_work_mode: Option<bool>,
    /// Light runs its own schedule; deferred work-mode signals are dropped.
    pub own_schedule: bool,
    /// Light currently ramping through a sunrise/sunset transition;
    /// work-mode signals are ignored entirely.
    pub sun_transition: bool,
    /// Value step the device accepts; 0 means no step alignment.
    pub step: u8,
    /// Set while a command is in flight so the feedback echo does not
    /// overwrite the value we just wrote.
    pub in_active_control: bool,
    /// Whether a non-dimmable device should be switched back on when
    /// leaving work mode (captured at entry).
    pub(crate) resume_on_exit: bool,
    last_turn_on_ms: Option<u64>,
}

impl Actuator {
    pub fn new(name: &str, kind: ActuatorKind, dimmable: bool) -> Self {
        Self {
            name: DeviceName::try_from(name).unwrap_or_default(),
            kind,
            dimmable,
            quirk: Quirk::Standard,
            control_value: None,
            bounds: None,
            bounds_active: false,
            running: RunState::Unknown,
            in_work_mode: false,
            pending_work_mode: None,
            own_schedule: false,
            sun_transition: false,
            step: 0,
            in_active_control: false,
            resume_on_exit: false,
            last_turn_on_ms: None,
        }
    }

    pub fn with_quirk(mut self, quirk: Quirk) -> Self {
        self.quirk = quirk;
        self
    }

    pub fn with_step(mut self, step: u8) -> Self {
        self.step = step;
        self
    }

    pub fn with_bounds(mut self, min: u8, max: u8) -> Self {
        self.set_bounds(Some((min, max)), true);
        self
    }

    // ── Bounds and value ──────────────────────────────────────

    pub fn bounds(&self) -> Option<(u8, u8)> {
        self.bounds
    }

    pub fn bounds_active(&self) -> bool {
        self.bounds_active
    }

    /// Install new bounds.  The stored control value is re-clamped so the
    /// bounds invariant holds after every mutation.
    pub fn set_bounds(&mut self, bounds: Option<(u8, u8)>, active: bool) {
        self.bounds = bounds;
        self.bounds_active = active && bounds.is_some();
        if self.bounds_active {
            if let Some(v) = self.control_value {
                self.control_value = Some(self.clamp(f32::from(v)));
            }
        }
    }

    pub fn control_value(&self) -> Option<u8> {
        self.control_value
    }

    /// Store a control value, clamped to 0-100 and to active bounds.
    /// Returns the value actually stored.
    pub fn set_control_value(&mut self, value: u8) -> u8 {
        let stored = self.clamp(f32::from(value));
        self.control_value = Some(stored);
        stored
    }

    /// Clamp a raw value to this actuator's effective range.
    pub fn clamp(&self, value: f32) -> u8 {
        let v = value.clamp(0.0, 100.0);
        let v = match (self.bounds_active, self.bounds) {
            (true, Some((lo, hi))) => v.clamp(f32::from(lo), f32::from(hi)),
            _ => v,
        };
        v.round() as u8
    }

    /// Step-aligned midpoint of the current bounds, used to seed a value
    /// for devices that have never reported one.
    pub fn init_midpoint(&self) -> Option<u8> {
        let (lo, hi) = self.bounds?;
        Some(bounds::midpoint(lo, hi, self.step))
    }

    // ── Feedback path ─────────────────────────────────────────

    /// Ingest one raw feedback value for this device.
    ///
    /// Placeholder states are skipped silently; the update is also skipped
    /// while a command of ours is in flight (the echo would race the
    /// value we just pushed).
    pub fn apply_feedback(&mut self, raw: &str) -> Result<FeedbackOutcome, SenseError> {
        if self.in_active_control {
            return Ok(FeedbackOutcome::Skipped);
        }
        let Some(mut value) = parse_reading(raw)? else {
            return Ok(FeedbackOutcome::Skipped);
        };
        if self.quirk == Quirk::SelectX10 {
            value *= 10.0;
        }
        let requested = value.clamp(0.0, 100.0).round() as u8;
        let stored = self.clamp(value);
        self.control_value = Some(stored);
        if requested != stored {
            debug!(
                "{}: feedback {requested} clamped to {stored} (bounds {:?})",
                self.name, self.bounds
            );
        }
        Ok(FeedbackOutcome::Stored { requested, stored })
    }

    /// Ingest an on/off state update.  Placeholder states map to `Unknown`.
    pub fn apply_switch_state(&mut self, raw: &str) {
        let trimmed = raw.trim();
        self.running = if trimmed.eq_ignore_ascii_case("on") {
            RunState::On
        } else if trimmed.eq_ignore_ascii_case("off") {
            RunState::Off
        } else {
            RunState::Unknown
        };
    }

    // ── Turn-on rate limiting ─────────────────────────────────

    /// Whether a turn-on is allowed at `now_ms` under `cooldown_ms`.
    pub fn can_turn_on(&self, now_ms: u64, cooldown_ms: u32) -> bool {
        self.last_turn_on_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= u64::from(cooldown_ms))
    }

    /// Record a successful turn-on for rate limiting.
    pub fn note_turn_on(&mut self, now_ms: u64) {
        self.last_turn_on_ms = Some(now_ms);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_placeholder_states() {
        for raw in ["unavailable", "unknown", "None", "Unbekannt", "", "  "] {
            assert_eq!(parse_reading(raw), Ok(None), "{raw:?}");
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_reading("not-a-number"), Err(SenseError::NotNumeric));
    }

    #[test]
    fn parse_accepts_numbers() {
        assert_eq!(parse_reading(" 42.5 "), Ok(Some(42.5)));
        assert_eq!(parse_reading("0"), Ok(Some(0.0)));
    }

    #[test]
    fn out_of_range_feedback_is_clamped_to_bounds() {
        let mut exhaust =
            Actuator::new("exhaust_fan", ActuatorKind::Exhaust, true).with_bounds(10, 95);
        let outcome = exhaust.apply_feedback("110").unwrap();
        assert_eq!(
            outcome,
            FeedbackOutcome::Stored {
                requested: 100,
                stored: 95
            }
        );
        assert_eq!(exhaust.control_value(), Some(95));
    }

    #[test]
    fn select_x10_feedback_is_rescaled() {
        let mut fan =
            Actuator::new("ac_fan", ActuatorKind::Exhaust, true).with_quirk(Quirk::SelectX10);
        let outcome = fan.apply_feedback("6").unwrap();
        assert_eq!(
            outcome,
            FeedbackOutcome::Stored {
                requested: 60,
                stored: 60
            }
        );
    }

    #[test]
    fn in_active_control_suppresses_feedback() {
        let mut light = Actuator::new("main_light", ActuatorKind::Light, true);
        light.set_control_value(50);
        light.in_active_control = true;
        assert_eq!(light.apply_feedback("80"), Ok(FeedbackOutcome::Skipped));
        assert_eq!(light.control_value(), Some(50));
    }

    #[test]
    fn switch_state_tri_state() {
        let mut pump = Actuator::new("water_pump", ActuatorKind::Pump, false);
        assert_eq!(pump.running, RunState::Unknown);
        pump.apply_switch_state("on");
        assert_eq!(pump.running, RunState::On);
        pump.apply_switch_state("OFF");
        assert_eq!(pump.running, RunState::Off);
        pump.apply_switch_state("unavailable");
        assert_eq!(pump.running, RunState::Unknown);
    }

    #[test]
    fn turn_on_rate_limit_window() {
        let mut fan = Actuator::new("fan", ActuatorKind::Ventilation, false);
        assert!(fan.can_turn_on(0, 3000), "first turn-on always allowed");
        fan.note_turn_on(1000);
        assert!(!fan.can_turn_on(2000, 3000));
        assert!(!fan.can_turn_on(3999, 3000));
        assert!(fan.can_turn_on(4000, 3000));
    }

    #[test]
    fn installing_bounds_reclamps_stored_value() {
        let mut light = Actuator::new("light", ActuatorKind::Light, true);
        light.set_control_value(90);
        light.set_bounds(Some((20, 60)), true);
        assert_eq!(light.control_value(), Some(60));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn value_always_inside_active_bounds(
            lo in 0u8..=90,
            width in 1u8..=100,
            value in 0u8..=255,
        ) {
            let hi = lo.saturating_add(width).min(100);
            let mut a = Actuator::new("dev", ActuatorKind::Exhaust, true)
                .with_bounds(lo, hi);
            let stored = a.set_control_value(value);
            prop_assert!(stored >= lo && stored <= hi);
            prop_assert_eq!(a.control_value(), Some(stored));
        }

        #[test]
        fn clamp_is_idempotent(
            lo in 0u8..=90,
            width in 1u8..=100,
            value in -50.0f32..200.0,
        ) {
            let hi = lo.saturating_add(width).min(100);
            let a = Actuator::new("dev", ActuatorKind::Light, true).with_bounds(lo, hi);
            let once = a.clamp(value);
            let twice = a.clamp(f32::from(once));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn feedback_never_exceeds_full_scale(value in -1000.0f32..1000.0) {
            let mut a = Actuator::new("dev", ActuatorKind::Intake, true);
            let raw = format!("{value}");
            if let Ok(FeedbackOutcome::Stored { stored, .. }) = a.apply_feedback(&raw) {
                prop_assert!(stored <= 100);
            }
        }
    }
}
