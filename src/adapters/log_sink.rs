//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured room events to the
//! process logger.  A host integration would add a second adapter that
//! forwards the same events onto its own event bus.

use log::{info, warn};

use crate::app::events::RoomEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`RoomEvent`] to the console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &RoomEvent) {
        match event {
            RoomEvent::Started { stage } => {
                info!("START | stage={stage:?}");
            }
            RoomEvent::CycleCompleted(s) => {
                info!(
                    "CYCLE | n={} | T*={:.1}\u{00b0}C RH*={:.0}% light*={:.0}% \
                     exhaust*={:.0}% | dT={:+.2} dRH={:+.2} pre={:+.1} | {} adjustments",
                    s.cycle,
                    s.targets.temp_c,
                    s.targets.humidity,
                    s.targets.light_pct,
                    s.targets.exhaust_pct,
                    s.prediction.temp_delta,
                    s.prediction.hum_delta,
                    s.prediction.exhaust_preadjust,
                    s.adjustments,
                );
            }
            RoomEvent::ValueClamped {
                device,
                requested,
                stored,
            } => {
                info!("CLAMP | {device} {requested} -> {stored}");
            }
            RoomEvent::ActuationFailed { device, error } => {
                warn!("FAIL  | {device}: {error}");
            }
            RoomEvent::WorkMode { engaged } => {
                info!("WORK  | {}", if *engaged { "engaged" } else { "released" });
            }
            RoomEvent::BoundsControl { enabled } => {
                info!("BOUND | {}", if *enabled { "enabled" } else { "disabled" });
            }
            RoomEvent::InertiaTuned { from, to } => {
                info!("LEARN | inertia {from:.2} -> {to:.2}");
            }
            RoomEvent::EmergencyStop => {
                warn!("ESTOP | all devices commanded off");
            }
            RoomEvent::Stopped => {
                info!("STOP  | control loop exited");
            }
        }
    }
}
