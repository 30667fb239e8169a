//! Outbound application events.
//!
//! The [`RoomService`](super::service::RoomService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them — log them, publish them on the
//! host's event bus, or capture them in tests.

use crate::capability::DeviceName;
use crate::error::ActuateError;
use crate::predict::PredictionOutcome;
use crate::predict::targets::Targets;
use crate::stage::PlantStage;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// The control loop has started.
    Started { stage: PlantStage },

    /// One predictive cycle finished.
    CycleCompleted(CycleSummary),

    /// A feedback value was clamped by bounds enforcement.
    ValueClamped {
        device: DeviceName,
        requested: u8,
        stored: u8,
    },

    /// A service call failed; control continues degraded.
    ActuationFailed {
        device: DeviceName,
        error: ActuateError,
    },

    /// Work mode was engaged or released.
    WorkMode { engaged: bool },

    /// The global bounds toggle changed.
    BoundsControl { enabled: bool },

    /// The learner moved the ambient-to-tent inertia.
    InertiaTuned { from: f32, to: f32 },

    /// All actuators were commanded off ahead of shutdown.
    EmergencyStop,

    /// The control loop has exited.
    Stopped,
}

/// A point-in-time cycle summary suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSummary {
    pub cycle: u64,
    pub targets: Targets,
    pub prediction: PredictionOutcome,
    /// Adjustments dispatched this cycle.
    pub adjustments: u8,
}
