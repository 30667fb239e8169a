//! Port traits — the hexagonal boundary between domain logic and the host.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RoomService (domain)
//! ```
//!
//! Driven adapters (the host platform's store, its service bus, clocks,
//! event consumers) implement these traits.  The
//! [`RoomService`](super::service::RoomService) consumes them via
//! generics, so the domain core never touches the platform directly.

use crate::actuator::ActuatorKind;
use crate::actuator::dispatch::ServiceCall;
use crate::error::ActuateError;
use crate::predict::history::EnvReadings;
use crate::stage::PlantStage;

// ───────────────────────────────────────────────────────────────
// Store port (driven adapter: host state → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port over the host's keyed state store.
///
/// Accessors are typed — the raw-string sentinel filtering happens in the
/// adapter, so the domain only ever sees usable values.
pub trait StorePort {
    /// Current layered environment snapshot (tent, ambient, outside).
    fn readings(&self) -> EnvReadings;

    /// Configured plant growth stage.
    fn plant_stage(&self) -> PlantStage;

    /// Operator-configured control range for a device class, if any.
    fn device_bounds(&self, kind: ActuatorKind) -> Option<(u8, u8)>;

    /// Whether the global bounds toggle is on.
    fn bounds_enabled(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuation port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain drives devices through the host's single
/// actuation primitive, `invoke(domain, service, params)`.
///
/// Implementations are expected to be used from a single-threaded
/// executor; the returned futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait ActuationPort {
    /// Carry out one service call.  Failures are non-fatal to the caller.
    async fn invoke(&mut self, call: &ServiceCall) -> Result<(), ActuateError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / host bus)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`RoomEvent`](super::events::RoomEvent)s
/// through this port.  Adapters decide where they go (log, host event
/// bus, test capture).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::RoomEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source for rate limiting and history timestamps.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin; never goes backwards.
    fn now_ms(&self) -> u64;
}
