//! The periodic control loop.
//!
//! One cooperative task drives the room on a fixed cadence.  Between
//! cycles it races the interval timer against a stop signal, so shutdown
//! is prompt no matter where in the wait it arrives.  On the way out the
//! loop commands every device off before acknowledging through the done
//! signal, which keeps teardown ordered for the caller.
//!
//! ```text
//!   run_cycle ──▶ race(stop, timer) ──▶ run_cycle ── ... ──▶ stop
//!                                                              │
//!                              emergency stop ◀────────────────┘
//!                                   │
//!                              done.signal(())
//! ```

use core::time::Duration;

use async_io_mini::Timer;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;
use log::{info, warn};

use crate::app::commands::RoomCommand;
use crate::app::events::RoomEvent;
use crate::app::ports::{ActuationPort, Clock, EventSink, StorePort};
use crate::app::service::RoomService;

/// Single-consumer notification used for the stop request and the
/// shutdown acknowledgement.
pub type LoopSignal = Signal<NoopRawMutex, ()>;

/// Run predictive cycles until `stop` fires.
///
/// A failed cycle widens the wait to the configured error backoff instead
/// of aborting the loop.  Always performs the emergency stop and signals
/// `done` before returning.
pub async fn control_loop(
    room: &mut RoomService,
    store: &impl StorePort,
    port: &mut impl ActuationPort,
    sink: &mut impl EventSink,
    clock: &impl Clock,
    stop: &LoopSignal,
    done: &LoopSignal,
) {
    room.start(store, sink);

    // Re-apply the persisted bounds toggle before the first cycle.
    if store.bounds_enabled() {
        room.handle_command(RoomCommand::SetBoundsControl(true), store, port, sink, clock)
            .await;
    }

    loop {
        let wait = match room.run_cycle(store, port, sink, clock).await {
            Ok(()) => Duration::from_secs(u64::from(room.config().cycle_interval_secs)),
            Err(e) => {
                let backoff = room.config().error_backoff_secs;
                warn!("cycle {} degraded ({e}), backing off {backoff}s", room.cycle_count());
                Duration::from_secs(u64::from(backoff))
            }
        };

        let stop_requested = future::or(
            async {
                stop.wait().await;
                true
            },
            async {
                Timer::after(wait).await;
                false
            },
        )
        .await;

        if stop_requested {
            break;
        }
    }

    room.emergency_stop(port, sink).await;
    sink.emit(&RoomEvent::Stopped);
    info!("control loop exited after {} cycles", room.cycle_count());
    done.signal(());
}
