//! Grow-room control core — simulation entry point.
//!
//! Hexagonal architecture with a single-threaded async executor.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  MemoryStore     SimActuation    LogEventSink   SystemClock  │
//! │  (StorePort)     (ActuationPort) (EventSink)    (Clock)      │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ───────────────────     │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              RoomService (pure logic)                  │  │
//! │  │  bounds · work mode · prediction · targets · learner   │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  control_loop (cancellable, fixed cadence)                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Runs the predictive loop against a simulated room on a hot day, with a
//! work-mode interruption partway through, then shuts down cleanly.

#![deny(unused_must_use)]

use core::time::Duration;

use anyhow::Result;
use async_io_mini::Timer;
use edge_executor::LocalExecutor;
use futures_lite::future;
use log::info;

use growcell::actuator::{Actuator, ActuatorKind, Quirk};
use growcell::adapters::log_sink::LogEventSink;
use growcell::adapters::memory_store::MemoryStore;
use growcell::adapters::sim::{SimActuation, SimEnvironment, SystemClock};
use growcell::app::commands::RoomCommand;
use growcell::app::service::RoomService;
use growcell::config::ControlConfig;
use growcell::predict::history::EnvReadings;
use growcell::predict::task::{LoopSignal, control_loop};
use growcell::stage::PlantStage;

/// Simulation steps between environment updates.
const SIM_STEPS: usize = 12;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  growcell v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // Accelerated cadence for the simulation run.
    let config = ControlConfig {
        cycle_interval_secs: 2,
        error_backoff_secs: 2,
        ..ControlConfig::default()
    };

    let mut room = RoomService::new(config);
    room.register(Actuator::new("tent_light", ActuatorKind::Light, true));
    room.register(Actuator::new("exhaust_fan", ActuatorKind::Exhaust, true).with_step(5));
    room.register(
        Actuator::new("intake_fan", ActuatorKind::Intake, true).with_quirk(Quirk::SelectX10),
    );
    room.register(Actuator::new("humidifier", ActuatorKind::Humidifier, false));
    room.register(Actuator::new("dehumidifier", ActuatorKind::Dehumidifier, false));
    room.register(Actuator::new("heater", ActuatorKind::Heater, false));
    info!("registered {} devices", room.actuators().len());

    let store = MemoryStore::new();
    store.set_stage(PlantStage::MidFlower);
    store.set_device_bounds(ActuatorKind::Exhaust, (20, 90));
    store.set_device_bounds(ActuatorKind::Intake, (15, 80));
    store.set_bounds_enabled(true);

    // Hot afternoon outside, tent still comfortable.
    let mut env = SimEnvironment::new(EnvReadings {
        tent_temp_c: 23.5,
        tent_rh: 55.0,
        vpd_kpa: 1.3,
        co2_ppm: 800.0,
        light_pct: 95.0,
        ambient_temp_c: 26.0,
        ambient_rh: 48.0,
        outside_temp_c: 34.0,
        outside_rh: 35.0,
    });
    env.step(&store);

    let mut port = SimActuation::new();
    let mut sink = LogEventSink::new();
    let clock = SystemClock::new();
    let stop = LoopSignal::new();
    let done = LoopSignal::new();

    let executor: LocalExecutor = LocalExecutor::new();
    futures_lite::future::block_on(executor.run(async {
        // Scripted preamble: the operator walks in for a moment before the
        // loop takes over.
        info!("--- operator enters the room ---");
        room.handle_command(
            RoomCommand::SetWorkMode(true),
            &store,
            &mut port,
            &mut sink,
            &clock,
        )
        .await;
        Timer::after(Duration::from_secs(1)).await;
        info!("--- operator leaves the room ---");
        room.handle_command(
            RoomCommand::SetWorkMode(false),
            &store,
            &mut port,
            &mut sink,
            &clock,
        )
        .await;

        let loop_fut = control_loop(
            &mut room, &store, &mut port, &mut sink, &clock, &stop, &done,
        );

        let driver_fut = async {
            for _ in 0..SIM_STEPS {
                Timer::after(Duration::from_millis(2500)).await;
                env.step(&store);
            }
            stop.signal(());
            done.wait().await;
        };

        future::zip(loop_fut, driver_fut).await;
    }));

    info!("simulation done: {} service calls dispatched", port.invocations());
    Ok(())
}
