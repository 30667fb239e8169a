//! Room service — the hexagonal core.
//!
//! [`RoomService`] owns the actuator table, the capability registry, and
//! the predictive controller.  It exposes a platform-agnostic API; all
//! I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!  StorePort ────▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                  │         RoomService          │
//!  ActuationPort ◀─│  actuators · registry ·      │
//!                  │  predictive controller       │
//!                  └─────────────────────────────┘
//! ```

use heapless::Vec;
use log::{debug, info, warn};

use crate::actuator::{
    Actuator, ActuatorKind, FeedbackOutcome, MAX_ACTUATORS, RunState, bounds, dispatch, workmode,
};
use crate::capability::CapabilityRegistry;
use crate::config::ControlConfig;
use crate::error::ActuateError;
use crate::predict::executor::{self, Adjustment, CurrentLevels};
use crate::predict::history::EnvSample;
use crate::predict::learner::CycleRecord;
use crate::predict::targets;
use crate::predict::PredictiveController;

use super::commands::{DirectControl, RoomCommand};
use super::events::{CycleSummary, RoomEvent};
use super::ports::{ActuationPort, Clock, EventSink, StorePort};

// ───────────────────────────────────────────────────────────────
// RoomService
// ───────────────────────────────────────────────────────────────

/// Orchestrates all domain logic for one controlled room.
pub struct RoomService {
    config: ControlConfig,
    actuators: Vec<Actuator, MAX_ACTUATORS>,
    registry: CapabilityRegistry,
    controller: PredictiveController,
    light_on: bool,
    cycle_count: u64,
}

impl RoomService {
    pub fn new(config: ControlConfig) -> Self {
        let controller = PredictiveController::new(&config);
        Self {
            config,
            actuators: Vec::new(),
            registry: CapabilityRegistry::new(),
            controller,
            light_on: true,
            cycle_count: 0,
        }
    }

    // ── Setup ─────────────────────────────────────────────────

    /// Add an actuator to the room and register its capability.
    ///
    /// Idempotent on device name: re-registering an existing device
    /// leaves the table and the registry unchanged.
    pub fn register(&mut self, actuator: Actuator) -> bool {
        if self.index_by_name(actuator.name.as_str()).is_some() {
            debug!("room: {} already registered", actuator.name);
            return false;
        }
        if let Some(cap) = actuator.kind.capability() {
            self.registry.register(cap, actuator.name.as_str());
        }
        match self.actuators.push(actuator) {
            Ok(()) => true,
            Err(rejected) => {
                warn!("room: actuator table full, dropping {}", rejected.name);
                if let Some(cap) = rejected.kind.capability() {
                    self.registry.unregister(cap, rejected.name.as_str());
                }
                false
            }
        }
    }

    /// Announce startup through the sink.
    pub fn start(&mut self, store: &impl StorePort, sink: &mut impl EventSink) {
        let stage = store.plant_stage();
        info!(
            "room service started: {} devices, stage {:?}",
            self.actuators.len(),
            stage
        );
        sink.emit(&RoomEvent::Started { stage });
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn actuators(&self) -> &[Actuator] {
        &self.actuators
    }

    pub fn actuator(&self, name: &str) -> Option<&Actuator> {
        self.index_by_name(name).map(|i| &self.actuators[i])
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn light_on(&self) -> bool {
        self.light_on
    }

    // ── Feedback path ─────────────────────────────────────────

    /// Ingest one raw control-value update reported by the platform.
    pub fn handle_feedback(&mut self, device: &str, raw: &str, sink: &mut impl EventSink) {
        let Some(idx) = self.index_by_name(device) else {
            debug!("feedback for unmanaged device {device}, ignoring");
            return;
        };
        match self.actuators[idx].apply_feedback(raw) {
            Ok(FeedbackOutcome::Stored { requested, stored }) if requested != stored => {
                sink.emit(&RoomEvent::ValueClamped {
                    device: self.actuators[idx].name.clone(),
                    requested,
                    stored,
                });
            }
            Ok(_) => {}
            Err(e) => warn!("{device}: feedback discarded ({e})"),
        }
    }

    /// Ingest an on/off state update reported by the platform.
    pub fn handle_switch_state(&mut self, device: &str, raw: &str) {
        if let Some(idx) = self.index_by_name(device) {
            self.actuators[idx].apply_switch_state(raw);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.
    pub async fn handle_command(
        &mut self,
        cmd: RoomCommand,
        store: &impl StorePort,
        port: &mut impl ActuationPort,
        sink: &mut impl EventSink,
        clock: &impl Clock,
    ) {
        match cmd {
            RoomCommand::SetWorkMode(engaged) => {
                info!("work mode {}", if engaged { "engaged" } else { "released" });
                for idx in 0..self.actuators.len() {
                    let action = workmode::signal(
                        &mut self.actuators[idx],
                        engaged,
                        self.light_on,
                        &self.config,
                    );
                    self.apply_workmode_action(idx, action, port, sink, clock).await;
                }
                sink.emit(&RoomEvent::WorkMode { engaged });
            }

            RoomCommand::SetBoundsControl(enabled) => {
                let pushes = bounds::apply_toggle(enabled, &mut self.actuators, store);
                for push in pushes {
                    let _ = self.push_value(push.index, push.value, port, sink).await;
                }
                sink.emit(&RoomEvent::BoundsControl { enabled });
            }

            RoomCommand::SetLightState(on) => {
                self.light_on = on;
                debug!("room light {}", if on { "on" } else { "off" });
                for idx in 0..self.actuators.len() {
                    let action =
                        workmode::flush_pending(&mut self.actuators[idx], on, &self.config);
                    self.apply_workmode_action(idx, action, port, sink, clock).await;
                }
            }

            RoomCommand::Direct(dc) => self.handle_direct(dc, port, sink, clock).await,
        }
    }

    async fn handle_direct(
        &mut self,
        dc: DirectControl,
        port: &mut impl ActuationPort,
        sink: &mut impl EventSink,
        clock: &impl Clock,
    ) {
        let cap = match dc {
            DirectControl::SetValue { cap, .. }
            | DirectControl::TurnOn { cap }
            | DirectControl::TurnOff { cap } => cap,
        };
        let indices = self.indices_by_capability(cap);
        if indices.is_empty() {
            warn!("direct control: no device provides {cap:?}");
            return;
        }
        for idx in indices {
            let result = match dc {
                DirectControl::SetValue { value, .. } => {
                    self.push_value(idx, value, port, sink).await
                }
                DirectControl::TurnOn { .. } => self.switch_on(idx, port, sink, clock).await,
                DirectControl::TurnOff { .. } => self.switch_off(idx, port, sink).await,
            };
            if let Err(e) = result {
                debug!("direct control on index {idx}: {e}");
            }
        }
    }

    // ── Predictive cycle ──────────────────────────────────────

    /// Run one full predictive control cycle.
    ///
    /// Never panics and never aborts mid-cycle: individual actuation
    /// failures are logged and emitted, and reported collectively so the
    /// loop can back off.
    pub async fn run_cycle(
        &mut self,
        store: &impl StorePort,
        port: &mut impl ActuationPort,
        sink: &mut impl EventSink,
        clock: &impl Clock,
    ) -> crate::error::Result<()> {
        let now = clock.now_ms();
        let readings = store.readings();
        let stage = store.plant_stage();

        self.controller.observe(EnvSample {
            at_ms: now,
            readings,
        });

        let gradients = self.controller.gradients();
        let prediction = self.controller.predict(&gradients, &self.config);
        let cycle_targets = targets::compute(stage, &readings, &prediction);
        let plan = executor::plan(&cycle_targets, &readings, &self.current_levels(), &self.config);

        debug!(
            "cycle {}: targets T={:.1} RH={:.1} light={:.0} exhaust={:.0}, {} adjustments",
            self.cycle_count + 1,
            cycle_targets.temp_c,
            cycle_targets.humidity,
            cycle_targets.light_pct,
            cycle_targets.exhaust_pct,
            plan.len(),
        );

        let mut failed = false;
        for adj in &plan {
            if let Err(e) = self.apply_adjustment(*adj, port, sink, clock).await {
                if e != ActuateError::RateLimited {
                    failed = true;
                }
            }
        }

        self.controller.record_cycle(CycleRecord {
            at_ms: now,
            readings,
            targets: cycle_targets,
            prediction,
            gradients,
        });
        if let Some((from, to)) = self.controller.retune() {
            info!("ambient-tent inertia tuned {from:.2} -> {to:.2}");
            sink.emit(&RoomEvent::InertiaTuned { from, to });
        }

        self.cycle_count += 1;
        sink.emit(&RoomEvent::CycleCompleted(CycleSummary {
            cycle: self.cycle_count,
            targets: cycle_targets,
            prediction,
            adjustments: plan.len() as u8,
        }));

        if failed {
            Err(ActuateError::InvokeFailed.into())
        } else {
            Ok(())
        }
    }

    /// Best-effort shutdown: command every device off, ignoring failures.
    pub async fn emergency_stop(&mut self, port: &mut impl ActuationPort, sink: &mut impl EventSink) {
        warn!("emergency stop: commanding all devices off");
        for idx in 0..self.actuators.len() {
            let calls = dispatch::turn_off(&self.actuators[idx]);
            for call in &calls {
                if let Err(e) = port.invoke(call).await {
                    warn!("emergency stop: {} did not confirm off ({e})", call.device);
                }
            }
            self.actuators[idx].running = RunState::Off;
        }
        sink.emit(&RoomEvent::EmergencyStop);
    }

    // ── Internal ──────────────────────────────────────────────

    fn index_by_name(&self, name: &str) -> Option<usize> {
        self.actuators.iter().position(|a| a.name.as_str() == name)
    }

    fn indices_by_capability(
        &self,
        cap: crate::capability::Capability,
    ) -> Vec<usize, MAX_ACTUATORS> {
        let mut out = Vec::new();
        for (i, a) in self.actuators.iter().enumerate() {
            if a.kind.capability() == Some(cap) {
                let _ = out.push(i);
            }
        }
        out
    }

    fn first_value_of_kind(&self, kind: ActuatorKind) -> Option<u8> {
        self.actuators
            .iter()
            .find(|a| a.kind == kind)
            .and_then(Actuator::control_value)
    }

    fn current_levels(&self) -> CurrentLevels {
        CurrentLevels {
            light: self.first_value_of_kind(ActuatorKind::Light),
            exhaust: self.first_value_of_kind(ActuatorKind::Exhaust),
            intake: self.first_value_of_kind(ActuatorKind::Intake),
        }
    }

    async fn apply_adjustment(
        &mut self,
        adj: Adjustment,
        port: &mut impl ActuationPort,
        sink: &mut impl EventSink,
        clock: &impl Clock,
    ) -> Result<(), ActuateError> {
        match adj {
            Adjustment::SetLight(v) => self.drive_kind(ActuatorKind::Light, v, port, sink).await,
            Adjustment::SetExhaust(v) => self.drive_kind(ActuatorKind::Exhaust, v, port, sink).await,
            Adjustment::SetIntake(v) => self.drive_kind(ActuatorKind::Intake, v, port, sink).await,
            Adjustment::Humidifier(on) => {
                self.switch_kind(ActuatorKind::Humidifier, on, port, sink, clock).await
            }
            Adjustment::Dehumidifier(on) => {
                self.switch_kind(ActuatorKind::Dehumidifier, on, port, sink, clock).await
            }
            Adjustment::Heater(on) => {
                self.switch_kind(ActuatorKind::Heater, on, port, sink, clock).await
            }
        }
    }

    /// Push `value` to every device of `kind` not held by work mode.
    async fn drive_kind(
        &mut self,
        kind: ActuatorKind,
        value: u8,
        port: &mut impl ActuationPort,
        sink: &mut impl EventSink,
    ) -> Result<(), ActuateError> {
        let mut result = Ok(());
        for idx in 0..self.actuators.len() {
            let a = &self.actuators[idx];
            if a.kind != kind || a.in_work_mode {
                continue;
            }
            if let Err(e) = self.push_value(idx, value, port, sink).await {
                result = Err(e);
            }
        }
        result
    }

    /// Switch every device of `kind` on or off, respecting work mode.
    async fn switch_kind(
        &mut self,
        kind: ActuatorKind,
        on: bool,
        port: &mut impl ActuationPort,
        sink: &mut impl EventSink,
        clock: &impl Clock,
    ) -> Result<(), ActuateError> {
        let mut result = Ok(());
        for idx in 0..self.actuators.len() {
            let a = &self.actuators[idx];
            if a.kind != kind || a.in_work_mode {
                continue;
            }
            let r = if on {
                self.switch_on(idx, port, sink, clock).await
            } else {
                self.switch_off(idx, port, sink).await
            };
            if let Err(e) = r {
                result = Err(e);
            }
        }
        result
    }

    async fn apply_workmode_action(
        &mut self,
        idx: usize,
        action: workmode::WorkModeAction,
        port: &mut impl ActuationPort,
        sink: &mut impl EventSink,
        clock: &impl Clock,
    ) {
        let result = match action {
            workmode::WorkModeAction::Drive(v) => self.push_value(idx, v, port, sink).await,
            workmode::WorkModeAction::TurnOff => self.switch_off(idx, port, sink).await,
            workmode::WorkModeAction::TurnOn => self.switch_on(idx, port, sink, clock).await,
            workmode::WorkModeAction::Ignore => Ok(()),
        };
        if let Err(e) = result {
            debug!("work mode action on index {idx}: {e}");
        }
    }

    /// Dispatch a value write to one actuator and commit it to the model
    /// on success.  The in-flight guard suppresses the feedback echo.
    async fn push_value(
        &mut self,
        idx: usize,
        value: u8,
        port: &mut impl ActuationPort,
        sink: &mut impl EventSink,
    ) -> Result<(), ActuateError> {
        let value = self.actuators[idx].clamp(f32::from(value));
        let calls = dispatch::set_value(&self.actuators[idx], value);

        self.actuators[idx].in_active_control = true;
        let mut result = Ok(());
        for call in &calls {
            if let Err(e) = port.invoke(call).await {
                warn!("{}: {}.{} failed ({e})", call.device, call.domain, call.service);
                sink.emit(&RoomEvent::ActuationFailed {
                    device: call.device.clone(),
                    error: e,
                });
                result = Err(e);
                break;
            }
        }
        let act = &mut self.actuators[idx];
        act.in_active_control = false;
        if result.is_ok() {
            act.set_control_value(value);
        }
        result
    }

    /// Rate-limited turn-on for one actuator.  A command inside the
    /// cooldown window is a logged no-op.
    async fn switch_on(
        &mut self,
        idx: usize,
        port: &mut impl ActuationPort,
        sink: &mut impl EventSink,
        clock: &impl Clock,
    ) -> Result<(), ActuateError> {
        let now = clock.now_ms();
        if !self.actuators[idx].can_turn_on(now, self.config.turn_on_cooldown_ms) {
            info!(
                "{}: turn-on suppressed by {}ms cooldown",
                self.actuators[idx].name, self.config.turn_on_cooldown_ms
            );
            return Err(ActuateError::RateLimited);
        }

        let calls = dispatch::turn_on(&self.actuators[idx]);
        self.actuators[idx].in_active_control = true;
        let mut result = Ok(());
        for call in &calls {
            if let Err(e) = port.invoke(call).await {
                warn!("{}: {}.{} failed ({e})", call.device, call.domain, call.service);
                sink.emit(&RoomEvent::ActuationFailed {
                    device: call.device.clone(),
                    error: e,
                });
                result = Err(e);
                break;
            }
        }
        let act = &mut self.actuators[idx];
        act.in_active_control = false;
        if result.is_ok() {
            act.note_turn_on(now);
            act.running = RunState::On;
        }
        result
    }

    async fn switch_off(
        &mut self,
        idx: usize,
        port: &mut impl ActuationPort,
        sink: &mut impl EventSink,
    ) -> Result<(), ActuateError> {
        let calls = dispatch::turn_off(&self.actuators[idx]);
        self.actuators[idx].in_active_control = true;
        let mut result = Ok(());
        for call in &calls {
            if let Err(e) = port.invoke(call).await {
                warn!("{}: {}.{} failed ({e})", call.device, call.domain, call.service);
                sink.emit(&RoomEvent::ActuationFailed {
                    device: call.device.clone(),
                    error: e,
                });
                result = Err(e);
                break;
            }
        }
        let act = &mut self.actuators[idx];
        act.in_active_control = false;
        if result.is_ok() {
            act.running = RunState::Off;
        }
        result
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
