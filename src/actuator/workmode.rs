//! Work-mode state machine.
//!
//! Work mode drops the room to a safe low-output state while a human is
//! inside (maintenance, training, harvest).  Each actuator is a two-state
//! machine (Normal / WorkMode); this module computes the transition and
//! the action the caller must dispatch, without touching hardware itself.
//!
//! Rules, per device class:
//! - dimmable devices drive to their minimum bound on entry and restore
//!   their maximum on exit, but an exit never starts a stopped device
//! - non-dimmable lights, pumps, and generic devices are unaffected
//! - other non-dimmable devices turn off on entry; on exit they resume
//!   only if they were running when work mode began
//! - lights mid sun-transition ignore the signal entirely
//! - when the room light is off the signal is parked as pending and
//!   replayed when light returns (dropped for own-schedule lights)

use log::debug;

use super::{Actuator, ActuatorKind, RunState};
use crate::config::ControlConfig;

/// What the caller must dispatch after a work-mode transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkModeAction {
    /// Push this control value to the device.
    Drive(u8),
    TurnOff,
    TurnOn,
    /// No hardware action required.
    Ignore,
}

/// Feed a work-mode signal (`enter` = true to engage) into one actuator.
pub fn signal(
    act: &mut Actuator,
    enter: bool,
    light_on: bool,
    config: &ControlConfig,
) -> WorkModeAction {
    if act.kind == ActuatorKind::Light && act.sun_transition {
        debug!("{}: in sun transition, work-mode signal ignored", act.name);
        return WorkModeAction::Ignore;
    }

    if act.kind == ActuatorKind::Light && !light_on {
        if act.own_schedule {
            debug!("{}: own schedule, deferred work-mode dropped", act.name);
        } else {
            act.pending_work_mode = Some(enter);
            debug!("{}: room light off, work-mode parked as pending", act.name);
        }
        return WorkModeAction::Ignore;
    }

    if enter { engage(act, config) } else { release(act) }
}

/// Replay a parked work-mode signal once the room light is back on.
pub fn flush_pending(act: &mut Actuator, light_on: bool, config: &ControlConfig) -> WorkModeAction {
    if !light_on {
        return WorkModeAction::Ignore;
    }
    match act.pending_work_mode.take() {
        Some(enter) => signal(act, enter, light_on, config),
        None => WorkModeAction::Ignore,
    }
}

fn engage(act: &mut Actuator, config: &ControlConfig) -> WorkModeAction {
    if act.in_work_mode {
        return WorkModeAction::Ignore;
    }

    if act.dimmable {
        act.in_work_mode = true;
        let floor = match (act.kind, act.bounds()) {
            (ActuatorKind::Light, Some((lo, _))) if act.bounds_active() => lo,
            (ActuatorKind::Light, _) => config.initial_light_voltage,
            (_, Some((lo, _))) => lo,
            (_, None) => 0,
        };
        return WorkModeAction::Drive(floor);
    }

    match act.kind {
        ActuatorKind::Light | ActuatorKind::Pump | ActuatorKind::Generic => WorkModeAction::Ignore,
        _ => {
            act.in_work_mode = true;
            act.resume_on_exit = act.running == RunState::On;
            WorkModeAction::TurnOff
        }
    }
}

fn release(act: &mut Actuator) -> WorkModeAction {
    if !act.in_work_mode {
        return WorkModeAction::Ignore;
    }
    act.in_work_mode = false;

    if act.dimmable {
        // Exit must not auto-start a device the grower left off.
        if act.running == RunState::On {
            let ceiling = act.bounds().map_or(100, |(_, hi)| hi);
            return WorkModeAction::Drive(ceiling);
        }
        return WorkModeAction::Ignore;
    }

    let resume = core::mem::replace(&mut act.resume_on_exit, false);
    if resume {
        WorkModeAction::TurnOn
    } else {
        WorkModeAction::Ignore
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ControlConfig {
        ControlConfig::default()
    }

    #[test]
    fn dimmable_enter_drives_to_min_exit_restores_max() {
        let mut exhaust =
            Actuator::new("exhaust", ActuatorKind::Exhaust, true).with_bounds(20, 80);
        exhaust.running = RunState::On;

        assert_eq!(signal(&mut exhaust, true, true, &cfg()), WorkModeAction::Drive(20));
        assert!(exhaust.in_work_mode);
        assert_eq!(signal(&mut exhaust, false, true, &cfg()), WorkModeAction::Drive(80));
        assert!(!exhaust.in_work_mode);
    }

    #[test]
    fn exit_never_starts_a_stopped_device() {
        let mut exhaust =
            Actuator::new("exhaust", ActuatorKind::Exhaust, true).with_bounds(20, 80);
        exhaust.running = RunState::On;
        assert_eq!(signal(&mut exhaust, true, true, &cfg()), WorkModeAction::Drive(20));

        exhaust.running = RunState::Off;
        assert_eq!(signal(&mut exhaust, false, true, &cfg()), WorkModeAction::Ignore);
        assert!(!exhaust.in_work_mode, "state machine still exits");
    }

    #[test]
    fn light_without_bounds_falls_back_to_initial_voltage() {
        let mut light = Actuator::new("light", ActuatorKind::Light, true);
        light.running = RunState::On;
        assert_eq!(
            signal(&mut light, true, true, &cfg()),
            WorkModeAction::Drive(cfg().initial_light_voltage)
        );
    }

    #[test]
    fn non_dimmable_heater_turns_off_and_resumes() {
        let mut heater = Actuator::new("heater", ActuatorKind::Heater, false);
        heater.running = RunState::On;

        assert_eq!(signal(&mut heater, true, true, &cfg()), WorkModeAction::TurnOff);
        heater.running = RunState::Off;
        assert_eq!(signal(&mut heater, false, true, &cfg()), WorkModeAction::TurnOn);
    }

    #[test]
    fn non_dimmable_heater_stays_off_if_it_was_off() {
        let mut heater = Actuator::new("heater", ActuatorKind::Heater, false);
        heater.running = RunState::Off;

        assert_eq!(signal(&mut heater, true, true, &cfg()), WorkModeAction::TurnOff);
        assert_eq!(signal(&mut heater, false, true, &cfg()), WorkModeAction::Ignore);
    }

    #[test]
    fn non_dimmable_pump_is_unaffected() {
        let mut pump = Actuator::new("pump", ActuatorKind::Pump, false);
        pump.running = RunState::On;
        assert_eq!(signal(&mut pump, true, true, &cfg()), WorkModeAction::Ignore);
        assert!(!pump.in_work_mode);
    }

    #[test]
    fn sun_transition_light_ignores_signals() {
        let mut light = Actuator::new("light", ActuatorKind::Light, true);
        light.sun_transition = true;
        light.running = RunState::On;
        assert_eq!(signal(&mut light, true, true, &cfg()), WorkModeAction::Ignore);
        assert!(!light.in_work_mode);
        assert!(light.pending_work_mode.is_none());
    }

    #[test]
    fn light_off_parks_signal_and_flush_replays_it() {
        let mut light = Actuator::new("light", ActuatorKind::Light, true).with_bounds(45, 55);
        light.running = RunState::On;

        assert_eq!(signal(&mut light, true, false, &cfg()), WorkModeAction::Ignore);
        assert_eq!(light.pending_work_mode, Some(true));
        assert!(!light.in_work_mode);

        assert_eq!(flush_pending(&mut light, true, &cfg()), WorkModeAction::Drive(45));
        assert!(light.in_work_mode);
        assert!(light.pending_work_mode.is_none());
    }

    #[test]
    fn own_schedule_light_drops_deferred_signal() {
        let mut light = Actuator::new("light", ActuatorKind::Light, true);
        light.own_schedule = true;
        assert_eq!(signal(&mut light, true, false, &cfg()), WorkModeAction::Ignore);
        assert!(light.pending_work_mode.is_none());
        assert_eq!(flush_pending(&mut light, true, &cfg()), WorkModeAction::Ignore);
    }

    #[test]
    fn double_enter_is_idempotent() {
        let mut fan = Actuator::new("fan", ActuatorKind::Ventilation, true).with_bounds(10, 90);
        fan.running = RunState::On;
        assert_eq!(signal(&mut fan, true, true, &cfg()), WorkModeAction::Drive(10));
        assert_eq!(signal(&mut fan, true, true, &cfg()), WorkModeAction::Ignore);
    }
}
