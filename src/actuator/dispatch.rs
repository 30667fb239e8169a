//! Service-call construction — mapping device classes onto platform verbs.
//!
//! The control core never talks to hardware directly; it builds
//! [`ServiceCall`]s and hands them to the
//! [`ActuationPort`](crate::app::ports::ActuationPort).  The mapping per
//! kind and quirk lives here, in one place:
//!
//! ```text
//!  Light                       light.turn_on  { brightness_pct }
//!  Fan (Standard)              fan.set_percentage / fan.turn_on
//!  Fan (LightVerb)             light.turn_on  { brightness_pct }
//!  Fan (SelectX10)             select.select_option "On" + number.set_value v/10
//!  Climate                     climate.set_hvac_mode "heat" / "off"
//!  Switch kinds                switch.turn_on / switch.turn_off
//! ```

use heapless::Vec;

use super::{Actuator, ActuatorKind, Quirk};
use crate::capability::DeviceName;

/// Parameter payload for a service call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallParam {
    None,
    /// `brightness_pct` for light-verb devices.
    BrightnessPct(u8),
    /// `percentage` for fan speed.
    Percentage(u8),
    /// Raw numeric value for number entities (already rescaled).
    Value(f32),
    /// Option label for select entities.
    Choice(&'static str),
    /// HVAC mode for climate entities.
    HvacMode(&'static str),
}

/// One abstract platform invocation: `invoke(domain, service, params)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCall {
    pub domain: &'static str,
    pub service: &'static str,
    pub device: DeviceName,
    pub param: CallParam,
}

impl ServiceCall {
    fn new(domain: &'static str, service: &'static str, device: &DeviceName, param: CallParam) -> Self {
        Self {
            domain,
            service,
            device: device.clone(),
            param,
        }
    }
}

/// A SelectX10 write needs two calls; everything else needs one.
pub type CallSet = Vec<ServiceCall, 2>;

fn one(call: ServiceCall) -> CallSet {
    let mut set = CallSet::new();
    let _ = set.push(call);
    set
}

/// Build the call set that drives `act` to `value` (0-100).
///
/// Non-dimmable switch kinds degrade to on/off: zero turns the device
/// off, anything else turns it on.
pub fn set_value(act: &Actuator, value: u8) -> CallSet {
    match (act.kind, act.quirk) {
        (ActuatorKind::Light, _) => one(ServiceCall::new(
            "light",
            "turn_on",
            &act.name,
            CallParam::BrightnessPct(value),
        )),
        (k, Quirk::LightVerb) if k.is_fan() => one(ServiceCall::new(
            "light",
            "turn_on",
            &act.name,
            CallParam::BrightnessPct(value),
        )),
        (k, Quirk::SelectX10) if k.is_fan() => {
            let mut set = one(ServiceCall::new(
                "select",
                "select_option",
                &act.name,
                CallParam::Choice("On"),
            ));
            let _ = set.push(ServiceCall::new(
                "number",
                "set_value",
                &act.name,
                CallParam::Value(f32::from(value) / 10.0),
            ));
            set
        }
        (k, _) if k.is_fan() => one(ServiceCall::new(
            "fan",
            "set_percentage",
            &act.name,
            CallParam::Percentage(value),
        )),
        (ActuatorKind::Climate, _) => one(ServiceCall::new(
            "climate",
            "set_hvac_mode",
            &act.name,
            CallParam::HvacMode(if value > 0 { "heat" } else { "off" }),
        )),
        _ => {
            if value > 0 {
                turn_on(act)
            } else {
                turn_off(act)
            }
        }
    }
}

/// Build the call set that switches `act` on.
pub fn turn_on(act: &Actuator) -> CallSet {
    match (act.kind, act.quirk) {
        (ActuatorKind::Light, _) => one(ServiceCall::new("light", "turn_on", &act.name, CallParam::None)),
        (k, Quirk::LightVerb) if k.is_fan() => {
            one(ServiceCall::new("light", "turn_on", &act.name, CallParam::None))
        }
        (k, Quirk::SelectX10) if k.is_fan() => one(ServiceCall::new(
            "select",
            "select_option",
            &act.name,
            CallParam::Choice("On"),
        )),
        (k, _) if k.is_fan() => one(ServiceCall::new("fan", "turn_on", &act.name, CallParam::None)),
        (ActuatorKind::Climate, _) => one(ServiceCall::new(
            "climate",
            "set_hvac_mode",
            &act.name,
            CallParam::HvacMode("heat"),
        )),
        _ => one(ServiceCall::new("switch", "turn_on", &act.name, CallParam::None)),
    }
}

/// Build the call set that switches `act` off.
pub fn turn_off(act: &Actuator) -> CallSet {
    match (act.kind, act.quirk) {
        (ActuatorKind::Light, _) => one(ServiceCall::new("light", "turn_off", &act.name, CallParam::None)),
        (k, Quirk::LightVerb) if k.is_fan() => {
            one(ServiceCall::new("light", "turn_off", &act.name, CallParam::None))
        }
        (k, Quirk::SelectX10) if k.is_fan() => one(ServiceCall::new(
            "select",
            "select_option",
            &act.name,
            CallParam::Choice("Off"),
        )),
        (k, _) if k.is_fan() => one(ServiceCall::new("fan", "turn_off", &act.name, CallParam::None)),
        (ActuatorKind::Climate, _) => one(ServiceCall::new(
            "climate",
            "set_hvac_mode",
            &act.name,
            CallParam::HvacMode("off"),
        )),
        _ => one(ServiceCall::new("switch", "turn_off", &act.name, CallParam::None)),
    }
}
