//! Inbound commands for the room service.

use crate::capability::Capability;

/// Commands arriving from the host (UI switches, automations, operators).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomCommand {
    /// Engage or release work mode across the room.
    SetWorkMode(bool),
    /// Enable or disable global bounds enforcement.
    SetBoundsControl(bool),
    /// The room light turned on or off (schedule or manual).
    SetLightState(bool),
    /// Drive a single capability directly, bypassing the cycle planner.
    Direct(DirectControl),
}

/// Manual control of one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectControl {
    SetValue { cap: Capability, value: u8 },
    TurnOn { cap: Capability },
    TurnOff { cap: Capability },
}
