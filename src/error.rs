//! Unified error types for the GrowCell control core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! can be cheaply passed through the cycle pipeline without allocation.
//!
//! Every error in this module is non-fatal by policy: the control loop logs
//! the failure, degrades the current cycle, and keeps running.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level control-core error
// ---------------------------------------------------------------------------

/// Every fallible operation in the control core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor reading was unavailable or could not be interpreted.
    Sense(SenseError),
    /// An actuation command could not be carried out.
    Actuate(ActuateError),
    /// Configuration is invalid or a required entry is missing.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sense(e) => write!(f, "sense: {e}"),
            Self::Actuate(e) => write!(f, "actuate: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensing errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenseError {
    /// The platform reported a placeholder instead of a reading
    /// ("unavailable", "unknown", empty string).
    Unavailable,
    /// The raw state string did not parse as a number.
    NotNumeric,
    /// The reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SenseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "reading unavailable"),
            Self::NotNumeric => write!(f, "reading not numeric"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SenseError> for Error {
    fn from(e: SenseError) -> Self {
        Self::Sense(e)
    }
}

// ---------------------------------------------------------------------------
// Actuation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuateError {
    /// The underlying `invoke(domain, service, params)` call failed.
    InvokeFailed,
    /// A turn-on arrived inside the per-device cooldown window.
    RateLimited,
    /// No registered actuator provides the requested capability.
    NotRegistered,
    /// The actuator kind does not support the requested operation.
    Unsupported,
}

impl fmt::Display for ActuateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvokeFailed => write!(f, "service invocation failed"),
            Self::RateLimited => write!(f, "turn-on rate limited"),
            Self::NotRegistered => write!(f, "capability not registered"),
            Self::Unsupported => write!(f, "operation unsupported by device"),
        }
    }
}

impl From<ActuateError> for Error {
    fn from(e: ActuateError) -> Self {
        Self::Actuate(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed_by_subsystem() {
        let e: Error = SenseError::NotNumeric.into();
        assert_eq!(e.to_string(), "sense: reading not numeric");
        let e: Error = ActuateError::RateLimited.into();
        assert_eq!(e.to_string(), "actuate: turn-on rate limited");
    }
}
