//! Grow-room control core library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection.  Host-specific code lives behind the port traits in
//! [`app::ports`]; everything else is platform-free.

#![deny(unused_must_use)]

pub mod actuator;
pub mod adapters;
pub mod app;
pub mod capability;
pub mod config;
pub mod error;
pub mod predict;
pub mod stage;
