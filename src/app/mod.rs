//! Application layer — the hexagonal core and its boundary types.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
