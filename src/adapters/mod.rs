//! Driven adapters — host-side implementations of the port traits.
//!
//! Everything in here sits outside the hexagon: it speaks the host's
//! language (state strings, service buses, wall clocks) and translates to
//! the typed ports the domain consumes.

pub mod log_sink;
pub mod memory_store;
pub mod sim;
