//! Application core — pure domain logic, zero I/O.
//!
//! Command handling, outbound events and the **port traits** in [`ports`]
//! that keep this layer testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
