//! Outbound logger events.
//!
//! The [`Scheduler`](crate::scheduler::Scheduler) and the command channel
//! emit these through the [`EventSink`](super::ports::EventSink) port.

use crate::error::Error;

/// Structured events emitted by the logger core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoggerEvent {
    /// Write cursor restored from storage at boot.
    Restored { offset: u16 },

    /// A sample was persisted at `offset`.
    Sampled { offset: u16, celsius: f32 },

    /// The record area is exhausted; the indicator went solid.
    StorageFull { offset: u16 },

    /// All records were discarded by a clear command.
    Cleared,

    /// A dump command printed `records` entries.
    Dumped { records: u16 },

    /// An I/O failure was swallowed to keep the loop running.
    FaultIgnored(Error),
}
