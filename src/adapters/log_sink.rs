//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing logger events to the `log` facade
//! (the ESP-IDF logger on target, which goes to UART / USB-CDC).

use log::{info, warn};

use crate::app::events::LoggerEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`LoggerEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LoggerEvent) {
        match event {
            LoggerEvent::Restored { offset } => {
                info!("restored offset {}", offset);
            }
            LoggerEvent::Sampled { offset, celsius } => {
                info!("[{}] {:.2}", offset, celsius);
            }
            LoggerEvent::StorageFull { offset } => {
                warn!("FULL | record area exhausted at offset {}", offset);
            }
            LoggerEvent::Cleared => {
                info!("CLEAR | all records discarded");
            }
            LoggerEvent::Dumped { records } => {
                info!("DUMP | {} records", records);
            }
            LoggerEvent::FaultIgnored(e) => {
                warn!("FAULT | {} (ignored)", e);
            }
        }
    }
}
