//! Logger configuration parameters
//!
//! All tunable parameters for the temperature logger.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

/// Width of one encoded record in bytes.
pub const SLOT_WIDTH: u16 = 2;

/// Bytes reserved at the tail of the store for the write cursor.
pub const CURSOR_WIDTH: u16 = 2;

/// Core logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    // --- Storage ---
    /// Total size of the persistent byte store, cursor included
    pub eeprom_size: u32,

    // --- Timing ---
    /// Time between two samples (milliseconds)
    pub sample_interval_ms: u32,
    /// Upper bound of one cooperative wait step (milliseconds)
    pub sub_tick_ms: u32,

    // --- Peripherals ---
    /// 7-bit bus address of the temperature sensor
    pub sensor_address: u8,
    /// Serial console baud rate
    pub baud_rate: u32,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            // Storage
            eeprom_size: 512,

            // Timing
            sample_interval_ms: 60_000, // 1/min
            sub_tick_ms: 1000,          // 1 Hz blink and command poll

            // Peripherals
            sensor_address: 0x48,
            baud_rate: 115_200,
        }
    }
}

impl LoggerConfig {
    /// Length of the record area: the store minus the cursor bytes,
    /// rounded down to whole slots. Zero for a store too small to hold a
    /// cursor.
    pub fn record_area_len(&self) -> u16 {
        let bytes = self.eeprom_size.saturating_sub(u32::from(CURSOR_WIDTH));
        let bytes = u16::try_from(bytes).unwrap_or(u16::MAX);
        bytes / SLOT_WIDTH * SLOT_WIDTH
    }

    /// Number of records the store holds when full.
    pub fn slot_count(&self) -> u16 {
        self.record_area_len() / SLOT_WIDTH
    }

    /// Reject out-of-range values. Nothing is clamped.
    pub fn validate(&self) -> Result<(), crate::error::Error> {
        use crate::error::Error;

        if self.eeprom_size < 4 {
            return Err(Error::Config("eeprom_size must hold a cursor and one slot"));
        }
        if self.eeprom_size % u32::from(SLOT_WIDTH) != 0 {
            return Err(Error::Config("eeprom_size must be even"));
        }
        if self.eeprom_size > u32::from(u16::MAX) + u32::from(CURSOR_WIDTH) {
            return Err(Error::Config("eeprom_size exceeds the 16-bit cursor range"));
        }
        if !(1..=1000).contains(&self.sub_tick_ms) {
            return Err(Error::Config("sub_tick_ms must be 1–1000"));
        }
        if self.sample_interval_ms < self.sub_tick_ms {
            return Err(Error::Config("sample_interval_ms must be >= sub_tick_ms"));
        }
        if self.sensor_address > 0x7F {
            return Err(Error::Config("sensor_address must be a 7-bit address"));
        }
        if self.baud_rate == 0 {
            return Err(Error::Config("baud_rate must be non-zero"));
        }
        Ok(())
    }
}
