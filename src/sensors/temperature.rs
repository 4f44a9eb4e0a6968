//! Two-wire digital temperature sensor (LM75B-compatible register map).
//!
//! The temperature register holds an 11-bit two's-complement value in the
//! top bits of a big-endian 16-bit word, in 1/8 °C steps:
//!
//! ```text
//!  MSB                         LSB
//!  [ D10 … D3 ][ D2 D1 D0 x x x x x ]
//! ```
//!
//! A failed transaction is not retried. The driver keeps returning the last
//! good register value (zero before the first success) and logs the fault.

use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::error::BusError;

/// Pointer value selecting the temperature register.
const TEMP_REGISTER: u8 = 0x00;

/// Degrees per LSB after discarding the five unused low bits.
const CELSIUS_PER_LSB: f32 = 0.125;

/// Convert a raw register word into degrees Celsius.
pub fn raw_to_celsius(raw: i16) -> f32 {
    // Arithmetic shift keeps the sign.
    f32::from(raw >> 5) * CELSIUS_PER_LSB
}

pub struct TemperatureSensor<I> {
    i2c: I,
    address: u8,
    last_raw: i16,
}

impl<I: I2c> TemperatureSensor<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            last_raw: 0,
        }
    }

    /// Point the sensor at its temperature register.
    ///
    /// Later reads return that register without another pointer write.
    pub fn init(&mut self) -> Result<(), BusError> {
        self.i2c
            .write(self.address, &[TEMP_REGISTER])
            .map_err(|e| BusError::from_hal(&e))?;
        info!("Temperature: sensor 0x{:02X} ready", self.address);
        Ok(())
    }

    /// Read the raw register word in a single two-byte transaction.
    pub fn try_read_raw(&mut self) -> Result<i16, BusError> {
        let mut buf = [0u8; 2];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|e| BusError::from_hal(&e))?;
        Ok(i16::from_be_bytes(buf))
    }

    /// Current temperature, falling back to the last good reading.
    pub fn read_temperature(&mut self) -> f32 {
        match self.try_read_raw() {
            Ok(raw) => self.last_raw = raw,
            Err(e) => warn!(
                "Temperature: read from 0x{:02X} failed ({}), reusing last value",
                self.address, e
            ),
        }
        raw_to_celsius(self.last_raw)
    }

    /// Hand the bus back.
    pub fn release(self) -> I {
        self.i2c
    }
}
