//! UART console adapter.
//!
//! Implements [`SerialPort`] for the command channel.
//!
//! - **`target_os = "espidf"`** — UART0 (the USB-serial bridge) through the
//!   `esp-idf-hal` UART driver, read with a zero timeout.
//! - **`not(target_os = "espidf")`** — an in-memory line buffer; input is
//!   queued with [`UartConsole::push_input`].

use crate::app::ports::SerialPort;
use crate::error::SerialError;

#[cfg(target_os = "espidf")]
use esp_idf_hal::{delay::NON_BLOCK, uart::UartDriver};

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

pub struct UartConsole {
    #[cfg(target_os = "espidf")]
    uart: UartDriver<'static>,
    #[cfg(not(target_os = "espidf"))]
    input: VecDeque<u8>,
    #[cfg(not(target_os = "espidf"))]
    output: Vec<String>,
}

impl UartConsole {
    #[cfg(target_os = "espidf")]
    pub fn new(uart: UartDriver<'static>) -> Self {
        Self { uart }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            input: VecDeque::new(),
            output: Vec::new(),
        }
    }

    /// Queue bytes as if typed on the console.
    #[cfg(not(target_os = "espidf"))]
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    /// Drain every line written so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn take_output(&mut self) -> Vec<String> {
        core::mem::take(&mut self.output)
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for UartConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialPort for UartConsole {
    #[cfg(target_os = "espidf")]
    fn try_read(&mut self) -> Result<Option<u8>, SerialError> {
        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte, NON_BLOCK) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Ok(None),
            Err(_) => Err(SerialError::Io),
        }
    }

    #[cfg(target_os = "espidf")]
    fn write_line(&mut self, line: &str) -> Result<(), SerialError> {
        self.uart
            .write(line.as_bytes())
            .and_then(|_| self.uart.write(b"\r\n"))
            .map(|_| ())
            .map_err(|_| SerialError::Io)
    }

    #[cfg(not(target_os = "espidf"))]
    fn try_read(&mut self) -> Result<Option<u8>, SerialError> {
        Ok(self.input.pop_front())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_line(&mut self, line: &str) -> Result<(), SerialError> {
        self.output.push(line.to_owned());
        Ok(())
    }
}
