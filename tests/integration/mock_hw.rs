//! Mock hardware for integration tests.
//!
//! Simulated time is shared between the clock, the delay source and the
//! sensor bus so tests can model processing time and assert on every
//! sleep the scheduler requested.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::i2c::{ErrorKind, ErrorType as I2cErrorType, I2c, Operation};
use templogger::adapters::serial::UartConsole;
use templogger::app::events::LoggerEvent;
use templogger::app::ports::{Clock, EventSink, SerialPort};
use templogger::error::SerialError;

// ── Simulated time ────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct SimTime(Rc<Cell<u64>>);

impl SimTime {
    pub fn now(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for SimTime {
    fn now_ms(&self) -> u64 {
        self.now()
    }
}

/// Delay that advances simulated time and records each request.
pub struct SimDelay {
    time: SimTime,
    pub sleeps: Vec<u32>,
}

impl SimDelay {
    pub fn new(time: SimTime) -> Self {
        Self {
            time,
            sleeps: Vec::new(),
        }
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.time.advance(u64::from(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleeps.push(ms);
        self.time.advance(u64::from(ms));
    }
}

// ── Sensor bus ────────────────────────────────────────────────

/// Scripted LM75-style sensor. Repeats the final reading once the script
/// runs out.
pub struct FakeSensorBus {
    readings: Vec<f32>,
    next: usize,
    time: SimTime,
    read_cost_ms: u64,
    pub fail: bool,
    pub pointer_writes: Rc<Cell<usize>>,
}

#[allow(dead_code)]
impl FakeSensorBus {
    pub fn with_celsius(time: SimTime, readings: &[f32]) -> Self {
        Self {
            readings: readings.to_vec(),
            next: 0,
            time,
            read_cost_ms: 0,
            fail: false,
            pointer_writes: Rc::new(Cell::new(0)),
        }
    }

    /// Every read advances simulated time by `ms`.
    pub fn read_cost(mut self, ms: u64) -> Self {
        self.read_cost_ms = ms;
        self
    }

    /// Every transaction fails with a NACK.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn next_raw(&mut self) -> i16 {
        let idx = self.next.min(self.readings.len().saturating_sub(1));
        self.next += 1;
        let celsius = self.readings.get(idx).copied().unwrap_or(0.0);
        ((celsius / 0.125) as i16) << 5
    }
}

impl I2cErrorType for FakeSensorBus {
    type Error = ErrorKind;
}

impl I2c for FakeSensorBus {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail {
            return Err(ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Address,
            ));
        }
        for op in operations {
            match op {
                Operation::Write(_) => self.pointer_writes.set(self.pointer_writes.get() + 1),
                Operation::Read(buf) => {
                    self.time.advance(self.read_cost_ms);
                    buf.copy_from_slice(&self.next_raw().to_be_bytes());
                }
            }
        }
        Ok(())
    }
}

// ── Indicator pin ─────────────────────────────────────────────

/// Output pin recording every level written.
#[derive(Clone, Default)]
pub struct RecordingPin {
    pub levels: Rc<RefCell<Vec<bool>>>,
}

#[allow(dead_code)]
impl RecordingPin {
    pub fn writes(&self) -> usize {
        self.levels.borrow().len()
    }

    pub fn is_high(&self) -> bool {
        self.levels.borrow().last().copied().unwrap_or(false)
    }
}

impl PinErrorType for RecordingPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

// ── Console ───────────────────────────────────────────────────

/// Simulated UART console that counts polls.
#[derive(Default)]
pub struct CountingConsole {
    pub inner: UartConsole,
    pub polls: usize,
}

impl SerialPort for CountingConsole {
    fn try_read(&mut self) -> Result<Option<u8>, SerialError> {
        self.polls += 1;
        self.inner.try_read()
    }

    fn write_line(&mut self, line: &str) -> Result<(), SerialError> {
        self.inner.write_line(line)
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<LoggerEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn sampled(&self) -> Vec<(u16, f32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                LoggerEvent::Sampled { offset, celsius } => Some((*offset, *celsius)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &LoggerEvent) {
        self.events.push(*event);
    }
}
