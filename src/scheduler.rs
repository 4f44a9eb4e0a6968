//! Sampling loop.
//!
//! One cycle is a capacity check, a sample, then a cooperative wait for
//! the rest of the interval. The wait is cut into sub-ticks of at most
//! `sub_tick_ms`. Each sub-tick flips the indicator, polls the console
//! once, and sleeps, so blinking and commands keep going without a
//! second thread of control.
//!
//! ```text
//!            has capacity
//!   ┌───────┐ ─────────────▶ sample + write ──▶ ┌──────────────┐
//!   │ Check │                                   │ Wait(ticks)  │──┐ sub-tick:
//!   └───────┘ ◀──────────── ticks exhausted ─── └──────────────┘◀─┘ toggle, poll, sleep
//!     │  ▲
//!     └──┘ full: indicator solid, poll console, re-check at once
//! ```
//!
//! A full region is re-checked in a tight loop with no sleep. The console
//! is still polled once per pass so a clear can bring sampling back.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::commands::{self, Command};
use crate::app::events::LoggerEvent;
use crate::app::ports::{ByteStore, Clock, EventSink, SerialPort};
use crate::config::LoggerConfig;
use crate::drivers::status_led::StatusIndicator;
use crate::error;
use crate::sensors::temperature::TemperatureSensor;
use crate::storage::StorageRegion;

// ═══════════════════════════════════════════════════════════════
//  Wait decomposition
// ═══════════════════════════════════════════════════════════════

/// Remaining wait, handed out in chunks of at most `sub_tick_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubTicks {
    remaining_ms: u32,
    sub_tick_ms: u32,
}

impl SubTicks {
    pub fn new(total_ms: u32, sub_tick_ms: u32) -> Self {
        Self {
            remaining_ms: total_ms,
            sub_tick_ms: sub_tick_ms.max(1),
        }
    }

    /// Wait left in a cycle of `interval_ms` after `elapsed_ms` of work.
    /// Overrunning the interval leaves nothing to wait.
    pub fn for_cycle(interval_ms: u32, elapsed_ms: u64, sub_tick_ms: u32) -> Self {
        let elapsed = u32::try_from(elapsed_ms).unwrap_or(u32::MAX);
        Self::new(interval_ms.saturating_sub(elapsed), sub_tick_ms)
    }

    pub fn remaining_ms(&self) -> u32 {
        self.remaining_ms
    }

    pub fn is_empty(&self) -> bool {
        self.remaining_ms == 0
    }
}

impl Iterator for SubTicks {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining_ms == 0 {
            return None;
        }
        let step = self.remaining_ms.min(self.sub_tick_ms);
        self.remaining_ms -= step;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining_ms.div_ceil(self.sub_tick_ms) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SubTicks {}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// About to check capacity and take a sample.
    Check,
    /// Waiting out the rest of the interval.
    Wait(SubTicks),
}

/// What one [`Scheduler::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// No capacity; nothing sampled, no wait.
    Full { command: Option<Command> },
    /// A sample was persisted at `offset`.
    Sampled { offset: u16, celsius: f32 },
    /// A sample was taken but could not be persisted.
    SampleDropped { celsius: f32 },
    /// One wait sub-tick ran.
    SubTick { duration_ms: u32, command: Option<Command> },
}

pub struct Scheduler<S: ByteStore, I, P> {
    region: StorageRegion<S>,
    sensor: TemperatureSensor<I>,
    indicator: StatusIndicator<P>,
    interval_ms: u32,
    sub_tick_ms: u32,
    state: CycleState,
}

impl<S, I, P> Scheduler<S, I, P>
where
    S: ByteStore,
    I: I2c,
    P: OutputPin,
{
    pub fn new(
        config: &LoggerConfig,
        region: StorageRegion<S>,
        sensor: TemperatureSensor<I>,
        indicator: StatusIndicator<P>,
    ) -> Self {
        Self {
            region,
            sensor,
            indicator,
            interval_ms: config.sample_interval_ms,
            sub_tick_ms: config.sub_tick_ms,
            state: CycleState::Check,
        }
    }

    /// Restore the cursor, select the sensor register and report the
    /// restored offset.
    ///
    /// An invalid config or an unusable store is fatal; a sensor that does not answer is
    /// reported and sampling goes ahead with degraded readings.
    pub fn boot(
        config: &LoggerConfig,
        store: S,
        i2c: I,
        pin: P,
        sink: &mut impl EventSink,
    ) -> error::Result<Self> {
        config.validate()?;
        let region = StorageRegion::restore(store)?;
        if region.record_area_len() != config.record_area_len() {
            warn!(
                "Scheduler: store holds {} record bytes, config expects {}",
                region.record_area_len(),
                config.record_area_len()
            );
        }
        sink.emit(&LoggerEvent::Restored {
            offset: region.cursor(),
        });

        let mut sensor = TemperatureSensor::new(i2c, config.sensor_address);
        if let Err(e) = sensor.init() {
            sink.emit(&LoggerEvent::FaultIgnored(e.into()));
        }

        info!(
            "Scheduler: {} slots, sampling every {} ms, sub-tick {} ms",
            config.slot_count(),
            config.sample_interval_ms,
            config.sub_tick_ms
        );
        Ok(Self::new(config, region, sensor, StatusIndicator::new(pin)))
    }

    /// Perform one state transition.
    pub fn step<T, C, D, E>(
        &mut self,
        serial: &mut T,
        clock: &C,
        delay: &mut D,
        sink: &mut E,
    ) -> StepOutcome
    where
        T: SerialPort,
        C: Clock,
        D: DelayNs,
        E: EventSink,
    {
        match self.state {
            CycleState::Check => self.check_and_sample(serial, clock, sink),
            CycleState::Wait(mut ticks) => {
                let Some(duration_ms) = ticks.next() else {
                    self.state = CycleState::Check;
                    return self.check_and_sample(serial, clock, sink);
                };

                self.indicator.toggle();
                let command = commands::poll(serial, &mut self.region, sink);
                delay.delay_ms(duration_ms);

                self.state = if ticks.is_empty() {
                    CycleState::Check
                } else {
                    CycleState::Wait(ticks)
                };
                StepOutcome::SubTick {
                    duration_ms,
                    command,
                }
            }
        }
    }

    /// Step forever.
    pub fn run<T, C, D, E>(&mut self, serial: &mut T, clock: &C, delay: &mut D, sink: &mut E) -> !
    where
        T: SerialPort,
        C: Clock,
        D: DelayNs,
        E: EventSink,
    {
        loop {
            self.step(serial, clock, delay, sink);
        }
    }

    fn check_and_sample<T, C, E>(&mut self, serial: &mut T, clock: &C, sink: &mut E) -> StepOutcome
    where
        T: SerialPort,
        C: Clock,
        E: EventSink,
    {
        if !self.region.has_capacity() {
            if self.indicator.set_solid_on() {
                sink.emit(&LoggerEvent::StorageFull {
                    offset: self.region.cursor(),
                });
            }
            let command = commands::poll(serial, &mut self.region, sink);
            return StepOutcome::Full { command };
        }
        self.indicator.resume_blinking();

        let started_ms = clock.now_ms();
        let celsius = self.sensor.read_temperature();
        let outcome = match self.region.write_record(celsius) {
            Ok(offset) => {
                sink.emit(&LoggerEvent::Sampled { offset, celsius });
                StepOutcome::Sampled { offset, celsius }
            }
            Err(e) => {
                sink.emit(&LoggerEvent::FaultIgnored(e.into()));
                StepOutcome::SampleDropped { celsius }
            }
        };

        let elapsed_ms = clock.now_ms().saturating_sub(started_ms);
        let ticks = SubTicks::for_cycle(self.interval_ms, elapsed_ms, self.sub_tick_ms);
        self.state = if ticks.is_empty() {
            CycleState::Check
        } else {
            CycleState::Wait(ticks)
        };
        outcome
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn region(&self) -> &StorageRegion<S> {
        &self.region
    }

    pub fn indicator(&self) -> &StatusIndicator<P> {
        &self.indicator
    }

    /// Tear down, returning the store as a power cut would leave it
    /// reachable.
    pub fn into_store(self) -> S {
        self.region.into_store()
    }
}
