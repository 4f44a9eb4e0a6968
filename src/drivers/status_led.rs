//! Single-pin status indicator.
//!
//! | Mode     | Pin                                    | Meaning          |
//! |----------|----------------------------------------|------------------|
//! | Blinking | flipped once per wait sub-tick         | logging          |
//! | SolidOn  | driven high once, then left alone      | storage is full  |
//!
//! The driver never schedules itself; the
//! [`Scheduler`](crate::scheduler::Scheduler) calls [`StatusIndicator::toggle`]
//! from its wait loop. Pin errors are logged and otherwise ignored.

use embedded_hal::digital::OutputPin;
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorMode {
    Blinking,
    SolidOn,
}

pub struct StatusIndicator<P> {
    pin: P,
    mode: IndicatorMode,
    lit: bool,
    toggles: u32,
}

impl<P: OutputPin> StatusIndicator<P> {
    /// Take the pin and start dark, in blinking mode.
    pub fn new(pin: P) -> Self {
        let mut indicator = Self {
            pin,
            mode: IndicatorMode::Blinking,
            lit: false,
            toggles: 0,
        };
        indicator.drive(false);
        indicator
    }

    /// Flip the pin. No effect while solid.
    pub fn toggle(&mut self) {
        if self.mode == IndicatorMode::SolidOn {
            return;
        }
        self.drive(!self.lit);
        self.toggles = self.toggles.wrapping_add(1);
    }

    /// Switch to solid-on. Returns `true` only on the call that switched.
    pub fn set_solid_on(&mut self) -> bool {
        if self.mode == IndicatorMode::SolidOn {
            return false;
        }
        self.mode = IndicatorMode::SolidOn;
        self.drive(true);
        info!("Indicator: solid on");
        true
    }

    /// Leave solid-on; the next toggle starts blinking from the lit state.
    pub fn resume_blinking(&mut self) {
        if self.mode == IndicatorMode::SolidOn {
            self.mode = IndicatorMode::Blinking;
            info!("Indicator: blinking");
        }
    }

    pub fn mode(&self) -> IndicatorMode {
        self.mode
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Toggles performed since construction.
    pub fn toggle_count(&self) -> u32 {
        self.toggles
    }

    fn drive(&mut self, lit: bool) {
        let result = if lit {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.lit = lit,
            Err(e) => warn!("Indicator: pin write failed ({:?})", e),
        }
    }
}
