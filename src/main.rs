//! TempLogger Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  NvsEeprom      UartConsole    MonotonicClock   LogEventSink   │
//! │  (ByteStore)    (SerialPort)   (Clock)          (EventSink)    │
//! │  I2cDriver      PinDriver      FreeRtos                        │
//! │  (i2c::I2c)     (OutputPin)    (DelayNs)                       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Scheduler (pure logic)                    │    │
//! │  │  StorageRegion · TemperatureSensor · StatusIndicator   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use esp_idf_hal::uart::{self, UartDriver};
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use templogger::adapters::eeprom::NvsEeprom;
use templogger::adapters::log_sink::LogEventSink;
use templogger::adapters::nvs::NvsAdapter;
use templogger::adapters::serial::UartConsole;
use templogger::adapters::time::MonotonicClock;
use templogger::app::ports::ConfigPort;
use templogger::config::LoggerConfig;
use templogger::scheduler::Scheduler;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("TempLogger v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = NvsAdapter::new(nvs_partition.clone())?;
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            LoggerConfig::default()
        }
    };

    // ── 3. Peripherals ────────────────────────────────────────
    // I2C0: SDA = GPIO8, SCL = GPIO9 (standard-mode 100 kHz).
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8,
        peripherals.pins.gpio9,
        &I2cConfig::new().baudrate(100.kHz().into()),
    )?;

    // Status LED on GPIO2.
    let led = PinDriver::output(peripherals.pins.gpio2)?;

    // UART0 on the USB-serial bridge pins.
    let uart = UartDriver::new(
        peripherals.uart0,
        peripherals.pins.gpio43,
        peripherals.pins.gpio44,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart::config::Config::default().baudrate(Hertz(config.baud_rate)),
    )?;

    let store = NvsEeprom::new(nvs_partition, config.eeprom_size as usize)?;

    // ── 4. Construct adapters ─────────────────────────────────
    let mut serial = UartConsole::new(uart);
    let clock = MonotonicClock::new();
    let mut delay = FreeRtos;
    let mut log_sink = LogEventSink::new();

    // ── 5. Restore and run ────────────────────────────────────
    let mut scheduler = Scheduler::boot(&config, store, i2c, led, &mut log_sink)?;

    info!("System ready. Entering sampling loop.");
    scheduler.run(&mut serial, &clock, &mut delay, &mut log_sink)
}
