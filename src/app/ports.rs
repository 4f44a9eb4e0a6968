//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Scheduler (domain)
//! ```
//!
//! Driven adapters (byte store, serial console, clock, event sinks,
//! config storage) implement these traits. The bus, the indicator pin and
//! the delay source use the `embedded-hal` traits directly, so any HAL
//! driver plugs in without an adapter.

use crate::config::LoggerConfig;
use crate::error::{SerialError, StorageError};

// ───────────────────────────────────────────────────────────────
// Byte store port (driven adapter: domain ↔ EEPROM / flash)
// ───────────────────────────────────────────────────────────────

/// Byte-addressed persistent store of fixed size.
///
/// Writes land in a working copy until [`commit`](Self::commit) makes them
/// durable. A power loss between two commits loses every write since the
/// earlier one, never part of a commit.
pub trait ByteStore {
    /// Total number of addressable bytes.
    fn len(&self) -> usize;

    /// Whether the store has no bytes at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read one byte.
    fn read(&self, addr: usize) -> Result<u8, StorageError>;

    /// Write one byte into the working copy.
    fn write(&mut self, addr: usize, value: u8) -> Result<(), StorageError>;

    /// Make all pending writes durable.
    fn commit(&mut self) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Serial port (driven adapter: domain ↔ UART console)
// ───────────────────────────────────────────────────────────────

/// Character stream carrying single-byte commands in and text lines out.
pub trait SerialPort {
    /// Non-blocking read.
    ///
    /// Returns `Ok(None)` when no byte is waiting.
    fn try_read(&mut self) -> Result<Option<u8>, SerialError>;

    /// Write `line` followed by a line terminator.
    fn write_line(&mut self, line: &str) -> Result<(), SerialError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock used to measure processing time.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`LoggerEvent`](super::events::LoggerEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::LoggerEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists logger configuration.
///
/// Implementations MUST validate before persisting. Invalid values are
/// rejected with [`ConfigError::ValidationFailed`], not clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`LoggerConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<LoggerConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&mut self, config: &LoggerConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}
