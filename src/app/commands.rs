//! Single-character serial commands.
//!
//! | Byte | Command | Output                                         |
//! |------|---------|------------------------------------------------|
//! | `r`  | Dump    | `-----`, one `[offset]value` line per record, `-----` |
//! | `c`  | Clear   | `clear`                                        |
//!
//! Anything else is ignored. A dump runs to completion before returning,
//! so its length holds up the sampling loop for that long.

use core::fmt::Write as _;

use log::info;

use super::events::LoggerEvent;
use super::ports::{ByteStore, EventSink, SerialPort};
use crate::error::Error;
use crate::storage::StorageRegion;

/// Line printed before and after a dump.
pub const DUMP_DELIMITER: &str = "-----";

/// Line printed after a clear.
pub const CLEAR_CONFIRMATION: &str = "clear";

/// Longest dump line is `[65534]257.55`.
const LINE_CAP: usize = 16;

/// Commands accepted on the serial console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print every stored record.
    Dump,
    /// Discard every stored record.
    Clear,
}

impl Command {
    /// Case-sensitive.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'r' => Some(Self::Dump),
            b'c' => Some(Self::Clear),
            _ => None,
        }
    }
}

/// Check the console once without blocking and run whatever arrived.
///
/// Returns the command that ran. Failures are reported as
/// [`LoggerEvent::FaultIgnored`] and otherwise swallowed.
pub fn poll<P, S, E>(serial: &mut P, region: &mut StorageRegion<S>, sink: &mut E) -> Option<Command>
where
    P: SerialPort,
    S: ByteStore,
    E: EventSink,
{
    let byte = match serial.try_read() {
        Ok(Some(byte)) => byte,
        Ok(None) => return None,
        Err(e) => {
            sink.emit(&LoggerEvent::FaultIgnored(e.into()));
            return None;
        }
    };

    let command = Command::from_byte(byte)?;
    info!("Command: {:?}", command);
    if let Err(e) = execute(command, serial, region, sink) {
        sink.emit(&LoggerEvent::FaultIgnored(e));
    }
    Some(command)
}

/// Run `command` against the storage region.
pub fn execute<P, S, E>(
    command: Command,
    serial: &mut P,
    region: &mut StorageRegion<S>,
    sink: &mut E,
) -> Result<(), Error>
where
    P: SerialPort,
    S: ByteStore,
    E: EventSink,
{
    match command {
        Command::Dump => {
            let records = dump(serial, region)?;
            sink.emit(&LoggerEvent::Dumped { records });
        }
        Command::Clear => {
            region.clear()?;
            serial.write_line(CLEAR_CONFIRMATION)?;
            sink.emit(&LoggerEvent::Cleared);
        }
    }
    Ok(())
}

/// Print the record area between delimiters. A failed read ends the
/// listing early but the closing delimiter is still printed.
fn dump<P: SerialPort, S: ByteStore>(
    serial: &mut P,
    region: &StorageRegion<S>,
) -> Result<u16, Error> {
    serial.write_line(DUMP_DELIMITER)?;

    let mut printed = 0u16;
    let mut failure = None;
    for record in region.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                failure = Some(e);
                break;
            }
        };
        let mut line = heapless::String::<LINE_CAP>::new();
        // Cannot overflow: offsets and decoded values are bounded.
        let _ = write!(line, "[{}]{:.2}", record.offset, record.celsius);
        serial.write_line(&line)?;
        printed += 1;
    }

    serial.write_line(DUMP_DELIMITER)?;
    match failure {
        Some(e) => Err(e.into()),
        None => Ok(printed),
    }
}
