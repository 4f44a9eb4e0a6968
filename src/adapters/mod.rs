//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements  | Connects to                 |
//! |------------|-------------|-----------------------------|
//! | `eeprom`   | ByteStore   | NVS blob / in-memory flash  |
//! | `log_sink` | EventSink   | Serial log output           |
//! | `nvs`      | ConfigPort  | NVS / in-memory store       |
//! | `serial`   | SerialPort  | UART0 / in-memory console   |
//! | `time`     | Clock       | ESP32 system timer          |

pub mod eeprom;
pub mod log_sink;
pub mod nvs;
pub mod serial;
pub mod time;
