//! Two-byte fixed-point record encoding.
//!
//! | Byte | Content |
//! |------|---------|
//! | 0    | integer part, truncated toward zero, stored as a raw byte |
//! | 1    | `(value - integer part) * 100`, truncated, stored as a raw byte |
//!
//! Decoding reads both bytes as unsigned. Non-negative values up to
//! 255.99 with two decimals survive a round trip; anything else wraps
//! through the raw byte casts without error.

use crate::app::ports::ByteStore;
use crate::error::StorageError;

/// Encode `celsius` into its two record bytes.
pub fn encode(celsius: f32) -> [u8; 2] {
    let whole = celsius as i32;
    let hundredths = ((celsius - whole as f32) * 100.0) as i32;
    // `as u8` on the i32 keeps the low byte, like a raw EEPROM write.
    [whole as u8, hundredths as u8]
}

/// Rebuild a value from its two record bytes.
pub fn decode(bytes: [u8; 2]) -> f32 {
    f32::from(bytes[0]) + f32::from(bytes[1]) / 100.0
}

/// Encode `celsius` into `store` at `addr` and `addr + 1`.
///
/// Only the working copy is touched; the caller commits.
pub fn write_at<S: ByteStore>(
    store: &mut S,
    addr: usize,
    celsius: f32,
) -> Result<(), StorageError> {
    let [whole, hundredths] = encode(celsius);
    store.write(addr, whole)?;
    store.write(addr + 1, hundredths)
}

/// Decode the record stored at `addr`.
pub fn read_at<S: ByteStore>(store: &S, addr: usize) -> Result<f32, StorageError> {
    Ok(decode([store.read(addr)?, store.read(addr + 1)?]))
}
