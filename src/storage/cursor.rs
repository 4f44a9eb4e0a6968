//! Write cursor persisted in the last two bytes of the store.
//!
//! Stored big-endian: high byte at `len - 2`, low byte at `len - 1`.
//! No range check happens here; [`StorageRegion`](super::StorageRegion)
//! validates the value it restores.

use crate::app::ports::ByteStore;
use crate::config::CURSOR_WIDTH;
use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistentCursor {
    addr: usize,
}

impl PersistentCursor {
    /// Cursor occupying the final [`CURSOR_WIDTH`] bytes of `store`.
    pub fn at_tail<S: ByteStore>(store: &S) -> Self {
        Self {
            addr: store.len().saturating_sub(usize::from(CURSOR_WIDTH)),
        }
    }

    /// First byte of the cursor area.
    pub fn addr(&self) -> usize {
        self.addr
    }

    pub fn load<S: ByteStore>(&self, store: &S) -> Result<u16, StorageError> {
        let high = store.read(self.addr)?;
        let low = store.read(self.addr + 1)?;
        Ok(u16::from_be_bytes([high, low]))
    }

    /// Write `offset` and commit it.
    ///
    /// If the commit fails the previous bytes are written back, so a later
    /// commit cannot persist an offset that was never acknowledged.
    pub fn store<S: ByteStore>(&self, store: &mut S, offset: u16) -> Result<(), StorageError> {
        let previous = [store.read(self.addr)?, store.read(self.addr + 1)?];
        let [high, low] = offset.to_be_bytes();
        store.write(self.addr, high)?;
        store.write(self.addr + 1, low)?;

        store.commit().inspect_err(|_| {
            // Same addresses were just written, so these cannot fail.
            let _ = store.write(self.addr, previous[0]);
            let _ = store.write(self.addr + 1, previous[1]);
        })
    }
}
