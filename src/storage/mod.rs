//! Storage region — fill-once record log over a small byte store.
//!
//! ```text
//!  0                                len-2      len
//!  ├──────┬──────┬──────┬─── ··· ───┼──────────┤
//!  │ slot │ slot │ slot │           │  cursor  │
//!  └──────┴──────┴──────┴─── ··· ───┴──────────┘
//!   record area (2-byte slots)        big-endian u16
//! ```
//!
//! The cursor is the only record of how much has been written. A record
//! is committed before the cursor that covers it, so after a power loss
//! the cursor lags or matches the written data but never leads it.

pub mod codec;
pub mod cursor;

use log::{debug, info, warn};

use crate::app::ports::ByteStore;
use crate::config::{CURSOR_WIDTH, SLOT_WIDTH};
use crate::error::{Error, StorageError};
use cursor::PersistentCursor;

/// One decoded slot of the record area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    /// Byte offset of the slot.
    pub offset: u16,
    pub celsius: f32,
}

/// Owns the byte store and the in-memory mirror of its cursor.
pub struct StorageRegion<S: ByteStore> {
    store: S,
    tail: PersistentCursor,
    cursor: u16,
    record_area_len: u16,
}

impl<S: ByteStore> StorageRegion<S> {
    /// Take ownership of `store` and restore the cursor from its tail.
    ///
    /// A cursor that is odd or past the record area (e.g. an erased store
    /// reading `0xFFFF`) means the store was never provisioned; it is
    /// reset to 0 and persisted.
    pub fn restore(mut store: S) -> Result<Self, Error> {
        let len = store.len();
        let min_len = usize::from(CURSOR_WIDTH + SLOT_WIDTH);
        if len < min_len || len - usize::from(CURSOR_WIDTH) > usize::from(u16::MAX) {
            return Err(Error::Init("byte store size unusable for a record log"));
        }
        // An odd trailing byte belongs to no slot.
        let record_area_len = (len - usize::from(CURSOR_WIDTH)) as u16 / SLOT_WIDTH * SLOT_WIDTH;
        let tail = PersistentCursor::at_tail(&store);

        let mut cursor = tail.load(&store)?;
        if cursor > record_area_len || cursor % SLOT_WIDTH != 0 {
            warn!(
                "Storage: cursor {} invalid for {}-byte record area, provisioning",
                cursor, record_area_len
            );
            tail.store(&mut store, 0)?;
            cursor = 0;
        }

        info!(
            "Storage: {} of {} slots used",
            cursor / SLOT_WIDTH,
            record_area_len / SLOT_WIDTH
        );

        Ok(Self {
            store,
            tail,
            cursor,
            record_area_len,
        })
    }

    /// Offset of the next free slot.
    pub fn cursor(&self) -> u16 {
        self.cursor
    }

    pub fn record_area_len(&self) -> u16 {
        self.record_area_len
    }

    /// Number of records written since the last clear.
    pub fn record_count(&self) -> u16 {
        self.cursor / SLOT_WIDTH
    }

    pub fn has_capacity(&self) -> bool {
        self.cursor < self.record_area_len
    }

    /// Append one record and persist the advanced cursor.
    ///
    /// Returns the offset the record was written at. Without capacity the
    /// store is left untouched and [`StorageError::Full`] is returned.
    /// On any failure the in-memory cursor stays where it was.
    pub fn write_record(&mut self, celsius: f32) -> Result<u16, StorageError> {
        if !self.has_capacity() {
            return Err(StorageError::Full);
        }
        let offset = self.cursor;

        codec::write_at(&mut self.store, usize::from(offset), celsius)?;
        self.store.commit()?;

        let next = offset + SLOT_WIDTH;
        self.tail.store(&mut self.store, next)?;
        self.cursor = next;

        debug!("Storage: slot {} written, cursor -> {}", offset, next);
        Ok(offset)
    }

    /// Lazy pass over every written slot, oldest first.
    ///
    /// Calling it again starts a fresh pass.
    pub fn records(&self) -> Records<'_, S> {
        Records {
            store: &self.store,
            next: 0,
            end: self.cursor,
        }
    }

    /// Forget every record. The old bytes stay until overwritten.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.tail.store(&mut self.store, 0)?;
        self.cursor = 0;
        info!("Storage: cleared");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the byte store back, dropping the in-memory cursor.
    pub fn into_store(self) -> S {
        self.store
    }
}

/// Iterator returned by [`StorageRegion::records`].
pub struct Records<'a, S: ByteStore> {
    store: &'a S,
    next: u16,
    end: u16,
}

impl<S: ByteStore> Iterator for Records<'_, S> {
    type Item = Result<Record, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let offset = self.next;
        self.next += SLOT_WIDTH;
        let record = codec::read_at(self.store, usize::from(offset))
            .map(|celsius| Record { offset, celsius });
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(self.end.saturating_sub(self.next) / SLOT_WIDTH);
        (remaining, Some(remaining))
    }
}

impl<S: ByteStore> ExactSizeIterator for Records<'_, S> {}
