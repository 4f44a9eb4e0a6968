//! Fuzz target: `StorageRegion` over a simulated NVS EEPROM
//!
//! The first byte picks the store size (plus an arbitrary pre-existing
//! cursor), the rest is an op stream of write / clear / restart / dump.
//! Checks after every op:
//! - No panics, whatever the starting image
//! - The cursor is even and never passes the record area
//! - A full region rejects writes and leaves flash untouched
//! - A restart restores exactly the cursor that was committed
//! - A dump reads every written slot, in offset order, without error
//!
//! cargo fuzz run fuzz_storage_region

#![no_main]

use libfuzzer_sys::fuzz_target;
use templogger::adapters::eeprom::NvsEeprom;
use templogger::error::StorageError;
use templogger::storage::StorageRegion;

fuzz_target!(|data: &[u8]| {
    let Some((&size_seed, ops)) = data.split_first() else {
        return;
    };

    // 4..=259 bytes, odd sizes included.
    let len = usize::from(size_seed) + 4;
    let mut image = vec![0xFF; len];
    if let Some(&[high, low]) = ops.get(..2) {
        image[len - 2] = high;
        image[len - 1] = low;
    }

    let Ok(mut region) = StorageRegion::restore(NvsEeprom::from_image(image)) else {
        return;
    };

    for &op in ops {
        let before = region.cursor();
        match op % 5 {
            0 | 1 => {
                let celsius = f32::from(op) / 2.0 - 20.0;
                let flash = region.store().flash().to_vec();
                match region.write_record(celsius) {
                    Ok(offset) => assert_eq!(offset, before),
                    Err(StorageError::Full) => {
                        assert!(!region.has_capacity());
                        assert_eq!(region.store().flash(), flash.as_slice());
                    }
                    Err(e) => panic!("unexpected storage error: {e}"),
                }
            }
            2 => {
                region.clear().expect("clear on a healthy store");
                assert_eq!(region.cursor(), 0);
            }
            3 => {
                let store = region.into_store().power_cycle();
                region = StorageRegion::restore(store).expect("restore after restart");
                assert_eq!(region.cursor(), before, "restart changed the cursor");
            }
            _ => {
                for (i, record) in region.records().enumerate() {
                    let record = record.expect("dump read inside the record area");
                    assert_eq!(usize::from(record.offset), i * 2);
                }
            }
        }

        let cursor = region.cursor();
        assert_eq!(cursor % 2, 0, "cursor {cursor} is odd");
        assert!(cursor <= region.record_area_len());
        assert_eq!(region.records().count(), usize::from(cursor / 2));
    }
});
