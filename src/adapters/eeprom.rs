//! EEPROM emulation over a single NVS blob.
//!
//! Implements [`ByteStore`] for the logger. The ESP32-S3 has no byte-wise
//! EEPROM, so the whole store lives in RAM and each [`commit`] rewrites one
//! NVS blob. ESP-IDF commits a blob atomically, which gives the
//! all-or-nothing commit the storage region relies on.
//!
//! - **`target_os = "espidf"`** — blob `eeprom` in namespace `templog`.
//! - **`not(target_os = "espidf")`** — a second in-memory copy stands in
//!   for flash; [`NvsEeprom::power_cycle`] drops uncommitted writes.
//!
//! [`commit`]: ByteStore::commit

use log::{info, warn};

use crate::app::ports::ByteStore;
use crate::error::StorageError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

#[cfg(target_os = "espidf")]
const NAMESPACE: &str = "templog";
#[cfg(target_os = "espidf")]
const BLOB_KEY: &str = "eeprom";

/// Value of a byte that was never written.
const ERASED: u8 = 0xFF;

pub struct NvsEeprom {
    working: Vec<u8>,
    #[cfg(target_os = "espidf")]
    nvs: EspNvs<NvsDefault>,
    #[cfg(not(target_os = "espidf"))]
    flash: Vec<u8>,
}

impl NvsEeprom {
    /// Open the blob and load it into RAM.
    ///
    /// A missing blob, or one whose size does not match `size`, yields an
    /// erased store.
    #[cfg(target_os = "espidf")]
    pub fn new(
        partition: EspDefaultNvsPartition,
        size: usize,
    ) -> Result<Self, esp_idf_svc::sys::EspError> {
        let nvs = EspNvs::new(partition, NAMESPACE, true)?;
        let mut working = vec![ERASED; size];

        match nvs.blob_len(BLOB_KEY)? {
            Some(len) if len == size => {
                nvs.get_raw(BLOB_KEY, &mut working)?;
                info!("NvsEeprom: loaded {} bytes", size);
            }
            Some(len) => {
                warn!(
                    "NvsEeprom: stored blob is {} bytes, expected {}; starting erased",
                    len, size
                );
            }
            None => info!("NvsEeprom: no blob yet, starting erased"),
        }

        Ok(Self { working, nvs })
    }

    /// Simulated store, erased.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(size: usize) -> Self {
        info!("NvsEeprom: simulation backend ({} bytes)", size);
        Self {
            working: vec![ERASED; size],
            flash: vec![ERASED; size],
        }
    }

    /// Simulated store whose flash already holds `image`.
    #[cfg(not(target_os = "espidf"))]
    pub fn from_image(image: Vec<u8>) -> Self {
        Self {
            working: image.clone(),
            flash: image,
        }
    }

    /// Simulate a reset: RAM is reloaded from flash.
    #[cfg(not(target_os = "espidf"))]
    pub fn power_cycle(mut self) -> Self {
        if self.working != self.flash {
            warn!("NvsEeprom(sim): power cycle discards uncommitted writes");
        }
        self.working.clone_from(&self.flash);
        self
    }

    /// Committed contents.
    #[cfg(not(target_os = "espidf"))]
    pub fn flash(&self) -> &[u8] {
        &self.flash
    }
}

impl ByteStore for NvsEeprom {
    fn len(&self) -> usize {
        self.working.len()
    }

    fn read(&self, addr: usize) -> Result<u8, StorageError> {
        self.working
            .get(addr)
            .copied()
            .ok_or(StorageError::OutOfBounds { addr })
    }

    fn write(&mut self, addr: usize, value: u8) -> Result<(), StorageError> {
        let byte = self
            .working
            .get_mut(addr)
            .ok_or(StorageError::OutOfBounds { addr })?;
        *byte = value;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn commit(&mut self) -> Result<(), StorageError> {
        self.nvs.set_raw(BLOB_KEY, &self.working).map_err(|e| {
            warn!("NvsEeprom: commit failed ({})", e);
            StorageError::Io
        })?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn commit(&mut self) -> Result<(), StorageError> {
        self.flash.clone_from(&self.working);
        Ok(())
    }
}
