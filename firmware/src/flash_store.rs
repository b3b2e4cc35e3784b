//! Date/time record in one erase sector of NOR flash

use clock_core::hal::{HalError, Persistence};
use embedded_storage::nor_flash::NorFlash;

/// Bytes in one saved record
pub const RECORD_LEN: usize = 8;

/// Keeps the record at the start of the sector at `offset`
pub struct FlashStore<F> {
    flash: F,
    offset: u32,
}

impl<F: NorFlash> FlashStore<F> {
    /// `offset` must be sector aligned and inside the device
    pub fn new(flash: F, offset: u32) -> Result<Self, HalError> {
        let start = offset as usize;
        if start % F::ERASE_SIZE != 0
            || start + F::ERASE_SIZE > flash.capacity()
            || RECORD_LEN % F::WRITE_SIZE != 0
            || RECORD_LEN % F::READ_SIZE != 0
        {
            return Err(HalError::InvalidConfig);
        }
        Ok(Self { flash, offset })
    }

    pub fn release(self) -> F {
        self.flash
    }
}

impl<F: NorFlash> Persistence for FlashStore<F> {
    type Error = HalError;

    fn erase_and_write(&mut self, bytes: [u8; RECORD_LEN]) -> Result<(), Self::Error> {
        let end = self.offset + F::ERASE_SIZE as u32;
        self.flash.erase(self.offset, end).map_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::error!("flash erase at {=u32:#x} failed", self.offset);
            HalError::Storage
        })?;
        self.flash.write(self.offset, &bytes).map_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::error!("flash program at {=u32:#x} failed", self.offset);
            HalError::Storage
        })
    }

    fn read(&mut self) -> Option<[u8; RECORD_LEN]> {
        let mut bytes = [0u8; RECORD_LEN];
        self.flash.read(self.offset, &mut bytes).ok()?;
        Some(bytes)
    }
}
