//! Flash store over a RAM-backed NOR flash

use clock_core::hal::{HalError, Persistence};
use clock_core::{persist, Date, SavedState};
use clock_firmware::flash_store::FlashStore;
use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};

const SECTOR: usize = 256;
const SECTORS: usize = 4;

#[derive(Debug)]
struct FlashFault(NorFlashErrorKind);

impl NorFlashError for FlashFault {
    fn kind(&self) -> NorFlashErrorKind {
        self.0
    }
}

/// NOR semantics: erase sets bytes to 0xFF, programming only clears bits
struct RamFlash {
    cells: [u8; SECTOR * SECTORS],
    erases: usize,
    broken: bool,
}

impl RamFlash {
    fn new() -> Self {
        Self {
            cells: [0xFF; SECTOR * SECTORS],
            erases: 0,
            broken: false,
        }
    }
}

impl ErrorType for RamFlash {
    type Error = FlashFault;
}

impl ReadNorFlash for RamFlash {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let end = start + bytes.len();
        if end > self.cells.len() {
            return Err(FlashFault(NorFlashErrorKind::OutOfBounds));
        }
        bytes.copy_from_slice(&self.cells[start..end]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.cells.len()
    }
}

impl NorFlash for RamFlash {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = SECTOR;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if self.broken {
            return Err(FlashFault(NorFlashErrorKind::Other));
        }
        let (from, to) = (from as usize, to as usize);
        if from % SECTOR != 0 || to % SECTOR != 0 {
            return Err(FlashFault(NorFlashErrorKind::NotAligned));
        }
        self.cells[from..to].fill(0xFF);
        self.erases += 1;
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        if start % Self::WRITE_SIZE != 0 || bytes.len() % Self::WRITE_SIZE != 0 {
            return Err(FlashFault(NorFlashErrorKind::NotAligned));
        }
        for (cell, &b) in self.cells[start..start + bytes.len()].iter_mut().zip(bytes) {
            *cell &= b;
        }
        Ok(())
    }
}

#[test]
fn test_offset_must_be_sector_aligned() {
    assert!(matches!(
        FlashStore::new(RamFlash::new(), 100),
        Err(HalError::InvalidConfig)
    ));
    assert!(matches!(
        FlashStore::new(RamFlash::new(), (SECTOR * SECTORS) as u32),
        Err(HalError::InvalidConfig)
    ));
    assert!(FlashStore::new(RamFlash::new(), (SECTOR * 3) as u32).is_ok());
}

#[test]
fn test_cleared_store_has_no_data() {
    let mut store = FlashStore::new(RamFlash::new(), SECTOR as u32).unwrap();
    assert_eq!(store.read(), Some([0xFF; 8]));
    assert_eq!(persist::load(&mut store), None);
}

#[test]
fn test_record_round_trip() {
    let mut store = FlashStore::new(RamFlash::new(), SECTOR as u32).unwrap();
    let record = SavedState {
        date: Date::from_ymd_unchecked(2023, 6, 11),
        time_cs: 2_885_900,
    };
    persist::save(&mut store, &record).unwrap();
    assert_eq!(persist::load(&mut store), Some(record));

    // a second save erases first, so bits can be set again
    let later = SavedState {
        date: Date::from_ymd_unchecked(2024, 12, 31),
        time_cs: 8_639_999,
    };
    persist::save(&mut store, &later).unwrap();
    assert_eq!(persist::load(&mut store), Some(later));

    let flash = store.release();
    assert_eq!(flash.erases, 2);
    // neighbouring sectors untouched
    assert!(flash.cells[..SECTOR].iter().all(|&b| b == 0xFF));
    assert!(flash.cells[SECTOR + 8..].iter().all(|&b| b == 0xFF));
}

#[test]
fn test_erase_failure_maps_to_storage_error() {
    let mut flash = RamFlash::new();
    flash.broken = true;
    let mut store = FlashStore::new(flash, 0).unwrap();
    assert_eq!(store.erase_and_write([0; 8]), Err(HalError::Storage));
}
