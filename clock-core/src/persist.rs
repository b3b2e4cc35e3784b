//! Eight-byte persisted record: packed date word then time word
//!
//! Both words are little-endian. An erased word (`0xFFFF_FFFF`) means
//! nothing was saved.

use crate::calendar::Date;
use crate::hal::Persistence;
use crate::types::CENTIS_PER_DAY;

const ERASED: u32 = 0xFFFF_FFFF;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SavedState {
    pub date: Date,
    pub time_cs: u32,
}

impl SavedState {
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&self.date.to_word().to_le_bytes());
        bytes[4..].copy_from_slice(&self.time_cs.to_le_bytes());
        bytes
    }

    /// `None` for erased or implausible records
    pub fn from_bytes(bytes: [u8; 8]) -> Option<Self> {
        let [a, b, c, d, e, f, g, h] = bytes;
        let date_word = u32::from_le_bytes([a, b, c, d]);
        let time_cs = u32::from_le_bytes([e, f, g, h]);
        if date_word == ERASED || time_cs == ERASED {
            return None;
        }
        let date = Date::from_word(date_word);
        if !date.is_valid() || time_cs >= CENTIS_PER_DAY {
            return None;
        }
        Some(Self { date, time_cs })
    }
}

/// Read back the saved record, if any
pub fn load<P: Persistence>(store: &mut P) -> Option<SavedState> {
    store.read().and_then(SavedState::from_bytes)
}

pub fn save<P: Persistence>(store: &mut P, state: &SavedState) -> Result<(), P::Error> {
    store.erase_and_write(state.to_bytes())
}
