//! Hardware Abstraction Layer for the clock
//!
//! The core only needs narrow contracts from the board: a display bus, a
//! switch bus, the on-board keys, persistent storage, a tone output and a
//! line-oriented serial writer.

use embedded_hal::delay::DelayNs;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// Expander bus transaction failed
    Bus,
    /// Flash erase, program or read failed
    Storage,
    /// Hardware not initialized
    NotInitialized,
    /// Invalid configuration
    InvalidConfig,
}

impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::Bus => write!(f, "Bus transaction failed"),
            HalError::Storage => write!(f, "Storage operation failed"),
            HalError::NotInitialized => write!(f, "Hardware not initialized"),
            HalError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Segment and column outputs of the multiplexed display
pub trait DisplayBus {
    type Error: From<HalError>;

    /// Drive the segment lines (bit 7 is the decimal point)
    fn write_segment(&mut self, code: u8) -> Result<(), Self::Error>;

    /// Drive the digit column enables
    fn write_column_mask(&mut self, mask: u8) -> Result<(), Self::Error>;

    /// Drive the LED bar, if the board has one
    fn write_leds(&mut self, _mask: u8) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// The eight front-panel switches
pub trait SwitchBus {
    /// Active-low switch vector; `0x00` signals a failed read
    fn read_switch_vector(&mut self) -> u8;
}

/// The two on-board push buttons
pub trait UserKeyInput {
    /// Active-low levels in bits 0 and 1
    fn read_user_keys(&mut self) -> u8;
}

/// Eight bytes of non-volatile storage
pub trait Persistence {
    type Error: From<HalError>;

    fn erase_and_write(&mut self, bytes: [u8; 8]) -> Result<(), Self::Error>;

    /// Raw stored bytes, `None` when the storage cannot be read
    fn read(&mut self) -> Option<[u8; 8]>;
}

/// Square-wave buzzer
pub trait ToneOutput {
    fn play(&mut self, freq_hz: u16);

    fn silence(&mut self);
}

/// Complete clock HAL interface
pub trait ClockHal {
    type Display: DisplayBus;
    type Switches: SwitchBus;
    type Keys: UserKeyInput;
    type Store: Persistence;
    type Tone: ToneOutput;
    type Serial: core::fmt::Write;
    type Delay: DelayNs;

    /// Access to the display bus
    fn display(&mut self) -> &mut Self::Display;

    /// Access to the switch bus
    fn switches(&mut self) -> &mut Self::Switches;

    /// Access to the on-board keys
    fn keys(&mut self) -> &mut Self::Keys;

    /// Access to persistent storage
    fn store(&mut self) -> &mut Self::Store;

    /// Access to the buzzer
    fn tone(&mut self) -> &mut Self::Tone;

    /// Access to the serial line output
    fn serial(&mut self) -> &mut Self::Serial;

    /// Access to a blocking delay
    fn delay(&mut self) -> &mut Self::Delay;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use crate::display::Frame;
    use crate::melody::Tone;
    use std::string::String;
    use std::vec::Vec;

    /// Records the last frame and counts lit refreshes
    #[derive(Default, Debug)]
    pub struct MockDisplay {
        segment: u8,
        column: u8,
        leds: u8,
        lit: usize,
        dark: usize,
        fail: bool,
    }

    impl MockDisplay {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn last_frame(&self) -> Frame {
            Frame {
                segment: self.segment,
                column: self.column,
            }
        }

        pub fn leds(&self) -> u8 {
            self.leds
        }

        /// Column writes with a non-zero mask
        pub fn lit_writes(&self) -> usize {
            self.lit
        }

        pub fn dark_writes(&self) -> usize {
            self.dark
        }

        pub fn set_failing(&mut self, fail: bool) {
            self.fail = fail;
        }
    }

    impl DisplayBus for MockDisplay {
        type Error = HalError;

        fn write_segment(&mut self, code: u8) -> Result<(), Self::Error> {
            if self.fail {
                return Err(HalError::Bus);
            }
            self.segment = code;
            Ok(())
        }

        fn write_column_mask(&mut self, mask: u8) -> Result<(), Self::Error> {
            if self.fail {
                return Err(HalError::Bus);
            }
            self.column = mask;
            if mask == 0 {
                self.dark += 1;
            } else {
                self.lit += 1;
            }
            Ok(())
        }

        fn write_leds(&mut self, mask: u8) -> Result<(), Self::Error> {
            self.leds = mask;
            Ok(())
        }
    }

    /// Active-low levels set by the test
    #[derive(Debug)]
    pub struct MockSwitches {
        vector: u8,
        keys: u8,
    }

    impl MockSwitches {
        pub fn new() -> Self {
            Self { vector: 0xFF, keys: 0xFF }
        }

        /// Hold switch `index` (1-based) down or let it go
        pub fn set_switch(&mut self, index: u8, pressed: bool) {
            let bit = 1 << (index - 1);
            if pressed {
                self.vector &= !bit;
            } else {
                self.vector |= bit;
            }
        }

        pub fn set_vector(&mut self, vector: u8) {
            self.vector = vector;
        }

        pub fn set_key(&mut self, bit: u8, pressed: bool) {
            if pressed {
                self.keys &= !(1 << bit);
            } else {
                self.keys |= 1 << bit;
            }
        }
    }

    impl Default for MockSwitches {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SwitchBus for MockSwitches {
        fn read_switch_vector(&mut self) -> u8 {
            self.vector
        }
    }

    impl UserKeyInput for MockSwitches {
        fn read_user_keys(&mut self) -> u8 {
            self.keys
        }
    }

    /// RAM-backed storage starting out erased
    #[derive(Debug)]
    pub struct MockStore {
        cells: [u8; 8],
        writes: usize,
        fail: bool,
    }

    impl MockStore {
        pub fn new() -> Self {
            Self {
                cells: [0xFF; 8],
                writes: 0,
                fail: false,
            }
        }

        pub fn with_bytes(cells: [u8; 8]) -> Self {
            Self { cells, ..Self::new() }
        }

        pub fn writes(&self) -> usize {
            self.writes
        }

        pub fn cells(&self) -> [u8; 8] {
            self.cells
        }

        pub fn set_failing(&mut self, fail: bool) {
            self.fail = fail;
        }
    }

    impl Default for MockStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Persistence for MockStore {
        type Error = HalError;

        fn erase_and_write(&mut self, bytes: [u8; 8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(HalError::Storage);
            }
            self.cells = bytes;
            self.writes += 1;
            Ok(())
        }

        fn read(&mut self) -> Option<[u8; 8]> {
            if self.fail {
                None
            } else {
                Some(self.cells)
            }
        }
    }

    /// Keeps every tone command in order
    #[derive(Default, Debug)]
    pub struct MockTone {
        log: Vec<Tone>,
    }

    impl MockTone {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn log(&self) -> &[Tone] {
            &self.log
        }

        pub fn is_sounding(&self) -> bool {
            matches!(self.log.last(), Some(Tone::Play(_)))
        }
    }

    impl ToneOutput for MockTone {
        fn play(&mut self, freq_hz: u16) {
            self.log.push(Tone::Play(freq_hz));
        }

        fn silence(&mut self) {
            self.log.push(Tone::Silence);
        }
    }

    /// Counts requested delay without sleeping
    #[derive(Default, Debug)]
    pub struct MockDelay {
        total_ns: u64,
    }

    impl MockDelay {
        pub fn total_ms(&self) -> u64 {
            self.total_ns / 1_000_000
        }
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    /// Mock hardware collection
    #[derive(Default, Debug)]
    pub struct MockClockHal {
        pub display: MockDisplay,
        pub switches: MockSwitches,
        pub store: MockStore,
        pub tone: MockTone,
        pub serial: String,
        pub delay: MockDelay,
    }

    impl MockClockHal {
        pub fn new() -> Self {
            Self::default()
        }

        /// Everything printed since the last call
        pub fn take_output(&mut self) -> String {
            core::mem::take(&mut self.serial)
        }
    }

    impl ClockHal for MockClockHal {
        type Display = MockDisplay;
        type Switches = MockSwitches;
        type Keys = MockSwitches;
        type Store = MockStore;
        type Tone = MockTone;
        type Serial = String;
        type Delay = MockDelay;

        fn display(&mut self) -> &mut MockDisplay {
            &mut self.display
        }

        fn switches(&mut self) -> &mut MockSwitches {
            &mut self.switches
        }

        fn keys(&mut self) -> &mut MockSwitches {
            &mut self.switches
        }

        fn store(&mut self) -> &mut MockStore {
            &mut self.store
        }

        fn tone(&mut self) -> &mut MockTone {
            &mut self.tone
        }

        fn serial(&mut self) -> &mut String {
            &mut self.serial
        }

        fn delay(&mut self) -> &mut MockDelay {
            &mut self.delay
        }
    }
}
