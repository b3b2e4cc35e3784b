//! In-memory board for bring-up without the expander bus
//!
//! Display writes, tone commands and flash writes are logged instead of
//! driven; switches and keys read as released unless a caller injects
//! levels. The serial writer and the delay are supplied by the caller.

use clock_core::hal::{
    ClockHal, DisplayBus, HalError, Persistence, SwitchBus, ToneOutput, UserKeyInput,
};
use embedded_hal::delay::DelayNs;

/// Display, switches and keys in one place
#[derive(Debug)]
pub struct LoopbackPanel {
    segment: u8,
    column: u8,
    leds: u8,
    switches: u8,
    keys: u8,
}

impl LoopbackPanel {
    pub const fn new() -> Self {
        Self {
            segment: 0,
            column: 0,
            leds: 0xFF,
            switches: 0xFF,
            keys: 0xFF,
        }
    }

    /// Last `(segment, column)` written
    pub fn output(&self) -> (u8, u8) {
        (self.segment, self.column)
    }

    pub fn leds(&self) -> u8 {
        self.leds
    }

    /// Inject an active-low switch vector
    pub fn set_switches(&mut self, vector: u8) {
        self.switches = vector;
    }

    /// Inject active-low key levels
    pub fn set_keys(&mut self, levels: u8) {
        self.keys = levels;
    }
}

impl Default for LoopbackPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBus for LoopbackPanel {
    type Error = HalError;

    fn write_segment(&mut self, code: u8) -> Result<(), Self::Error> {
        self.segment = code;
        Ok(())
    }

    fn write_column_mask(&mut self, mask: u8) -> Result<(), Self::Error> {
        self.column = mask;
        Ok(())
    }

    fn write_leds(&mut self, mask: u8) -> Result<(), Self::Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("leds {=u8:#04x}", mask);
        self.leds = mask;
        Ok(())
    }
}

impl SwitchBus for LoopbackPanel {
    fn read_switch_vector(&mut self) -> u8 {
        self.switches
    }
}

impl UserKeyInput for LoopbackPanel {
    fn read_user_keys(&mut self) -> u8 {
        self.keys
    }
}

/// Eight bytes of RAM standing in for the flash sector
#[derive(Debug)]
pub struct RamRecord {
    cells: [u8; 8],
}

impl RamRecord {
    pub const fn erased() -> Self {
        Self { cells: [0xFF; 8] }
    }
}

impl Default for RamRecord {
    fn default() -> Self {
        Self::erased()
    }
}

impl Persistence for RamRecord {
    type Error = HalError;

    fn erase_and_write(&mut self, bytes: [u8; 8]) -> Result<(), Self::Error> {
        #[cfg(feature = "defmt")]
        defmt::info!("record stored: {:02x}", bytes);
        self.cells = bytes;
        Ok(())
    }

    fn read(&mut self) -> Option<[u8; 8]> {
        Some(self.cells)
    }
}

/// Tone output that only remembers what it was asked to play
#[derive(Debug, Default)]
pub struct LoggedTone {
    sounding: Option<u16>,
}

impl LoggedTone {
    pub fn sounding(&self) -> Option<u16> {
        self.sounding
    }
}

impl ToneOutput for LoggedTone {
    fn play(&mut self, freq_hz: u16) {
        #[cfg(feature = "defmt")]
        defmt::debug!("tone {} Hz", freq_hz);
        self.sounding = Some(freq_hz);
    }

    fn silence(&mut self) {
        #[cfg(feature = "defmt")]
        if self.sounding.is_some() {
            defmt::debug!("tone off");
        }
        self.sounding = None;
    }
}

/// Complete board over caller-provided serial output and delay
pub struct LoopbackBoard<S, D> {
    pub panel: LoopbackPanel,
    pub record: RamRecord,
    pub tone: LoggedTone,
    pub serial: S,
    pub delay: D,
}

impl<S: core::fmt::Write, D: DelayNs> LoopbackBoard<S, D> {
    pub fn new(serial: S, delay: D) -> Self {
        #[cfg(feature = "defmt")]
        defmt::info!("using loopback board");
        Self {
            panel: LoopbackPanel::new(),
            record: RamRecord::erased(),
            tone: LoggedTone::default(),
            serial,
            delay,
        }
    }
}

impl<S: core::fmt::Write, D: DelayNs> ClockHal for LoopbackBoard<S, D> {
    type Display = LoopbackPanel;
    type Switches = LoopbackPanel;
    type Keys = LoopbackPanel;
    type Store = RamRecord;
    type Tone = LoggedTone;
    type Serial = S;
    type Delay = D;

    fn display(&mut self) -> &mut LoopbackPanel {
        &mut self.panel
    }

    fn switches(&mut self) -> &mut LoopbackPanel {
        &mut self.panel
    }

    fn keys(&mut self) -> &mut LoopbackPanel {
        &mut self.panel
    }

    fn store(&mut self) -> &mut RamRecord {
        &mut self.record
    }

    fn tone(&mut self) -> &mut LoggedTone {
        &mut self.tone
    }

    fn serial(&mut self) -> &mut S {
        &mut self.serial
    }

    fn delay(&mut self) -> &mut D {
        &mut self.delay
    }
}
