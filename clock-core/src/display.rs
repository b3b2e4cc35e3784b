//! Seven-segment multiplexer
//!
//! Segment bits are `a`..`g` in bits 0..6 and the decimal point in bit 7.
//! Reverse rendering mirrors the digit order and rotates every glyph by
//! 180°, which swaps `a`/`d`, `b`/`e` and `c`/`f`.

use crate::clock::DigitBuffer;
use crate::types::{AdjustGroup, DisplayMode, DutyWindow, DIGITS};

pub const POINT: u8 = 0x80;

/// Forward segment code for an ASCII character, blank when unknown
pub const fn glyph(ch: u8) -> u8 {
    match ch {
        b'0' => 0x3F,
        b'1' => 0x06,
        b'2' => 0x5B,
        b'3' => 0x4F,
        b'4' => 0x66,
        b'5' => 0x6D,
        b'6' => 0x7D,
        b'7' => 0x07,
        b'8' => 0x7F,
        b'9' => 0x6F,
        b'A' => 0x77,
        b'b' => 0x7C,
        b'C' => 0x39,
        b'd' => 0x5E,
        b'E' => 0x79,
        b'F' => 0x71,
        b'H' => 0x76,
        b'L' => 0x38,
        b'P' => 0x73,
        b'o' => 0x5C,
        b'.' => POINT,
        b'-' => 0x40,
        b'_' => 0x08,
        _ => 0x00,
    }
}

/// Turn a glyph upside down
pub const fn rotate_180(code: u8) -> u8 {
    let abc = code & 0b0000_0111;
    let def = (code >> 3) & 0b0000_0111;
    (code & 0b1100_0000) | (abc << 3) | def
}

pub const fn segment_code(ch: u8, point: bool, reverse: bool) -> u8 {
    let code = if reverse { rotate_180(glyph(ch)) } else { glyph(ch) };
    if point {
        code | POINT
    } else {
        code
    }
}

/// Column enable masks per adjust group; the selected pair is left dark
const GROUP_MASKS: [u8; 5] = [0xFF, 0x3F, 0xCF, 0xF3, 0xFC];
const GROUP_MASKS_REVERSED: [u8; 5] = [0xFF, 0xFC, 0xF3, 0xCF, 0x3F];

pub const fn group_mask(group: AdjustGroup, reverse: bool) -> u8 {
    let table = if reverse { &GROUP_MASKS_REVERSED } else { &GROUP_MASKS };
    table[group.index() as usize]
}

/// What the multiplexer needs from the device state for one refresh
#[derive(Copy, Clone, Debug)]
pub struct View<'a> {
    pub buffer: &'a DigitBuffer,
    pub mode: DisplayMode,
    pub reverse: bool,
    pub freeze: bool,
    pub adjust_group: AdjustGroup,
}

/// One refresh step for the display bus
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub segment: u8,
    pub column: u8,
}

pub struct Multiplexer {
    position: u8,
    column: u8,
    window: DutyWindow,
}

impl Multiplexer {
    pub const fn new(window: DutyWindow) -> Self {
        Self {
            position: 0,
            column: 0x01,
            window,
        }
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    /// Move to the next digit (2 ms tick)
    pub fn advance(&mut self) {
        self.position += 1;
        self.column <<= 1;
        if self.position as usize >= DIGITS {
            self.position = 0;
            self.column = 0x01;
        }
    }

    /// Segment code and column mask for the current position
    ///
    /// `phase` is the 2 ms soft timer's remaining count; outside the duty
    /// window the column is forced dark. While frozen the selected group is
    /// masked out during the first half of every second.
    pub fn frame(&self, view: &View<'_>, phase: u16, half_second: bool) -> Frame {
        let position = self.position as usize;
        let index = if view.reverse { DIGITS - 1 - position } else { position };
        let ch = view.buffer.get(index);

        if !self.window.contains(phase) {
            return Frame {
                segment: segment_code(ch, false, view.reverse),
                column: 0,
            };
        }

        let (forward, reversed) = view.mode.point_positions();
        let points = if view.reverse { reversed } else { forward };
        let point = points & self.column != 0;

        let group = if half_second || !view.freeze {
            AdjustGroup::NONE
        } else {
            view.adjust_group
        };

        Frame {
            segment: segment_code(ch, point, view.reverse),
            column: self.column & group_mask(group, view.reverse),
        }
    }
}

/// Frames shown at power-up: the banner swept twice across the display
pub struct BootSweep {
    mux: Multiplexer,
    banner: DigitBuffer,
    step: u8,
}

impl BootSweep {
    pub const STEPS: u8 = 2 * DIGITS as u8;

    pub const fn new(banner: [u8; DIGITS]) -> Self {
        Self {
            mux: Multiplexer::new(DutyWindow { low: 0, high: u16::MAX }),
            banner: DigitBuffer::from_bytes(banner),
            step: 0,
        }
    }
}

impl Iterator for BootSweep {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.step >= Self::STEPS {
            return None;
        }
        let view = View {
            buffer: &self.banner,
            mode: DisplayMode::Time,
            reverse: false,
            freeze: false,
            adjust_group: AdjustGroup::NONE,
        };
        let frame = self.mux.frame(&view, 1, true);
        self.mux.advance();
        self.step += 1;
        Some(frame)
    }
}
