//! Receive-side line assembly for the serial console

use heapless::Vec;

/// Longest line kept; further bytes are dropped until the terminator
pub const LINE_CAPACITY: usize = 64;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// Collects bytes from the receive interrupt until CR or LF
#[derive(Debug, Default)]
pub struct LineAssembler<const N: usize = LINE_CAPACITY> {
    buf: Vec<u8, N>,
    truncated: bool,
}

impl<const N: usize> LineAssembler<N> {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            truncated: false,
        }
    }

    /// Feed one received byte; returns the finished line on a terminator
    ///
    /// Empty lines produce nothing, so CR LF pairs yield a single line.
    pub fn push(&mut self, byte: u8) -> Option<Vec<u8, N>> {
        match byte {
            b'\r' | b'\n' => {
                self.truncated = false;
                if self.buf.is_empty() {
                    None
                } else {
                    Some(core::mem::take(&mut self.buf))
                }
            }
            BACKSPACE | DELETE => {
                self.buf.pop();
                None
            }
            _ => {
                if self.buf.push(byte).is_err() && !self.truncated {
                    self.truncated = true;
                    #[cfg(feature = "defmt")]
                    defmt::warn!("line longer than {} bytes truncated", N);
                }
                None
            }
        }
    }

    /// True while the current line is being cut short
    pub fn is_truncating(&self) -> bool {
        self.truncated
    }

    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}
