//! TCA6424 display/switch expander and PCA9557 LED bar on one I²C bus
//!
//! TCA6424 port 0 reads the eight active-low switches, port 1 drives the
//! segment lines and port 2 the digit columns. The PCA9557 drives eight
//! active-low LEDs.

use clock_core::hal::{DisplayBus, HalError, SwitchBus};
use embedded_hal::i2c::I2c;

pub const TCA6424_ADDR: u8 = 0x22;
pub const PCA9557_ADDR: u8 = 0x18;

pub const TCA_INPUT_PORT0: u8 = 0x00;
pub const TCA_OUTPUT_PORT1: u8 = 0x05;
pub const TCA_OUTPUT_PORT2: u8 = 0x06;
pub const TCA_CONFIG_PORT0: u8 = 0x0C;
pub const TCA_CONFIG_PORT1: u8 = 0x0D;
pub const TCA_CONFIG_PORT2: u8 = 0x0E;

pub const PCA_OUTPUT: u8 = 0x01;
pub const PCA_CONFIG: u8 = 0x03;

/// Both expanders behind one bus handle
pub struct ExpanderBoard<I> {
    i2c: I,
    initialized: bool,
}

impl<I: I2c> ExpanderBoard<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            initialized: false,
        }
    }

    /// Port directions and LEDs off
    pub fn init(&mut self) -> Result<(), HalError> {
        const SEQUENCE: [(u8, u8, u8); 5] = [
            (TCA6424_ADDR, TCA_CONFIG_PORT0, 0xFF),
            (TCA6424_ADDR, TCA_CONFIG_PORT1, 0x00),
            (TCA6424_ADDR, TCA_CONFIG_PORT2, 0x00),
            (PCA9557_ADDR, PCA_CONFIG, 0x00),
            (PCA9557_ADDR, PCA_OUTPUT, 0xFF),
        ];
        for (addr, reg, value) in SEQUENCE {
            self.i2c.write(addr, &[reg, value]).map_err(|_| HalError::Bus)?;
        }
        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::info!("expanders configured");

        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Give the bus back, e.g. to check a mock's expectations
    pub fn release(self) -> I {
        self.i2c
    }

    fn write_register(&mut self, addr: u8, reg: u8, value: u8) -> Result<(), HalError> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }
        self.i2c.write(addr, &[reg, value]).map_err(|_| HalError::Bus)
    }

    fn read_register(&mut self, addr: u8, reg: u8) -> Result<u8, HalError> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }
        let mut buf = [0];
        self.i2c
            .write_read(addr, &[reg], &mut buf)
            .map_err(|_| HalError::Bus)?;
        Ok(buf[0])
    }
}

impl<I: I2c> DisplayBus for ExpanderBoard<I> {
    type Error = HalError;

    fn write_segment(&mut self, code: u8) -> Result<(), Self::Error> {
        self.write_register(TCA6424_ADDR, TCA_OUTPUT_PORT1, code)
    }

    fn write_column_mask(&mut self, mask: u8) -> Result<(), Self::Error> {
        self.write_register(TCA6424_ADDR, TCA_OUTPUT_PORT2, mask)
    }

    fn write_leds(&mut self, mask: u8) -> Result<(), Self::Error> {
        self.write_register(PCA9557_ADDR, PCA_OUTPUT, mask)
    }
}

impl<I: I2c> SwitchBus for ExpanderBoard<I> {
    fn read_switch_vector(&mut self) -> u8 {
        // 0x00 is what the switch processor treats as a failed read
        match self.read_register(TCA6424_ADDR, TCA_INPUT_PORT0) {
            Ok(vector) => vector,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("switch read failed: {}", _e);
                0x00
            }
        }
    }
}
