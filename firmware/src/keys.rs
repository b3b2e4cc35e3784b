//! On-board user keys wired straight to MCU pins

use clock_core::hal::UserKeyInput;
use embedded_hal::digital::InputPin;

/// Two active-low key inputs with pull-ups
pub struct UserKeyPins<A, B> {
    one: A,
    two: B,
}

impl<A: InputPin, B: InputPin> UserKeyPins<A, B> {
    pub fn new(one: A, two: B) -> Self {
        Self { one, two }
    }

    pub fn release(self) -> (A, B) {
        (self.one, self.two)
    }
}

impl<A: InputPin, B: InputPin> UserKeyInput for UserKeyPins<A, B> {
    fn read_user_keys(&mut self) -> u8 {
        // an unreadable pin reads as released
        let mut levels = 0xFF;
        if self.one.is_low().unwrap_or(false) {
            levels &= !0b01;
        }
        if self.two.is_low().unwrap_or(false) {
            levels &= !0b10;
        }
        levels
    }
}
