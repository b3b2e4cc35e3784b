//! Front-panel switch and on-board key handling

use crate::clock::Millis;
use crate::types::{Action, DisplayMode};

/// Edge detector for the 8-bit active-low switch vector
///
/// A bit going 1 → 0 between samples is a press. Only the lowest-index new
/// press is handled per sample; the others stay unacknowledged and are
/// reported on the following samples.
#[derive(Debug)]
pub struct SwitchEventProcessor {
    previous: u8,
}

impl SwitchEventProcessor {
    pub const fn new() -> Self {
        Self { previous: 0xFF }
    }

    /// Returns the 1-based index of the switch handled in this sample
    pub fn sample(&mut self, vector: u8) -> Option<u8> {
        // a failed read leaves the previous sample in place
        if vector == 0x00 {
            return None;
        }
        let pressed = self.previous & !vector;
        if pressed == 0 {
            self.previous = vector;
            return None;
        }
        let bit = pressed.trailing_zeros() as u8;
        let deferred = pressed & !(1 << bit);
        self.previous = vector | deferred;
        Some(bit + 1)
    }

    /// Action bound to switch `index` given the frozen sub-state
    pub const fn action(index: u8, frozen: bool) -> Option<Action> {
        match (index, frozen) {
            (1, false) => Some(Action::Show(DisplayMode::Runtime)),
            (2, false) => Some(Action::Show(DisplayMode::Time)),
            (3, false) => Some(Action::Show(DisplayMode::Date)),
            (4, false) => Some(Action::Show(DisplayMode::Alarm)),
            (5, _) => Some(Action::RestartStopwatch),
            (6, _) => Some(Action::ToggleFreeze),
            (7, true) => Some(Action::CycleAdjustGroup),
            (8, true) => Some(Action::IncrementGroup),
            _ => None,
        }
    }
}

impl Default for SwitchEventProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// The two active-low push buttons wired directly to the MCU
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UserKey {
    /// Bit 0, starts or stops the alarm melody
    One,
    /// Bit 1, saves date and time
    Two,
}

impl UserKey {
    pub const ALL: [UserKey; 2] = [UserKey::One, UserKey::Two];

    pub const fn label(&self) -> &'static str {
        match self {
            UserKey::One => "USR_SW1",
            UserKey::Two => "USR_SW2",
        }
    }

    const fn mask(&self) -> u8 {
        match self {
            UserKey::One => 0b01,
            UserKey::Two => 0b10,
        }
    }

    /// Action triggered on press
    pub const fn action(&self) -> Action {
        match self {
            UserKey::One => Action::ToggleMelody,
            UserKey::Two => Action::Save,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum KeyEvent {
    Pressed { key: UserKey, at_ms: u32 },
    Released { key: UserKey, at_ms: u32, held_ms: u32 },
}

impl core::fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            KeyEvent::Pressed { key, at_ms } => {
                write!(f, "At {}, {} is pressed.", Millis(at_ms), key.label())
            }
            KeyEvent::Released { key, at_ms, held_ms } => write!(
                f,
                "At {}, {} is released.\r\n{} is pressed for {}.",
                Millis(at_ms),
                key.label(),
                key.label(),
                Millis(held_ms)
            ),
        }
    }
}

/// Press/release tracker for the on-board keys, sampled every millisecond
#[derive(Debug)]
pub struct UserKeys {
    previous: u8,
    pressed_at: [u32; 2],
}

impl UserKeys {
    pub const fn new() -> Self {
        Self {
            previous: 0xFF,
            pressed_at: [0; 2],
        }
    }

    /// `levels` is active-low; `now_ms` is the runtime counter
    pub fn sample(&mut self, levels: u8, now_ms: u32) -> [Option<KeyEvent>; 2] {
        let mut events = [None; 2];
        for (slot, key) in UserKey::ALL.into_iter().enumerate() {
            let was_down = self.previous & key.mask() == 0;
            let is_down = levels & key.mask() == 0;
            events[slot] = match (was_down, is_down) {
                (false, true) => {
                    self.pressed_at[slot] = now_ms;
                    Some(KeyEvent::Pressed { key, at_ms: now_ms })
                }
                (true, false) => Some(KeyEvent::Released {
                    key,
                    at_ms: now_ms,
                    held_ms: now_ms.wrapping_sub(self.pressed_at[slot]),
                }),
                _ => None,
            };
        }
        self.previous = levels;
        events
    }
}

impl Default for UserKeys {
    fn default() -> Self {
        Self::new()
    }
}
