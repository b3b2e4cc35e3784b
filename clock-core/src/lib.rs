//! Multi-mode 7-segment clock core
//!
//! Hardware-independent logic for an 8-digit clock with runtime, time, date,
//! alarm and countdown stopwatch modes: the tick scheduler, counters and
//! calendar, display multiplexing, switch handling and the serial command
//! interpreter. Board crates plug in through the traits in [`hal`].

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
mod fmt;

pub mod calendar;
pub mod clock;
pub mod command;
pub mod controller;
pub mod display;
pub mod hal;
pub mod melody;
pub mod persist;
pub mod scheduler;
pub mod switches;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use calendar::Date;
pub use clock::{Centis, DigitBuffer, Millis, TimeKeeper};
pub use command::{interpret, CommandError, Request, Verb};
pub use controller::{apply, DeviceState, Foreground, Outcome, SharedClock};
pub use display::{BootSweep, Frame, Multiplexer, View};
pub use hal::{ClockHal, DisplayBus, HalError, Persistence, SwitchBus, ToneOutput, UserKeyInput};
pub use melody::{Melody, Tone};
pub use persist::SavedState;
pub use scheduler::{Fired, Tick, TickScheduler};
pub use switches::{KeyEvent, SwitchEventProcessor, UserKey, UserKeys};
pub use types::{Action, AdjustGroup, ClockConfig, DisplayMode, DutyWindow, TimeOfDay};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Factory settings: 10 kHz tick, 2023-06-11 08:00:59, alarm at 09:00:00
pub const fn default_config() -> ClockConfig {
    ClockConfig::DEFAULT
}
