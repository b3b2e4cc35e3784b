//! Test utilities: a simulated board driven tick by tick

use std::string::String;

use crate::controller::{DeviceState, Foreground, SharedClock};
use crate::hal::mock::{MockClockHal, MockStore};
use crate::types::ClockConfig;

/// Shared clock, foreground loop and mock hardware wired together
///
/// Every simulated tick runs the interrupt body once and then one
/// foreground pass, so flags never overrun.
pub struct Rig {
    pub clock: SharedClock,
    pub foreground: Foreground,
    pub hal: MockClockHal,
    config: ClockConfig,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_config(ClockConfig::DEFAULT)
    }

    pub fn with_config(config: ClockConfig) -> Self {
        Self {
            clock: SharedClock::new(config),
            foreground: Foreground::new(&config),
            hal: MockClockHal::new(),
            config,
        }
    }

    /// Fresh rig whose storage already holds `cells`
    pub fn with_stored(cells: [u8; 8]) -> Self {
        let mut rig = Self::new();
        rig.hal.store = MockStore::with_bytes(cells);
        rig
    }

    /// Run the boot sequence and return what it printed
    pub fn boot(&mut self) -> String {
        self.foreground.boot(&self.clock, &mut self.hal);
        self.hal.take_output()
    }

    pub fn tick(&mut self) {
        self.clock.on_tick();
        self.foreground.poll(&self.clock, &mut self.hal);
    }

    pub fn run_ms(&mut self, ms: u32) {
        for _ in 0..ms * self.config.ticks_per_ms() {
            self.tick();
        }
    }

    /// Deliver a line as the receive interrupt would
    pub fn send(&mut self, line: &str) -> bool {
        self.clock.on_line(line.as_bytes())
    }

    /// Send a line, give the foreground one pass and return its reply
    pub fn command(&mut self, line: &str) -> String {
        self.hal.take_output();
        self.send(line);
        self.foreground.poll(&self.clock, &mut self.hal);
        self.hal.take_output()
    }

    /// Press and release front-panel switch `index` (1-based)
    pub fn press_switch(&mut self, index: u8) {
        self.hal.switches.set_switch(index, true);
        self.run_ms(100);
        self.hal.switches.set_switch(index, false);
        self.run_ms(100);
    }

    /// Hold on-board key `bit` down for `hold_ms`
    pub fn press_key(&mut self, bit: u8, hold_ms: u32) {
        self.hal.switches.set_key(bit, true);
        self.run_ms(hold_ms);
        self.hal.switches.set_key(bit, false);
        self.run_ms(1);
    }

    pub fn state<R>(&self, f: impl FnOnce(&DeviceState) -> R) -> R {
        self.clock.with_state(|state| f(state))
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}
