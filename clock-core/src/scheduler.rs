//! Soft timers derived from the single periodic tick interrupt

use portable_atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

/// The five derived tick rates
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// Runtime counter, user-key sampling
    Millis1 = 0,
    /// Display multiplexing
    Millis2 = 1,
    /// Wall clock and stopwatch
    Millis10 = 2,
    /// Switch sampling, melody steps
    Millis100 = 3,
    /// Blink phase
    Millis500 = 4,
}

impl Tick {
    pub const ALL: [Tick; 5] = [
        Tick::Millis1,
        Tick::Millis2,
        Tick::Millis10,
        Tick::Millis100,
        Tick::Millis500,
    ];

    pub const fn hz(&self) -> u32 {
        match self {
            Tick::Millis1 => 1000,
            Tick::Millis2 => 500,
            Tick::Millis10 => 100,
            Tick::Millis100 => 10,
            Tick::Millis500 => 2,
        }
    }
}

/// Set of ticks that fired on one interrupt
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Fired(u8);

impl Fired {
    pub const fn contains(&self, tick: Tick) -> bool {
        self.0 & (1 << tick as u8) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    fn insert(&mut self, tick: Tick) {
        self.0 |= 1 << tick as u8;
    }
}

/// Down-counter with an edge-triggered status flag
struct SoftTimer {
    reload: u16,
    remaining: AtomicU16,
    status: AtomicBool,
}

impl SoftTimer {
    const fn new(reload: u16) -> Self {
        Self {
            reload,
            remaining: AtomicU16::new(reload),
            status: AtomicBool::new(false),
        }
    }

    /// Returns true when the counter expired and was reloaded
    fn step(&self) -> bool {
        let left = self.remaining.load(Ordering::Relaxed);
        if left > 1 {
            self.remaining.store(left - 1, Ordering::Relaxed);
            false
        } else {
            self.remaining.store(self.reload, Ordering::Relaxed);
            true
        }
    }
}

/// Five soft timers driven from one interrupt source
///
/// `on_tick` is the only writer of the counters and the only setter of the
/// status flags; the foreground loop is the only consumer via [`take`].
///
/// [`take`]: TickScheduler::take
pub struct TickScheduler {
    timers: [SoftTimer; 5],
    overruns: AtomicU32,
}

impl TickScheduler {
    /// `base_hz` must be a multiple of 1 kHz
    pub const fn new(base_hz: u32) -> Self {
        Self {
            timers: [
                SoftTimer::new(reload_for(base_hz, Tick::Millis1)),
                SoftTimer::new(reload_for(base_hz, Tick::Millis2)),
                SoftTimer::new(reload_for(base_hz, Tick::Millis10)),
                SoftTimer::new(reload_for(base_hz, Tick::Millis100)),
                SoftTimer::new(reload_for(base_hz, Tick::Millis500)),
            ],
            overruns: AtomicU32::new(0),
        }
    }

    /// Advance every soft timer by one base tick (interrupt context)
    pub fn on_tick(&self) -> Fired {
        let mut fired = Fired::default();
        for (timer, tick) in self.timers.iter().zip(Tick::ALL) {
            if timer.step() {
                if timer.status.swap(true, Ordering::AcqRel) {
                    self.overruns.fetch_add(1, Ordering::Relaxed);
                }
                fired.insert(tick);
            }
        }
        fired
    }

    /// Consume a status flag; true at most once per expiry
    pub fn take(&self, tick: Tick) -> bool {
        self.timers[tick as usize].status.swap(false, Ordering::AcqRel)
    }

    /// Base ticks left until `tick` next expires, `reload..=1`
    pub fn phase(&self, tick: Tick) -> u16 {
        self.timers[tick as usize].remaining.load(Ordering::Relaxed)
    }

    pub fn reload(&self, tick: Tick) -> u16 {
        self.timers[tick as usize].reload
    }

    /// Flags that were set again before the foreground consumed them
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }
}

const fn reload_for(base_hz: u32, tick: Tick) -> u16 {
    let reload = base_hz / tick.hz();
    if reload == 0 {
        1
    } else if reload > u16::MAX as u32 {
        u16::MAX
    } else {
        reload as u16
    }
}
