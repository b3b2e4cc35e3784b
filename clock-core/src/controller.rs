//! Device state, action dispatch and the interrupt/foreground split
//!
//! [`SharedClock`] is what interrupt handlers see: the tick scheduler, the
//! device state behind a critical-section mutex and the one-slot command
//! mailbox. [`Foreground`] owns everything that only the main loop touches
//! and performs all bus I/O.

use core::cell::RefCell;
use core::fmt::Write;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use heapless::String;
use portable_atomic::{AtomicBool, Ordering};

use crate::clock::{Centis, Millis, TimeKeeper};
use crate::command::{self, CommandError, Request};
use crate::display::{BootSweep, Multiplexer, View};
use crate::hal::{ClockHal, DisplayBus, SwitchBus, ToneOutput, UserKeyInput};
use crate::melody::{Melody, Tone};
use crate::persist::{self, SavedState};
use crate::scheduler::{Tick, TickScheduler};
use crate::switches::{KeyEvent, SwitchEventProcessor, UserKeys};
use crate::types::{Action, AdjustGroup, ClockConfig, DisplayMode, DIGITS};

/// Pause between boot sweep steps
const BOOT_STEP_MS: u32 = 60;

/// Operator message produced by one action
pub type Reply = String<128>;

/// Everything the clock knows, mutated only through [`apply`] and the tick
/// callbacks
#[derive(Clone, Debug)]
pub struct DeviceState {
    pub clock: TimeKeeper,
    pub mode: DisplayMode,
    pub reverse: bool,
    pub freeze: bool,
    pub adjust_group: AdjustGroup,
    pub melody: Melody,
    config: ClockConfig,
}

impl DeviceState {
    pub const fn new(config: ClockConfig) -> Self {
        Self {
            clock: TimeKeeper::new(config.default_date),
            mode: DisplayMode::Runtime,
            reverse: false,
            freeze: false,
            adjust_group: AdjustGroup::NONE,
            melody: Melody::new(),
            config,
        }
    }

    fn suspends(&self, mode: DisplayMode) -> bool {
        self.freeze && self.mode == mode
    }

    /// 1 ms tick callback (interrupt context)
    pub fn on_millisecond(&mut self) {
        let suspended = self.suspends(DisplayMode::Runtime);
        self.clock.advance_runtime(suspended);
    }

    /// 10 ms tick callback (interrupt context)
    pub fn on_centisecond(&mut self) {
        let alarm = self.clock.advance_time(self.suspends(DisplayMode::Time));
        let countdown = self.clock.advance_stopwatch(self.suspends(DisplayMode::Stopwatch));
        if alarm || countdown {
            self.melody.arm();
        }
    }

    /// `INIT CLOCK`
    pub fn init_clock(&mut self) {
        self.clock.set_time(self.config.default_time_cs);
        self.clock.set_date(self.config.default_date);
        self.reset_counters();
    }

    /// Power-up state, with date and time from storage when available
    pub fn restore(&mut self, saved: Option<SavedState>) {
        let SavedState { date, time_cs } = saved.unwrap_or(SavedState {
            date: self.config.default_date,
            time_cs: self.config.default_time_cs,
        });
        self.clock.set_time(time_cs);
        self.clock.set_date(date);
        self.reset_counters();
        self.mode = DisplayMode::Runtime;
        self.clock.refresh_all();
    }

    fn reset_counters(&mut self) {
        self.clock.reset_runtime();
        self.clock.set_alarm(self.config.default_alarm_cs);
        self.clock.set_stopwatch(self.config.default_stopwatch_cs);
        self.clock.stop_stopwatch();
        self.reverse = false;
        self.unfreeze();
    }

    fn unfreeze(&mut self) {
        self.freeze = false;
        self.adjust_group = AdjustGroup::NONE;
    }

    /// What `SAVE` writes
    pub fn snapshot(&self) -> SavedState {
        SavedState {
            date: self.clock.date(),
            time_cs: self.clock.time_cs(),
        }
    }

    /// Inputs of the multiplexer for the active mode
    pub fn view(&self) -> View<'_> {
        View {
            buffer: self.clock.buffer(self.mode),
            mode: self.mode,
            reverse: self.reverse,
            freeze: self.freeze,
            adjust_group: self.adjust_group,
        }
    }
}

/// Result of [`apply`]
#[derive(Clone, Debug, Default)]
pub struct Outcome {
    /// Message for the serial line, empty when the action is silent
    pub reply: Reply,
    /// Record to hand to the persistence collaborator
    pub save: Option<SavedState>,
}

/// Execute one action against the device state
pub fn apply(state: &mut DeviceState, action: Action) -> Outcome {
    let mut outcome = Outcome::default();
    let reply = &mut outcome.reply;

    // a reply longer than its buffer is cut short rather than dropped
    let _ = match action {
        Action::InitClock => {
            state.init_clock();
            write!(reply, "Initialize clock!")
        }
        Action::SetTime(t) => {
            state.clock.set_time(t.to_centis());
            write!(reply, "Set time to {} !", t)
        }
        Action::SetDate(d) => {
            state.clock.set_date(d);
            write!(reply, "Set date to {:04}.{:02}.{:02} !", d.year, d.month, d.day)
        }
        Action::SetAlarm(t) => {
            state.clock.set_alarm(t.to_centis());
            write!(reply, "Set alarm time to {} !", t)
        }
        Action::SetStopwatch(t) => {
            state.clock.set_stopwatch(t.to_centis());
            write!(reply, "Set stopwatch time to {} !", t)
        }
        Action::Get(mode) => {
            let clock = &state.clock;
            match mode {
                DisplayMode::Runtime => {
                    write!(reply, "Current runtime is {}.", Millis(clock.runtime_ms()))
                }
                DisplayMode::Time => write!(reply, "Current time is {}.", Centis(clock.time_cs())),
                DisplayMode::Date => write!(reply, "Current date is {}.", clock.date()),
                DisplayMode::Alarm => {
                    write!(reply, "Current alarm time is {}.", Centis(clock.alarm_cs()))
                }
                DisplayMode::Stopwatch => write!(
                    reply,
                    "Current stopwatch time is {}.",
                    Centis(clock.stopwatch_cs())
                ),
            }
        }
        Action::Run(mode) => {
            state.unfreeze();
            state.mode = mode;
            match mode {
                DisplayMode::Stopwatch => state.clock.resume_stopwatch(),
                DisplayMode::Alarm => {
                    state.clock.stop_stopwatch();
                    state.melody.arm();
                }
                _ => state.clock.stop_stopwatch(),
            }
            reply.push_str(match mode {
                DisplayMode::Runtime => "Display runtime!",
                DisplayMode::Time => "Display time!",
                DisplayMode::Date => "Display date!",
                DisplayMode::Alarm => "Running alarm!",
                DisplayMode::Stopwatch => "Run stopwatch!",
            })
            .map_err(|_| core::fmt::Error)
        }
        Action::ToggleReverse => {
            state.reverse = !state.reverse;
            write!(reply, "Reverse the display!")
        }
        Action::Save => {
            outcome.save = Some(state.snapshot());
            Ok(())
        }
        Action::Show(mode) => {
            state.mode = mode;
            state.clock.stop_stopwatch();
            Ok(())
        }
        Action::RestartStopwatch => {
            state.unfreeze();
            state.clock.restart_stopwatch();
            state.mode = DisplayMode::Stopwatch;
            Ok(())
        }
        Action::ToggleFreeze => {
            state.freeze = !state.freeze;
            state.adjust_group = AdjustGroup::NONE;
            Ok(())
        }
        Action::CycleAdjustGroup => {
            state.adjust_group = state.adjust_group.next();
            Ok(())
        }
        Action::IncrementGroup => {
            state.clock.increment(state.mode, state.adjust_group);
            Ok(())
        }
        Action::ToggleMelody => {
            state.melody.toggle();
            Ok(())
        }
    };
    outcome
}

/// State shared between the tick interrupt, the receive interrupt and the
/// foreground loop
pub struct SharedClock {
    scheduler: TickScheduler,
    state: Mutex<RefCell<DeviceState>>,
    pending: Mutex<RefCell<Option<Result<Request, CommandError>>>>,
    busy: AtomicBool,
}

impl SharedClock {
    pub const fn new(config: ClockConfig) -> Self {
        Self {
            scheduler: TickScheduler::new(config.tick_hz),
            state: Mutex::new(RefCell::new(DeviceState::new(config))),
            pending: Mutex::new(RefCell::new(None)),
            busy: AtomicBool::new(false),
        }
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    /// Periodic interrupt handler body
    pub fn on_tick(&self) {
        let fired = self.scheduler.on_tick();
        let ms = fired.contains(Tick::Millis1);
        let cs = fired.contains(Tick::Millis10);
        if ms || cs {
            critical_section::with(|token| {
                let mut state = self.state.borrow_ref_mut(token);
                if ms {
                    state.on_millisecond();
                }
                if cs {
                    state.on_centisecond();
                }
            });
        }
    }

    /// Receive interrupt handler body; returns false when the line was
    /// dropped because the previous one has not been handled yet
    pub fn on_line(&self, raw: &[u8]) -> bool {
        if self.busy.swap(true, Ordering::AcqRel) {
            warn!("line dropped, previous command still pending");
            return false;
        }
        let request = command::interpret(raw);
        critical_section::with(|token| {
            *self.pending.borrow_ref_mut(token) = Some(request);
        });
        true
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run `f` on the device state with interrupts masked
    pub fn with_state<R>(&self, f: impl FnOnce(&mut DeviceState) -> R) -> R {
        critical_section::with(|token| f(&mut self.state.borrow_ref_mut(token)))
    }

    fn take_pending(&self) -> Option<Result<Request, CommandError>> {
        critical_section::with(|token| self.pending.borrow_ref_mut(token).take())
    }

    fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Main-loop side: multiplexer position, edge detectors and blink phase
pub struct Foreground {
    mux: Multiplexer,
    switches: SwitchEventProcessor,
    keys: UserKeys,
    half_second: bool,
    banner: [u8; DIGITS],
    overruns_seen: u32,
}

impl Foreground {
    pub const fn new(config: &ClockConfig) -> Self {
        Self {
            mux: Multiplexer::new(config.duty_window),
            switches: SwitchEventProcessor::new(),
            keys: UserKeys::new(),
            half_second: false,
            banner: config.boot_banner,
            overruns_seen: 0,
        }
    }

    pub fn position(&self) -> u8 {
        self.mux.position()
    }

    pub fn half_second(&self) -> bool {
        self.half_second
    }

    /// Banner, display sweep and state restore; runs before ticks start
    pub fn boot<H: ClockHal>(&mut self, shared: &SharedClock, hal: &mut H) {
        let _ = write!(
            hal.serial(),
            "\r\nWelcome to the 7-segment clock! Type \"?\" for help.\r\n"
        );

        for frame in BootSweep::new(self.banner) {
            let display = hal.display();
            let _ = display.write_segment(frame.segment);
            let _ = display.write_column_mask(frame.column);
            let _ = display.write_leds(!frame.column);
            hal.delay().delay_ms(BOOT_STEP_MS);
        }
        let _ = hal.display().write_leds(0xFF);

        let saved = persist::load(hal.store());
        match saved {
            Some(record) => info!(
                "restored {}-{}-{} {} cs",
                record.date.year,
                record.date.month,
                record.date.day,
                record.time_cs
            ),
            None => info!("no saved state, using defaults"),
        }
        shared.with_state(|state| state.restore(saved));
    }

    /// One pass of the foreground loop
    pub fn poll<H: ClockHal>(&mut self, shared: &SharedClock, hal: &mut H) {
        let scheduler = shared.scheduler();

        if scheduler.take(Tick::Millis2) {
            self.mux.advance();
        }
        self.run_pending(shared, hal);
        self.refresh_display(shared, hal);

        if scheduler.take(Tick::Millis1) {
            self.sample_keys(shared, hal);
        }
        // counters already advanced in the tick handler
        let _ = scheduler.take(Tick::Millis10);
        if scheduler.take(Tick::Millis100) {
            self.step_melody(shared, hal);
            self.sample_switches(shared, hal);
        }
        if scheduler.take(Tick::Millis500) {
            self.half_second = !self.half_second;
        }

        let overruns = scheduler.overruns();
        if overruns != self.overruns_seen {
            warn!("{} tick flags overran", overruns.wrapping_sub(self.overruns_seen));
            self.overruns_seen = overruns;
        }
    }

    fn run_pending<H: ClockHal>(&mut self, shared: &SharedClock, hal: &mut H) {
        let Some(request) = shared.take_pending() else {
            return;
        };
        match request {
            Ok(Request::Execute(action)) => self.execute(shared, hal, action),
            Ok(Request::Help(verb)) => {
                let _ = write!(hal.serial(), "{}\r\n", verb.help_text());
            }
            Ok(Request::Ignore) => {}
            Err(err) => {
                warn!("command rejected");
                let _ = write!(hal.serial(), "{}\r\n{}\r\n", err, err.help().help_text());
            }
        }
        shared.release();
    }

    fn execute<H: ClockHal>(&mut self, shared: &SharedClock, hal: &mut H, action: Action) {
        debug!("action {}", action);
        let outcome = shared.with_state(|state| apply(state, action));
        if !outcome.reply.is_empty() {
            let _ = write!(hal.serial(), "{}\r\n", outcome.reply);
        }
        if let Some(record) = outcome.save {
            Self::save(hal, &record);
        }
    }

    fn save<H: ClockHal>(hal: &mut H, record: &SavedState) {
        let result = persist::save(hal.store(), record);
        let serial = hal.serial();
        let _ = match result {
            Ok(()) => write!(
                serial,
                "Save time {} and date {} to flash! Will be loaded after a reboot.\r\n",
                Centis(record.time_cs),
                record.date
            ),
            Err(_) => {
                error!("flash write failed");
                write!(serial, "Failed to save time and date to flash!\r\n")
            }
        };
    }

    fn refresh_display<H: ClockHal>(&mut self, shared: &SharedClock, hal: &mut H) {
        let phase = shared.scheduler().phase(Tick::Millis2);
        let frame = shared.with_state(|state| self.mux.frame(&state.view(), phase, self.half_second));
        let display = hal.display();
        let _ = display.write_segment(frame.segment);
        let _ = display.write_column_mask(frame.column);
    }

    fn sample_keys<H: ClockHal>(&mut self, shared: &SharedClock, hal: &mut H) {
        let levels = hal.keys().read_user_keys();
        let now_ms = shared.with_state(|state| state.clock.runtime_ms());
        for event in self.keys.sample(levels, now_ms).into_iter().flatten() {
            let _ = write!(hal.serial(), "{}\r\n", event);
            if let KeyEvent::Pressed { key, .. } = event {
                self.execute(shared, hal, key.action());
            }
        }
    }

    fn sample_switches<H: ClockHal>(&mut self, shared: &SharedClock, hal: &mut H) {
        let vector = hal.switches().read_switch_vector();
        let Some(index) = self.switches.sample(vector) else {
            return;
        };
        let frozen = shared.with_state(|state| state.freeze);
        match SwitchEventProcessor::action(index, frozen) {
            Some(action) => self.execute(shared, hal, action),
            None => trace!("switch {} ignored", index),
        }
    }

    fn step_melody<H: ClockHal>(&mut self, shared: &SharedClock, hal: &mut H) {
        match shared.with_state(|state| state.melody.step()) {
            Some(Tone::Play(freq_hz)) => hal.tone().play(freq_hz),
            Some(Tone::Silence) => hal.tone().silence(),
            None => {}
        }
    }
}
