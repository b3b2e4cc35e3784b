//! Time keeping engine: the four counters, the date and their digit buffers

use core::fmt;

use crate::calendar::Date;
use crate::types::{AdjustGroup, DisplayMode, CENTIS_PER_DAY, DIGITS, MILLIS_PER_DAY};

/// Fixed-width ASCII rendering of one mode's value
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DigitBuffer([u8; DIGITS]);

impl DigitBuffer {
    pub const ZERO: DigitBuffer = DigitBuffer(*b"00000000");

    pub const fn from_bytes(bytes: [u8; DIGITS]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; DIGITS] {
        &self.0
    }

    pub const fn get(&self, index: usize) -> u8 {
        self.0[index % DIGITS]
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or("")
    }

    /// Four zero-padded 2-digit fields, most significant first
    fn write_pairs(&mut self, fields: [u32; 4]) {
        for (pair, value) in self.0.chunks_exact_mut(2).zip(fields) {
            pair[0] = b'0' + (value / 10 % 10) as u8;
            pair[1] = b'0' + (value % 10) as u8;
        }
    }
}

/// `HH:MM:SS:cc` view of a centisecond count
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Centis(pub u32);

impl Centis {
    pub const fn fields(&self) -> [u32; 4] {
        let cs = self.0;
        [cs / 360_000, cs / 6000 % 60, cs / 100 % 60, cs % 100]
    }
}

impl fmt::Display for Centis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [h, m, s, c] = self.fields();
        write!(f, "{:02}:{:02}:{:02}:{:02}", h, m, s, c)
    }
}

/// `HH:MM:SS:mmm` view of a millisecond count
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Millis(pub u32);

impl Millis {
    pub const fn fields(&self) -> [u32; 4] {
        let ms = self.0;
        [ms / 3_600_000, ms / 60_000 % 60, ms / 1000 % 60, ms % 1000]
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [h, m, s, ms] = self.fields();
        write!(f, "{:02}:{:02}:{:02}:{:03}", h, m, s, ms)
    }
}

/// Counters, date and the digit buffer of every display mode
#[derive(Clone, Debug)]
pub struct TimeKeeper {
    runtime_ms: u32,
    time_cs: u32,
    alarm_cs: u32,
    stopwatch_cs: u32,
    stopwatch_reset_cs: u32,
    stopwatch_running: bool,
    stopwatch_alarmed: bool,
    date: Date,
    runtime_buf: DigitBuffer,
    time_buf: DigitBuffer,
    date_buf: DigitBuffer,
    alarm_buf: DigitBuffer,
    stopwatch_buf: DigitBuffer,
}

impl TimeKeeper {
    pub const fn new(date: Date) -> Self {
        Self {
            runtime_ms: 0,
            time_cs: 0,
            alarm_cs: 0,
            stopwatch_cs: 0,
            stopwatch_reset_cs: 0,
            stopwatch_running: false,
            stopwatch_alarmed: false,
            date,
            runtime_buf: DigitBuffer::ZERO,
            time_buf: DigitBuffer::ZERO,
            date_buf: DigitBuffer::ZERO,
            alarm_buf: DigitBuffer::ZERO,
            stopwatch_buf: DigitBuffer::ZERO,
        }
    }

    // ---- tick callbacks ----

    /// 1 ms tick. The counter wraps silently at 2^32 ms.
    pub fn advance_runtime(&mut self, suspended: bool) {
        if !suspended {
            self.runtime_ms = self.runtime_ms.wrapping_add(1);
        }
        self.refresh_runtime();
    }

    /// 10 ms tick. Returns true when the wall clock reaches the alarm time.
    pub fn advance_time(&mut self, suspended: bool) -> bool {
        if suspended {
            self.refresh_time();
            return false;
        }
        self.time_cs += 1;
        self.roll_day();
        self.refresh_time();
        self.time_cs == self.alarm_cs
    }

    /// 10 ms tick. Returns true once per countdown, one step before zero.
    pub fn advance_stopwatch(&mut self, suspended: bool) -> bool {
        let mut alarm = false;
        if !suspended {
            if self.stopwatch_running && self.stopwatch_cs > 0 {
                self.stopwatch_cs -= 1;
                if self.stopwatch_cs <= 1 && !self.stopwatch_alarmed {
                    self.stopwatch_alarmed = true;
                    alarm = true;
                }
            } else {
                self.stopwatch_running = false;
            }
        }
        self.refresh_stopwatch();
        alarm
    }

    fn roll_day(&mut self) {
        if self.time_cs >= CENTIS_PER_DAY {
            self.time_cs -= CENTIS_PER_DAY;
            self.date.add_one_day();
            self.refresh_date();
        }
    }

    // ---- setters ----

    pub fn set_time(&mut self, time_cs: u32) {
        self.time_cs = time_cs % CENTIS_PER_DAY;
        self.refresh_time();
    }

    pub fn set_date(&mut self, date: Date) {
        self.date = date;
        self.refresh_date();
    }

    pub fn set_alarm(&mut self, alarm_cs: u32) {
        self.alarm_cs = alarm_cs % CENTIS_PER_DAY;
        self.refresh_alarm();
    }

    /// Sets both the countdown and the value restored by a restart
    pub fn set_stopwatch(&mut self, stopwatch_cs: u32) {
        self.stopwatch_reset_cs = stopwatch_cs;
        self.load_stopwatch(stopwatch_cs);
    }

    pub fn reset_runtime(&mut self) {
        self.runtime_ms = 0;
        self.refresh_runtime();
    }

    /// Reload the countdown from the stored reset value and run it
    pub fn restart_stopwatch(&mut self) {
        self.load_stopwatch(self.stopwatch_reset_cs);
        self.stopwatch_running = true;
    }

    /// Run the countdown, reloading it first if it already expired
    pub fn resume_stopwatch(&mut self) {
        if self.stopwatch_cs == 0 {
            self.load_stopwatch(self.stopwatch_reset_cs);
        }
        self.stopwatch_running = true;
    }

    pub fn stop_stopwatch(&mut self) {
        self.stopwatch_running = false;
    }

    fn load_stopwatch(&mut self, stopwatch_cs: u32) {
        self.stopwatch_cs = stopwatch_cs;
        self.stopwatch_alarmed = false;
        self.refresh_stopwatch();
    }

    // ---- frozen field adjustment ----

    /// Increment the selected 2-digit field of `mode`'s value
    pub fn increment(&mut self, mode: DisplayMode, group: AdjustGroup) {
        let step = match group.index() {
            1 => 0,
            2 => 1,
            3 => 2,
            4 => 3,
            _ => return,
        };
        const CENTI_STEPS: [u32; 4] = [1, 100, 6000, 360_000];
        const MILLI_STEPS: [u32; 4] = [10, 1000, 60_000, 3_600_000];

        match mode {
            DisplayMode::Runtime => {
                self.runtime_ms = self.runtime_ms.wrapping_add(MILLI_STEPS[step]);
                if self.runtime_ms >= MILLIS_PER_DAY {
                    self.runtime_ms -= MILLIS_PER_DAY;
                }
                self.refresh_runtime();
            }
            DisplayMode::Time => {
                self.time_cs += CENTI_STEPS[step];
                self.roll_day();
                self.refresh_time();
            }
            DisplayMode::Date => {
                match step {
                    0 => self.date.add_one_day(),
                    1 => self.date.add_one_month(),
                    2 => self.date.add_one_year(),
                    _ => self.date.add_one_century(),
                }
                self.refresh_date();
            }
            DisplayMode::Alarm => {
                self.alarm_cs = (self.alarm_cs + CENTI_STEPS[step]) % CENTIS_PER_DAY;
                self.refresh_alarm();
            }
            DisplayMode::Stopwatch => {
                let value = (self.stopwatch_cs + CENTI_STEPS[step]) % CENTIS_PER_DAY;
                self.load_stopwatch(value);
            }
        }
    }

    // ---- buffers ----

    pub fn refresh_all(&mut self) {
        self.refresh_runtime();
        self.refresh_time();
        self.refresh_date();
        self.refresh_alarm();
        self.refresh_stopwatch();
    }

    fn refresh_runtime(&mut self) {
        let [h, m, s, ms] = Millis(self.runtime_ms).fields();
        // hundreds and tens of the millisecond field share the last pair
        self.runtime_buf.write_pairs([h % 100, m, s, ms / 10]);
    }

    fn refresh_time(&mut self) {
        self.time_buf.write_pairs(Centis(self.time_cs).fields());
    }

    fn refresh_alarm(&mut self) {
        self.alarm_buf.write_pairs(Centis(self.alarm_cs).fields());
    }

    fn refresh_stopwatch(&mut self) {
        self.stopwatch_buf.write_pairs(Centis(self.stopwatch_cs).fields());
    }

    fn refresh_date(&mut self) {
        let d = &self.date;
        let year = d.year as u32;
        self.date_buf
            .write_pairs([year / 100, year % 100, d.month as u32, d.day as u32]);
    }

    pub fn buffer(&self, mode: DisplayMode) -> &DigitBuffer {
        match mode {
            DisplayMode::Runtime => &self.runtime_buf,
            DisplayMode::Time => &self.time_buf,
            DisplayMode::Date => &self.date_buf,
            DisplayMode::Alarm => &self.alarm_buf,
            DisplayMode::Stopwatch => &self.stopwatch_buf,
        }
    }

    // ---- accessors ----

    pub fn runtime_ms(&self) -> u32 {
        self.runtime_ms
    }

    pub fn time_cs(&self) -> u32 {
        self.time_cs
    }

    pub fn alarm_cs(&self) -> u32 {
        self.alarm_cs
    }

    pub fn stopwatch_cs(&self) -> u32 {
        self.stopwatch_cs
    }

    pub fn stopwatch_reset_cs(&self) -> u32 {
        self.stopwatch_reset_cs
    }

    pub fn stopwatch_running(&self) -> bool {
        self.stopwatch_running
    }

    pub fn date(&self) -> Date {
        self.date
    }
}
