//! Core data types for the clock

use crate::calendar::Date;

/// Number of multiplexed digit positions
pub const DIGITS: usize = 8;

/// One day in centiseconds
pub const CENTIS_PER_DAY: u32 = 8_640_000;

/// One day in milliseconds
pub const MILLIS_PER_DAY: u32 = 86_400_000;

/// What the display currently shows
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// Free-running uptime, HH MM SS plus two millisecond digits
    Runtime,
    /// Wall clock, HH MM SS cc
    Time,
    /// Calendar date, YYYY MM DD
    Date,
    /// Alarm time, HH MM SS cc
    Alarm,
    /// Countdown stopwatch, HH MM SS cc
    Stopwatch,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 5] = [
        DisplayMode::Runtime,
        DisplayMode::Time,
        DisplayMode::Date,
        DisplayMode::Alarm,
        DisplayMode::Stopwatch,
    ];

    /// Keyword used by GET and RUN
    pub const fn keyword(&self) -> &'static str {
        match self {
            DisplayMode::Runtime => "RUNTIME",
            DisplayMode::Time => "TIME",
            DisplayMode::Date => "DATE",
            DisplayMode::Alarm => "ALARM",
            DisplayMode::Stopwatch => "STWATCH",
        }
    }

    /// Case-insensitive keyword lookup
    pub fn from_keyword(word: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.keyword().as_bytes().eq_ignore_ascii_case(word))
    }

    /// Bit mask of positions that carry a decimal point, as `(forward, reverse)`
    pub const fn point_positions(&self) -> (u8, u8) {
        match self {
            // YYYY.MM.DD
            DisplayMode::Date => (0b0010_1000, 0b0000_1010),
            // HH.MM.SS.xx
            _ => (0b0010_1010, 0b0010_1010),
        }
    }
}

/// Which 2-digit field blinks and responds to increments while frozen
///
/// 0 selects nothing; 1..=4 select the rightmost to leftmost pair.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdjustGroup(u8);

impl AdjustGroup {
    pub const NONE: AdjustGroup = AdjustGroup(0);
    pub const MAX: u8 = 4;

    pub const fn new(group: u8) -> Option<Self> {
        if group <= Self::MAX {
            Some(AdjustGroup(group))
        } else {
            None
        }
    }

    pub const fn index(&self) -> u8 {
        self.0
    }

    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// 0 → 1 → 2 → 3 → 4 → 0
    pub const fn next(&self) -> Self {
        if self.0 >= Self::MAX {
            AdjustGroup(0)
        } else {
            AdjustGroup(self.0 + 1)
        }
    }
}

/// A validated HH:MM:SS argument
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeOfDay {
    pub const fn new(hour: u8, minute: u8, second: u8) -> Option<Self> {
        if hour < 24 && minute < 60 && second < 60 {
            Some(Self { hour, minute, second })
        } else {
            None
        }
    }

    pub const fn to_centis(&self) -> u32 {
        (self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32) * 100
    }
}

impl core::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Everything the operator can ask the clock to do
///
/// Produced by the command interpreter, the switch processor and the
/// on-board keys; consumed by [`crate::controller::apply`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// `INIT CLOCK`
    InitClock,
    /// `SET TIME HH:MM:SS`
    SetTime(TimeOfDay),
    /// `SET DATE YYYY.MM.DD`
    SetDate(Date),
    /// `SET ALARM HH:MM:SS`
    SetAlarm(TimeOfDay),
    /// `SET STWATCH HH:MM:SS`
    SetStopwatch(TimeOfDay),
    /// `GET <mode>`
    Get(DisplayMode),
    /// `RUN <mode>`
    Run(DisplayMode),
    /// `REVERSE`
    ToggleReverse,
    /// `SAVE` or the second on-board key
    Save,
    /// Switches 1..4
    Show(DisplayMode),
    /// Switch 5
    RestartStopwatch,
    /// Switch 6
    ToggleFreeze,
    /// Switch 7
    CycleAdjustGroup,
    /// Switch 8
    IncrementGroup,
    /// First on-board key
    ToggleMelody,
}

/// Open interval over the 2 ms phase during which columns are driven
///
/// The phase counts down from the period length to 1, so at the default
/// 10 kHz tick there are 20 phases and `(2, 19)` lights 16 of them.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DutyWindow {
    pub low: u16,
    pub high: u16,
}

impl DutyWindow {
    pub const fn contains(&self, phase: u16) -> bool {
        phase > self.low && phase < self.high
    }
}

/// Clock configuration parameters
#[derive(Copy, Clone, Debug)]
pub struct ClockConfig {
    /// Base frequency of the periodic tick interrupt
    pub tick_hz: u32,
    /// Date used when nothing is persisted and by `INIT CLOCK`
    pub default_date: Date,
    /// Wall time used when nothing is persisted and by `INIT CLOCK`
    pub default_time_cs: u32,
    /// Alarm time at boot and after `INIT CLOCK`
    pub default_alarm_cs: u32,
    /// Stopwatch countdown at boot and after `INIT CLOCK`
    pub default_stopwatch_cs: u32,
    /// Brightness window over the 2 ms phase
    pub duty_window: DutyWindow,
    /// Digits swept across the display at boot
    pub boot_banner: [u8; DIGITS],
}

impl ClockConfig {
    pub const DEFAULT: ClockConfig = ClockConfig {
        tick_hz: 10_000,
        default_date: Date::from_ymd_unchecked(2023, 6, 11),
        default_time_cs: 2_885_900, // 08:00:59:00
        default_alarm_cs: 9 * 3600 * 100,
        default_stopwatch_cs: 3000,
        duty_window: DutyWindow { low: 2, high: 19 },
        boot_banner: *b"88888888",
    };

    /// Create a new configuration with validation
    pub fn new(
        tick_hz: u32,
        default_date: Date,
        default_time_cs: u32,
        default_alarm_cs: u32,
        default_stopwatch_cs: u32,
        duty_window: DutyWindow,
    ) -> Result<Self, &'static str> {
        if tick_hz == 0 || tick_hz % 1000 != 0 || tick_hz > 100_000 {
            return Err("Tick rate must be a multiple of 1 kHz up to 100 kHz");
        }
        if !default_date.is_valid() {
            return Err("Default date is not a calendar date");
        }
        if default_time_cs >= CENTIS_PER_DAY
            || default_alarm_cs >= CENTIS_PER_DAY
            || default_stopwatch_cs >= CENTIS_PER_DAY
        {
            return Err("Default times must be below 24h");
        }
        let fast_period = (tick_hz / 500) as u16;
        if duty_window.low >= duty_window.high || duty_window.high > fast_period + 1 {
            return Err("Duty window must lie inside the 2 ms period");
        }

        Ok(Self {
            tick_hz,
            default_date,
            default_time_cs,
            default_alarm_cs,
            default_stopwatch_cs,
            duty_window,
            ..Self::DEFAULT
        })
    }

    /// Ticks per millisecond
    pub const fn ticks_per_ms(&self) -> u32 {
        self.tick_hz / 1000
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
