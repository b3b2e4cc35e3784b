//! Gregorian date arithmetic
//!
//! Each increment path keeps its own year wrap point: day and month
//! increments roll 9999 over to 1, the single-year adjustment rolls 10000
//! to 0 and the century adjustment subtracts 9000 once the year reaches
//! 10000.

use core::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

pub const fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

impl Date {
    pub const fn from_ymd_unchecked(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Option<Self> {
        let date = Self::from_ymd_unchecked(year, month, day);
        if date.is_valid() {
            Some(date)
        } else {
            None
        }
    }

    /// Year 1..=9999 and a day that exists in that month
    pub const fn is_valid(&self) -> bool {
        self.year >= 1
            && self.year <= 9999
            && self.month >= 1
            && self.month <= 12
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
    }

    pub fn add_one_day(&mut self) {
        if self.day < days_in_month(self.year, self.month) {
            self.day += 1;
            return;
        }
        self.day = 1;
        if self.month < 12 {
            self.month += 1;
        } else {
            self.month = 1;
            self.year = if self.year >= 9999 { 1 } else { self.year + 1 };
        }
    }

    /// Jan 31 + 1 month lands on the last day of February
    pub fn add_one_month(&mut self) {
        if self.month < 12 {
            self.month += 1;
        } else {
            self.month = 1;
            self.year = if self.year >= 9999 { 1 } else { self.year + 1 };
        }
        self.clamp_day();
    }

    /// Switch adjustment of the year ones field
    pub fn add_one_year(&mut self) {
        self.year += 1;
        if self.year == 10_000 {
            self.year = 0;
        }
        self.clamp_day();
    }

    /// Switch adjustment of the year hundreds field
    pub fn add_one_century(&mut self) {
        self.year += 100;
        if self.year >= 10_000 {
            self.year -= 9_000;
        }
        self.clamp_day();
    }

    fn clamp_day(&mut self) {
        let last = days_in_month(self.year, self.month);
        if self.day > last {
            self.day = last;
        }
    }

    /// `(year << 16) | (month << 8) | day`
    pub const fn to_word(&self) -> u32 {
        (self.year as u32) << 16 | (self.month as u32) << 8 | self.day as u32
    }

    pub const fn from_word(word: u32) -> Self {
        Self {
            year: (word >> 16) as u16,
            month: (word >> 8) as u8,
            day: word as u8,
        }
    }
}

/// ISO style `YYYY-MM-DD`
impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}
