//! Reminder schedule values as stored on an approver.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyDay {
    /// Monday = 0
    Weekday(u32),
    EveryDay,
    /// Only on the first day of the month
    EveryMonth,
}

impl NotifyDay {
    pub fn as_stored(&self) -> String {
        match self {
            NotifyDay::Weekday(d) => d.to_string(),
            NotifyDay::EveryDay => "every_day".to_string(),
            NotifyDay::EveryMonth => "every_month".to_string(),
        }
    }
}

const WEEKDAY_NAMES: [[&str; 4]; 7] = [
    ["mon", "monday", "пн", "понедельник"],
    ["tue", "tuesday", "вт", "вторник"],
    ["wed", "wednesday", "ср", "среда"],
    ["thu", "thursday", "чт", "четверг"],
    ["fri", "friday", "пт", "пятница"],
    ["sat", "saturday", "сб", "суббота"],
    ["sun", "sunday", "вс", "воскресенье"],
];

impl FromStr for NotifyDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "every_day" | "daily" | "ежедневно" => return Ok(NotifyDay::EveryDay),
            "every_month" | "monthly" | "ежемесячно" => return Ok(NotifyDay::EveryMonth),
            _ => {}
        }
        if let Ok(d) = s.parse::<u32>() {
            if d < 7 {
                return Ok(NotifyDay::Weekday(d));
            }
        }
        WEEKDAY_NAMES
            .iter()
            .position(|names| names.contains(&s.as_str()))
            .map(|i| NotifyDay::Weekday(i as u32))
            .ok_or_else(|| format!("unknown notify day: {}", s))
    }
}

/// Minute of day, stored as zero-padded "HH:MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyTime {
    pub hour: u32,
    pub minute: u32,
}

impl NotifyTime {
    pub fn of(dt: &NaiveDateTime) -> Self {
        Self {
            hour: dt.hour(),
            minute: dt.minute(),
        }
    }
}

impl fmt::Display for NotifyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for NotifyTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got {}", s))?;
        let hour: u32 = h.parse().map_err(|_| format!("bad hour in {}", s))?;
        let minute: u32 = m.parse().map_err(|_| format!("bad minute in {}", s))?;
        if hour > 23 || minute > 59 || m.len() != 2 {
            return Err(format!("expected HH:MM, got {}", s));
        }
        Ok(Self { hour, minute })
    }
}

/// What the scheduler matches against at `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub weekday: u32,
    pub time: NotifyTime,
    pub first_of_month: bool,
}

impl Tick {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            weekday: now.weekday().num_days_from_monday(),
            time: NotifyTime::of(&now),
            first_of_month: now.day() == 1,
        }
    }
}
