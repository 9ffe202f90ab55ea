//! Best-effort conversion of free-text event dates.
//!
//! Recognised shapes: `DD.MM.YYYY [HH:MM]`, `YYYY-MM-DD [HH:MM]`,
//! `DD.MM [HH:MM]`, `D month [YYYY] [HH:MM]` (Russian or English month
//! names, abbreviations allowed) and today/tomorrow words. A missing time
//! means 10:00. Unparseable text resolves to now + 1 day; a date in the past
//! is moved forward a year at a time. Both fallbacks are reported so the
//! caller can log them.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FULL_DOTTED: Regex =
        Regex::new(r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b").expect("valid regex");
    static ref ISO: Regex = Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid regex");
    static ref SHORT_DOTTED: Regex = Regex::new(r"\b(\d{1,2})\.(\d{1,2})\b").expect("valid regex");
    static ref DAY_MONTH_WORD: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+(янв|фев|мар|апр|ма[йя]|июн|июл|авг|сен|окт|ноя|дек|jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-zа-яё]*\.?(?:\s+(\d{4}))?"
    )
    .expect("valid regex");
    static ref RELATIVE_DAY: Regex =
        Regex::new(r"(?i)сегодня|завтра|\btoday\b|\btomorrow\b").expect("valid regex");
    static ref TIME: Regex = Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("valid regex");
}

/// Time used when the text carries a date but no time.
pub fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFallback {
    /// Nothing recognisable; resolved to now + 1 day
    Unparseable,
    /// Parsed date was in the past; moved forward by this many years
    RolledForward { years: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub datetime: NaiveDateTime,
    pub fallback: Option<DateFallback>,
}

/// Resolve `text` relative to `now`.
pub fn parse_event_date(text: &str, now: NaiveDateTime) -> ResolvedDate {
    let Some(parsed) = parse_explicit(text, now) else {
        return ResolvedDate {
            datetime: now + Duration::days(1),
            fallback: Some(DateFallback::Unparseable),
        };
    };

    if parsed >= now {
        return ResolvedDate {
            datetime: parsed,
            fallback: None,
        };
    }

    let mut years = 0;
    let mut candidate = parsed;
    while candidate < now {
        years += 1;
        match shift_years(parsed, years) {
            Some(shifted) => candidate = shifted,
            None => break,
        }
    }

    ResolvedDate {
        datetime: candidate,
        fallback: Some(DateFallback::RolledForward { years }),
    }
}

fn parse_explicit(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let date = parse_date(text, now.date())?;
    Some(date.and_time(parse_time(text).unwrap_or_else(default_time)))
}

fn parse_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(c) = FULL_DOTTED.captures(text) {
        return ymd(num(&c[3])?, num(&c[2])?, num(&c[1])?);
    }
    if let Some(c) = ISO.captures(text) {
        return ymd(num(&c[1])?, num(&c[2])?, num(&c[3])?);
    }
    if let Some(c) = DAY_MONTH_WORD.captures(text) {
        let day = num(&c[1])?;
        let month = month_number(&c[2])?;
        let year = match c.get(3) {
            Some(y) => num(y.as_str())?,
            None => today.year(),
        };
        return ymd(year, month, day);
    }
    if let Some(c) = RELATIVE_DAY.captures(text) {
        let word = c[0].to_lowercase();
        return Some(if word == "завтра" || word == "tomorrow" {
            today + Duration::days(1)
        } else {
            today
        });
    }
    // Short dotted form last: "10.30" alone is more often a time than a date.
    for c in SHORT_DOTTED.captures_iter(text) {
        if let Some(date) = ymd(today.year(), num(&c[2])?, num(&c[1])?) {
            return Some(date);
        }
    }
    None
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    let c = TIME.captures(text)?;
    NaiveTime::from_hms_opt(num(&c[1])? as u32, num(&c[2])? as u32, 0)
}

fn month_number(word: &str) -> Option<i32> {
    let w = word.to_lowercase();
    let month = match w.as_str() {
        "янв" | "jan" => 1,
        "фев" | "feb" => 2,
        "мар" | "mar" => 3,
        "апр" | "apr" => 4,
        "май" | "мая" | "may" => 5,
        "июн" | "jun" => 6,
        "июл" | "jul" => 7,
        "авг" | "aug" => 8,
        "сен" | "sep" => 9,
        "окт" | "oct" => 10,
        "ноя" | "nov" => 11,
        "дек" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn num(s: &str) -> Option<i32> {
    s.parse().ok()
}

fn ymd(year: i32, month: i32, day: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

/// Same calendar date `years` later; Feb 29 falls back to Feb 28.
fn shift_years(dt: NaiveDateTime, years: i32) -> Option<NaiveDateTime> {
    let date = dt.date();
    let target = date.year() + years;
    date.with_year(target)
        .or_else(|| NaiveDate::from_ymd_opt(target, date.month(), 28))
        .map(|d| d.and_time(dt.time()))
}
