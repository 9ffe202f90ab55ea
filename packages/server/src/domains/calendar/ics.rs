//! Minimal iCalendar (RFC 5545) writer.

use chrono::{Duration, NaiveDateTime};
use sha2::{Digest, Sha256};

use crate::domains::events::date_parse::parse_event_date;
use crate::domains::events::models::is_http_url;
use crate::domains::events::Event;

const PRODID: &str = "-//Media Agent//Event Calendar//RU";
const STAMP_FORMAT: &str = "%Y%m%dT%H%M%S";
const EVENT_LENGTH_HOURS: i64 = 2;
const MAX_LINE_OCTETS: usize = 75;

/// A calendar holding one event.
pub fn event_calendar(event: &Event, now: NaiveDateTime) -> String {
    events_calendar(std::slice::from_ref(event), now)
}

/// A calendar holding every event in `events`.
pub fn events_calendar(events: &[Event], now: NaiveDateTime) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODID),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
    ];

    for event in events {
        push_event(&mut lines, event, now);
    }
    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in lines {
        out.push_str(&fold(&line));
        out.push_str("\r\n");
    }
    out
}

fn push_event(lines: &mut Vec<String>, event: &Event, now: NaiveDateTime) {
    let start = event
        .event_datetime
        .unwrap_or_else(|| parse_event_date(&event.date_text, now).datetime);
    let end = start + Duration::hours(EVENT_LENGTH_HOURS);

    lines.push("BEGIN:VEVENT".to_string());
    lines.push(format!("UID:{}", uid(event)));
    lines.push(format!("DTSTAMP:{}", now.format(STAMP_FORMAT)));
    lines.push(format!("DTSTART:{}", start.format(STAMP_FORMAT)));
    lines.push(format!("DTEND:{}", end.format(STAMP_FORMAT)));
    lines.push(format!("SUMMARY:{}", escape(&event.title)));
    if !event.description.is_empty() {
        lines.push(format!("DESCRIPTION:{}", escape(&event.description)));
    }
    if !event.location.is_empty() {
        lines.push(format!("LOCATION:{}", escape(&event.location)));
    }
    if is_http_url(&event.url) {
        lines.push(format!("URL:{}", event.url));
    }
    lines.push("END:VEVENT".to_string());
}

/// Stable per event, so re-importing updates instead of duplicating.
fn uid(event: &Event) -> String {
    let mut hasher = Sha256::new();
    hasher.update(event.id.into_i64().to_le_bytes());
    hasher.update(event.title.as_bytes());
    hasher.update(event.url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}@media-agent", &digest[..24])
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Split content lines longer than 75 octets without breaking a UTF-8 char.
fn fold(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            // the leading space counts toward the next line
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EventId;
    use crate::domains::classification::{EventAnalysis, Priority};
    use crate::domains::events::{EventStatus, Origin};
    use chrono::NaiveDate;
    use sqlx::types::Json;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 20)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn event(id: i64, title: &str) -> Event {
        Event {
            id: EventId::from_i64(id),
            title: title.to_string(),
            description: "Line one\nline two; with, punctuation".to_string(),
            location: "Санкт-Петербург".to_string(),
            date_text: "20.05.2026 18:30".to_string(),
            event_datetime: Some(at(18, 30)),
            url: "https://example.ru/e/1".to_string(),
            analysis: Json(EventAnalysis::fallback()),
            score: 70,
            priority: Priority::Medium,
            required_rank: 1,
            status: EventStatus::Approved,
            origin: Origin::Scan,
            created_at: at(9, 0),
        }
    }

    #[test]
    fn single_event_has_two_hour_window() {
        let ics = event_calendar(&event(1, "AI Meetup"), at(9, 0));

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("DTSTART:20260520T183000\r\n"));
        assert!(ics.contains("DTEND:20260520T203000\r\n"));
        assert!(ics.contains("SUMMARY:AI Meetup\r\n"));
        assert!(ics.contains("DESCRIPTION:Line one\\nline two\\; with\\, punctuation"));
    }

    #[test]
    fn bulk_calendar_holds_each_event() {
        let ics = events_calendar(&[event(1, "First"), event(2, "Second")], at(9, 0));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert_eq!(ics.matches("BEGIN:VCALENDAR").count(), 1);
    }

    #[test]
    fn uid_is_stable_and_distinct() {
        let a = uid(&event(1, "Same"));
        assert_eq!(a, uid(&event(1, "Same")));
        assert_ne!(a, uid(&event(2, "Same")));
    }

    #[test]
    fn long_lines_are_folded() {
        let title = "Очень длинное название мероприятия про искусственный интеллект";
        let ics = event_calendar(&event(1, title), at(9, 0));
        for line in ics.split("\r\n") {
            assert!(line.len() <= MAX_LINE_OCTETS, "{}", line);
        }
        let unfolded = ics.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("SUMMARY:{}", title)));
    }
}
