//! Calendar domain - iCalendar export of approved events.

pub mod actions;
pub mod ics;

pub use actions::*;
pub use ics::{event_calendar, events_calendar};
