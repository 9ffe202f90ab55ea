//! Events domain - ingestion, moderation and catalogue of events.

pub mod actions;
pub mod date_parse;
pub mod models;

pub use models::{Event, EventStatus, NewEvent, Origin};
