//! Source domain - pages the extractor scans.

pub mod actions;
pub mod models;

pub use models::Source;
