//! Scraping domain - best-effort candidate extraction from source pages.
//!
//! There are no per-site selectors: blocks are picked from generic markup
//! patterns and kept only when they look like an event.

pub mod extractor;
pub mod heuristics;

pub use extractor::{extract_from_sources, ExtractionReport};
pub use heuristics::{extract_candidates, CandidateEvent, MAX_CANDIDATES_PER_SOURCE};
