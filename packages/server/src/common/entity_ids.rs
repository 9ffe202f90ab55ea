//! Typed ID definitions for all domain entities.
//!
//! ```rust
//! use agent_core::common::{EventId, UserId};
//!
//! let event_id = EventId::from_i64(1);
//! let user_id = UserId::from_i64(1);
//! // let wrong: EventId = user_id; // compile error
//! # let _ = (event_id, user_id);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Event entities.
pub struct Event;

/// Marker type for User entities (people who register for events).
pub struct User;

/// Marker type for Source entities (pages the extractor scans).
pub struct Source;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type EventId = Id<Event>;

pub type UserId = Id<User>;

pub type SourceId = Id<Source>;
