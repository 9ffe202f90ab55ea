// Event Media Agent - Core
//
// Aggregates candidate events from web sources, scores them with an external
// classifier plus deterministic rules, and runs moderation, registration
// admission and approver reminders over a chat channel.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
