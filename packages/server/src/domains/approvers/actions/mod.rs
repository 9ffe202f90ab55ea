//! Approvers domain actions

pub mod manage;
pub mod reminders;

pub use manage::*;
pub use reminders::*;
