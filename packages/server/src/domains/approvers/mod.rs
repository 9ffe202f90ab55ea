//! Approvers domain - roles, reminder schedules and backlog reminders.

pub mod actions;
pub mod models;
pub mod schedule;

pub use models::Approver;
pub use schedule::{NotifyDay, NotifyTime, Tick};
