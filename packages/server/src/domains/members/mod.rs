//! Members domain - user profiles, seniority rank and event registrations.

pub mod actions;
pub mod models;
pub mod rank;

pub use models::{AccountStatus, Registration, RegistrationStatus, User};
pub use rank::{rank_for_position, AUTO_APPROVE_MAX_RANK};
