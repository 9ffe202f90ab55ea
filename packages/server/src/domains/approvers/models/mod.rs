pub mod approver;

pub use approver::*;
