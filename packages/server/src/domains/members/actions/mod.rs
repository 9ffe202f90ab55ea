//! Members domain actions

pub mod admission;
pub mod profile;

pub use admission::*;
pub use profile::*;
