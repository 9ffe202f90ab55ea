pub mod registration;
pub mod user;

pub use registration::*;
pub use user::*;
