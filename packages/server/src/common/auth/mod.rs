/// Authorization for chat-driven operations
///
/// Every inbound action carries an explicit `Actor`. Operations that need a
/// privilege check it up front:
///
/// ```rust,ignore
/// use crate::common::auth::{Actor, Capability};
///
/// actor.can(Capability::ModerateEvents).check()?;
/// ```

mod builder;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::{ApproverRole, Capability};
pub use errors::AuthError;
