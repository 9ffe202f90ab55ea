use super::{ApproverRole, AuthError, Capability};

/// Caller identity passed explicitly through every operation
///
/// Usage:
/// ```
/// use agent_core::common::auth::{Actor, ApproverRole, Capability};
///
/// let actor = Actor::new(42, Some(ApproverRole::Admin));
/// assert!(actor.can(Capability::ModerateEvents).check().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub chat_id: i64,
    pub role: Option<ApproverRole>,
}

impl Actor {
    pub fn new(chat_id: i64, role: Option<ApproverRole>) -> Self {
        Self { chat_id, role }
    }

    /// An actor with no approver role.
    pub fn user(chat_id: i64) -> Self {
        Self::new(chat_id, None)
    }

    /// Internal caller for scheduled jobs and the CLI.
    pub fn system() -> Self {
        Self::new(0, Some(ApproverRole::TechSupport))
    }

    pub fn is_approver(&self) -> bool {
        self.role.is_some()
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: Capability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor: self,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor: Actor,
    capability: Capability,
}

impl CapabilityBuilder {
    /// Perform the authorization check
    pub fn check(self) -> Result<(), AuthError> {
        match self.actor.role {
            None => Err(AuthError::ApproverRequired),
            Some(role) if role.allows(self.capability) => Ok(()),
            Some(role) => Err(AuthError::PermissionDenied(format!(
                "{} cannot {:?}",
                role, self.capability
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_user_rejected() {
        let result = Actor::user(5).can(Capability::ModerateEvents).check();
        assert_eq!(result, Err(AuthError::ApproverRequired));
    }

    #[test]
    fn test_role_without_capability_rejected() {
        let result = Actor::new(5, Some(ApproverRole::Manager))
            .can(Capability::ManageSources)
            .check();
        assert!(matches!(result, Err(AuthError::PermissionDenied(_))));
    }

    #[test]
    fn test_system_actor_can_scan() {
        assert!(Actor::system().can(Capability::TriggerScan).check().is_ok());
    }
}
