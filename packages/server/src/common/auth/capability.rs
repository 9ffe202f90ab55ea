use std::fmt;
use std::str::FromStr;

/// What an actor is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Review, approve, reject and edit scanned events
    ModerateEvents,

    /// Start a source scan
    TriggerScan,

    /// Partner invites, file imports, manual events
    ImportEvents,

    /// Create, toggle and delete sources
    ManageSources,

    /// Decide pending event registrations
    ManageRegistrations,

    /// Add, remove and re-role approvers
    ManageApprovers,

    /// Approve user accounts
    ManageUsers,

    /// Read counters
    ViewStats,
}

/// Role of a chat account in the approvers table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "PascalCase")]
pub enum ApproverRole {
    GreatAdmin,
    Admin,
    Manager,
    TechSupport,
}

impl ApproverRole {
    pub const ALL: [ApproverRole; 4] = [
        ApproverRole::GreatAdmin,
        ApproverRole::Admin,
        ApproverRole::Manager,
        ApproverRole::TechSupport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApproverRole::GreatAdmin => "GreatAdmin",
            ApproverRole::Admin => "Admin",
            ApproverRole::Manager => "Manager",
            ApproverRole::TechSupport => "TechSupport",
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            ApproverRole::GreatAdmin | ApproverRole::TechSupport => true,
            ApproverRole::Admin => !matches!(capability, ManageApprovers | ManageRegistrations),
            ApproverRole::Manager => matches!(capability, ManageRegistrations | ViewStats),
        }
    }

    /// Roles that receive registration escalations and backlog reminders.
    pub fn approves_registrations(&self) -> bool {
        matches!(self, ApproverRole::Manager | ApproverRole::GreatAdmin)
    }
}

impl fmt::Display for ApproverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApproverRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApproverRole::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown approver role: {}", s))
    }
}
