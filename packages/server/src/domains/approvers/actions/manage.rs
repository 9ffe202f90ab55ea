use tracing::info;

use crate::common::{Actor, ApproverRole, Capability, Result};
use crate::domains::approvers::models::Approver;
use crate::domains::approvers::schedule::{NotifyDay, NotifyTime};
use crate::kernel::ServerDeps;

pub async fn list_approvers(actor: &Actor, deps: &ServerDeps) -> Result<Vec<Approver>> {
    actor.can(Capability::ManageApprovers).check()?;
    Approver::find_all(&deps.db_pool).await
}

/// Add an approver, or change the role of an existing one.
pub async fn add_approver(
    actor: &Actor,
    chat_id: i64,
    username: &str,
    role: ApproverRole,
    deps: &ServerDeps,
) -> Result<Approver> {
    actor.can(Capability::ManageApprovers).check()?;

    let approver = Approver::upsert(chat_id, username.trim().trim_start_matches('@'), role, &deps.db_pool).await?;
    info!(chat_id, role = %role, by = actor.chat_id, "Approver added");
    Ok(approver)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveApproverOutcome {
    Removed,
    NotFound,
    /// Approvers cannot remove themselves
    CannotRemoveSelf,
}

pub async fn remove_approver(actor: &Actor, chat_id: i64, deps: &ServerDeps) -> Result<RemoveApproverOutcome> {
    actor.can(Capability::ManageApprovers).check()?;

    if chat_id == actor.chat_id {
        return Ok(RemoveApproverOutcome::CannotRemoveSelf);
    }

    Ok(if Approver::delete(chat_id, &deps.db_pool).await? {
        info!(chat_id, by = actor.chat_id, "Approver removed");
        RemoveApproverOutcome::Removed
    } else {
        RemoveApproverOutcome::NotFound
    })
}

/// None if `chat_id` is not an approver.
pub async fn change_approver_role(
    actor: &Actor,
    chat_id: i64,
    role: ApproverRole,
    deps: &ServerDeps,
) -> Result<Option<Approver>> {
    actor.can(Capability::ManageApprovers).check()?;
    Approver::set_role(chat_id, role, &deps.db_pool).await
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleOutcome {
    Updated(Approver),
    NotFound,
    InvalidDay(String),
    InvalidTime(String),
}

/// Set when an approver gets backlog reminders. Anyone may set their own;
/// setting someone else's needs approver management rights.
pub async fn set_notify_schedule(
    actor: &Actor,
    chat_id: i64,
    day: &str,
    time: &str,
    deps: &ServerDeps,
) -> Result<ScheduleOutcome> {
    if chat_id != actor.chat_id {
        actor.can(Capability::ManageApprovers).check()?;
    }

    let day: NotifyDay = match day.parse() {
        Ok(day) => day,
        Err(_) => return Ok(ScheduleOutcome::InvalidDay(day.to_string())),
    };
    let time: NotifyTime = match time.parse() {
        Ok(time) => time,
        Err(_) => return Ok(ScheduleOutcome::InvalidTime(time.to_string())),
    };

    Ok(
        match Approver::set_schedule(chat_id, &day.as_stored(), &time.to_string(), &deps.db_pool).await? {
            Some(approver) => {
                info!(chat_id, day = ?day, time = %time, "Reminder schedule set");
                ScheduleOutcome::Updated(approver)
            }
            None => ScheduleOutcome::NotFound,
        },
    )
}

/// Pause or resume an approver. Inactive approvers get no escalations or reminders.
pub async fn set_approver_active(
    actor: &Actor,
    chat_id: i64,
    active: bool,
    deps: &ServerDeps,
) -> Result<Option<Approver>> {
    if chat_id != actor.chat_id {
        actor.can(Capability::ManageApprovers).check()?;
    }
    Approver::set_active(chat_id, active, &deps.db_pool).await
}
