//! Registration admission: auto-approve or escalate by seniority rank.
//!
//! Users whose rank is at or below `AUTO_APPROVE_MAX_RANK` are approved on the
//! spot and get the calendar file. Higher ranks wait for a manager.

use futures::future::join_all;
use tracing::{info, warn};

use crate::common::{Actor, Capability, EventId, Result, UserId};
use crate::domains::approvers::Approver;
use crate::domains::calendar::deliver_event_calendar;
use crate::domains::events::{Event, EventStatus};
use crate::domains::members::models::{Registration, User};
use crate::domains::members::rank::{rank_for_position, AUTO_APPROVE_MAX_RANK};
use crate::kernel::{InlineAction, Intent, ServerDeps};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Approved without a human; `calendar_sent` reports the file delivery
    Approved { calendar_sent: bool },
    /// Waiting for a manager; `notified` approvers were reached
    PendingApproval { notified: usize },
    AlreadyRequested,
    RankTooLow { rank: u8, required: u8 },
    AccountNotApproved,
    EventNotFound,
}

/// Request a seat on an approved event.
pub async fn request_registration(actor: &Actor, event_id: EventId, deps: &ServerDeps) -> Result<RegistrationOutcome> {
    let pool = &deps.db_pool;

    let user = match User::find_by_chat_id(actor.chat_id, pool).await? {
        Some(user) if user.is_approved() => user,
        _ => return Ok(RegistrationOutcome::AccountNotApproved),
    };

    let event = match Event::find_by_id(event_id, pool).await? {
        Some(event) if event.status == EventStatus::Approved => event,
        _ => return Ok(RegistrationOutcome::EventNotFound),
    };

    let rank = rank_for_position(&user.position);
    if rank < event.required_rank {
        return Ok(RegistrationOutcome::RankTooLow {
            rank,
            required: event.required_rank,
        });
    }

    if Registration::create_pending(user.id, event.id, pool).await?.is_none() {
        return Ok(RegistrationOutcome::AlreadyRequested);
    }

    if rank <= AUTO_APPROVE_MAX_RANK {
        Registration::approve(user.id, event.id, pool).await?;
        info!(user_id = %user.id, event_id = %event.id, rank, "Registration auto-approved");
        let calendar_sent = deliver_event_calendar(user.chat_id, &event, deps).await;
        return Ok(RegistrationOutcome::Approved { calendar_sent });
    }

    let notified = escalate(&user, rank, &event, deps).await?;
    info!(user_id = %user.id, event_id = %event.id, rank, notified, "Registration escalated");
    Ok(RegistrationOutcome::PendingApproval { notified })
}

async fn escalate(user: &User, rank: u8, event: &Event, deps: &ServerDeps) -> Result<usize> {
    let approvers = Approver::find_registration_approvers(&deps.db_pool).await?;
    if approvers.is_empty() {
        warn!(event_id = %event.id, "No active approver for registration escalation");
        return Ok(0);
    }

    let text = format!(
        "📝 Registration request\n\n👤 {}\n💼 {} (rank {})\n\n📅 {}\n🗓 {}\n📍 {}",
        display_name(user),
        if user.position.is_empty() { "—" } else { user.position.as_str() },
        rank,
        event.title,
        event.date_text,
        event.location,
    );
    let actions = [
        InlineAction::new(
            "✅ Approve",
            Intent::ApproveRegistration { user_id: user.id, event_id: event.id }.callback_data(),
        ),
        InlineAction::new(
            "❌ Reject",
            Intent::RejectRegistration { user_id: user.id, event_id: event.id }.callback_data(),
        ),
    ];

    let mut notified = 0;
    for approver in &approvers {
        match deps.messenger.send_text(approver.chat_id, &text, &actions).await {
            Ok(()) => notified += 1,
            Err(e) => warn!(chat_id = approver.chat_id, error = %e, "Escalation not delivered"),
        }
    }
    Ok(notified)
}

fn display_name(user: &User) -> String {
    if user.full_name.is_empty() {
        format!("chat {}", user.chat_id)
    } else {
        user.full_name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    Approved,
    Rejected,
    /// Not pending: unknown pair or already decided
    NotFound,
}

/// Decide one pending registration and tell the requester.
pub async fn decide_registration(
    actor: &Actor,
    user_id: UserId,
    event_id: EventId,
    approve: bool,
    deps: &ServerDeps,
) -> Result<DecisionOutcome> {
    actor.can(Capability::ManageRegistrations).check()?;
    let pool = &deps.db_pool;

    let decided = if approve {
        Registration::approve(user_id, event_id, pool).await?.is_some()
    } else {
        Registration::reject(user_id, event_id, pool).await?
    };
    if !decided {
        return Ok(DecisionOutcome::NotFound);
    }

    info!(user_id = %user_id, event_id = %event_id, approve, approver = actor.chat_id, "Registration decided");

    if let (Some(user), Some(event)) = (
        User::find_by_id(user_id, pool).await?,
        Event::find_by_id(event_id, pool).await?,
    ) {
        notify_decision(&user, &event, approve, deps).await;
    }

    Ok(if approve {
        DecisionOutcome::Approved
    } else {
        DecisionOutcome::Rejected
    })
}

/// Result of a bulk decision. `failed` counts users that could not be reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDecision {
    pub users: Vec<UserId>,
    pub delivered: usize,
    pub failed: usize,
}

/// Approve every pending registration of an event, then notify each user and
/// send them the calendar file.
pub async fn approve_all_registrations(actor: &Actor, event_id: EventId, deps: &ServerDeps) -> Result<BulkDecision> {
    actor.can(Capability::ManageRegistrations).check()?;
    let users = Registration::approve_all_pending(event_id, &deps.db_pool).await?;
    info!(event_id = %event_id, count = users.len(), "All pending registrations approved");
    fan_out(users, event_id, true, deps).await
}

/// Reject every pending registration of an event, then notify each user.
pub async fn reject_all_registrations(actor: &Actor, event_id: EventId, deps: &ServerDeps) -> Result<BulkDecision> {
    actor.can(Capability::ManageRegistrations).check()?;
    let users = Registration::reject_all_pending(event_id, &deps.db_pool).await?;
    info!(event_id = %event_id, count = users.len(), "All pending registrations rejected");
    fan_out(users, event_id, false, deps).await
}

async fn fan_out(users: Vec<UserId>, event_id: EventId, approved: bool, deps: &ServerDeps) -> Result<BulkDecision> {
    let mut decision = BulkDecision {
        users,
        ..BulkDecision::default()
    };
    let Some(event) = Event::find_by_id(event_id, &deps.db_pool).await? else {
        return Ok(decision);
    };

    let mut recipients = Vec::with_capacity(decision.users.len());
    for user_id in &decision.users {
        match User::find_by_id(*user_id, &deps.db_pool).await? {
            Some(user) => recipients.push(user),
            None => decision.failed += 1,
        }
    }

    let results = join_all(
        recipients
            .iter()
            .map(|user| notify_decision(user, &event, approved, deps)),
    )
    .await;

    for delivered in results {
        if delivered {
            decision.delivered += 1;
        } else {
            decision.failed += 1;
        }
    }
    Ok(decision)
}

/// Message the requester, plus the calendar file on approval. Returns whether
/// everything arrived.
async fn notify_decision(user: &User, event: &Event, approved: bool, deps: &ServerDeps) -> bool {
    let text = if approved {
        format!("✅ Your registration for «{}» is approved.", event.title)
    } else {
        format!("❌ Your registration for «{}» was declined.", event.title)
    };

    if let Err(e) = deps.messenger.send_text(user.chat_id, &text, &[]).await {
        warn!(chat_id = user.chat_id, event_id = %event.id, error = %e, "Decision notice not delivered");
        return false;
    }

    if approved {
        return deliver_event_calendar(user.chat_id, event, deps).await;
    }
    true
}

/// Pending registrations, oldest first, for the approver screen.
pub async fn list_pending_registrations(actor: &Actor, limit: i64, deps: &ServerDeps) -> Result<Vec<Registration>> {
    actor.can(Capability::ManageRegistrations).check()?;
    Registration::find_pending(limit, &deps.db_pool).await
}
