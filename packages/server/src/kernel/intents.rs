//! Inbound chat actions.
//!
//! Inline buttons carry compact callback data (`ev_ok:12`, `reg_ok:3:12`).
//! `Intent` is the typed form; `dispatch` runs it with an explicit `Actor` and
//! turns every outcome, including errors, into a `Reply` for the caller.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::common::{Actor, AgentError, EventId, Result, UserId};
use crate::domains::approvers::Approver;
use crate::domains::calendar::{send_event_calendar, send_my_calendar, CalendarOutcome};
use crate::domains::events::actions::{
    approve_event, list_approved, next_for_review, reject_event, run_scan, set_required_rank,
    stats, ModerationOutcome, RankOutcome,
};
use crate::domains::members::actions::{
    approve_account, approve_all_registrations, decide_registration, reject_all_registrations,
    request_registration, DecisionOutcome, RegistrationOutcome,
};
use crate::kernel::{InlineAction, ServerDeps};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ReviewQueue { page: i64 },
    ApproveEvent(EventId),
    RejectEvent(EventId),
    SetRequiredRank { event_id: EventId, rank: i64 },
    Catalogue { page: i64 },
    Register(EventId),
    ApproveRegistration { user_id: UserId, event_id: EventId },
    RejectRegistration { user_id: UserId, event_id: EventId },
    ApproveAllRegistrations(EventId),
    RejectAllRegistrations(EventId),
    EventCalendar(EventId),
    MyCalendar,
    ApproveAccount(UserId),
    Scan,
    Stats,
}

impl Intent {
    pub fn callback_data(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::ReviewQueue { page } => write!(f, "queue:{}", page),
            Intent::ApproveEvent(id) => write!(f, "ev_ok:{}", id),
            Intent::RejectEvent(id) => write!(f, "ev_no:{}", id),
            Intent::SetRequiredRank { event_id, rank } => write!(f, "ev_rank:{}:{}", event_id, rank),
            Intent::Catalogue { page } => write!(f, "cat:{}", page),
            Intent::Register(id) => write!(f, "reg:{}", id),
            Intent::ApproveRegistration { user_id, event_id } => write!(f, "reg_ok:{}:{}", user_id, event_id),
            Intent::RejectRegistration { user_id, event_id } => write!(f, "reg_no:{}:{}", user_id, event_id),
            Intent::ApproveAllRegistrations(id) => write!(f, "reg_all_ok:{}", id),
            Intent::RejectAllRegistrations(id) => write!(f, "reg_all_no:{}", id),
            Intent::EventCalendar(id) => write!(f, "ics:{}", id),
            Intent::MyCalendar => f.write_str("my_ics"),
            Intent::ApproveAccount(id) => write!(f, "user_ok:{}", id),
            Intent::Scan => f.write_str("scan"),
            Intent::Stats => f.write_str("stats"),
        }
    }
}

impl FromStr for Intent {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || AgentError::Parse(format!("unknown action: {}", s));
        let mut parts = s.trim().split(':');
        let name = parts.next().ok_or_else(bad)?;
        let args: Vec<i64> = parts
            .map(|p| p.parse::<i64>().map_err(|_| bad()))
            .collect::<Result<_>>()?;

        let intent = match (name, args.as_slice()) {
            ("queue", [page]) => Intent::ReviewQueue { page: *page },
            ("ev_ok", [id]) => Intent::ApproveEvent(EventId::from_i64(*id)),
            ("ev_no", [id]) => Intent::RejectEvent(EventId::from_i64(*id)),
            ("ev_rank", [id, rank]) => Intent::SetRequiredRank {
                event_id: EventId::from_i64(*id),
                rank: *rank,
            },
            ("cat", [page]) => Intent::Catalogue { page: *page },
            ("reg", [id]) => Intent::Register(EventId::from_i64(*id)),
            ("reg_ok", [user, event]) => Intent::ApproveRegistration {
                user_id: UserId::from_i64(*user),
                event_id: EventId::from_i64(*event),
            },
            ("reg_no", [user, event]) => Intent::RejectRegistration {
                user_id: UserId::from_i64(*user),
                event_id: EventId::from_i64(*event),
            },
            ("reg_all_ok", [id]) => Intent::ApproveAllRegistrations(EventId::from_i64(*id)),
            ("reg_all_no", [id]) => Intent::RejectAllRegistrations(EventId::from_i64(*id)),
            ("ics", [id]) => Intent::EventCalendar(EventId::from_i64(*id)),
            ("my_ics", []) => Intent::MyCalendar,
            ("user_ok", [id]) => Intent::ApproveAccount(UserId::from_i64(*id)),
            ("scan", []) => Intent::Scan,
            ("stats", []) => Intent::Stats,
            _ => return Err(bad()),
        };
        Ok(intent)
    }
}

/// Text sent back to the chat that triggered an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub chat_id: i64,
    pub text: String,
    pub actions: Vec<InlineAction>,
}

impl Reply {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: Vec<InlineAction>) -> Self {
        self.actions = actions;
        self
    }
}

/// Build the actor for an inbound chat: active approvers carry their role.
pub async fn resolve_actor(chat_id: i64, deps: &ServerDeps) -> Result<Actor> {
    Ok(match Approver::find_by_chat_id(chat_id, &deps.db_pool).await? {
        Some(approver) if approver.active => Actor::new(chat_id, Some(approver.role)),
        _ => Actor::user(chat_id),
    })
}

/// Run an intent. Never fails: errors become a short reply.
pub async fn dispatch(actor: &Actor, intent: Intent, deps: &ServerDeps) -> Reply {
    match run(actor, intent, deps).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(chat_id = actor.chat_id, intent = %intent, error = %e, "Intent failed");
            Reply::text(actor.chat_id, e.user_message())
        }
    }
}

async fn run(actor: &Actor, intent: Intent, deps: &ServerDeps) -> Result<Reply> {
    let chat_id = actor.chat_id;

    let reply = match intent {
        Intent::ReviewQueue { page } => match next_for_review(actor, page, deps).await? {
            Some(item) => {
                let event = &item.event;
                let text = format!(
                    "📋 {}/{}\n\n{}\n🗓 {}\n📍 {}\n📊 {}/100 ({})\n🔗 {}\n\n{}",
                    item.position + 1,
                    item.total,
                    event.title,
                    event.date_text,
                    event.location,
                    event.score,
                    event.priority.as_str(),
                    event.url,
                    event.analysis.summary,
                );
                Reply::text(chat_id, text).with_actions(vec![
                    InlineAction::new("✅ Approve", Intent::ApproveEvent(event.id).callback_data()),
                    InlineAction::new("❌ Reject", Intent::RejectEvent(event.id).callback_data()),
                    InlineAction::new("➡️ Next", Intent::ReviewQueue { page: item.position + 1 }.callback_data()),
                ])
            }
            None => Reply::text(chat_id, "📭 The moderation queue is empty."),
        },

        Intent::ApproveEvent(id) => match approve_event(actor, id, deps).await? {
            ModerationOutcome::Approved(event) => Reply::text(chat_id, format!("✅ Approved: {}", event.title)),
            _ => Reply::text(chat_id, "This event is no longer in the queue."),
        },

        Intent::RejectEvent(id) => match reject_event(actor, id, deps).await? {
            ModerationOutcome::Rejected(_) => Reply::text(chat_id, "🗑 Event rejected."),
            _ => Reply::text(chat_id, "This event is no longer in the queue."),
        },

        Intent::SetRequiredRank { event_id, rank } => match set_required_rank(actor, event_id, rank, deps).await? {
            RankOutcome::Updated(event) => Reply::text(
                chat_id,
                format!("Required rank for «{}» is now {}.", event.title, event.required_rank),
            ),
            RankOutcome::NotFound(_) => Reply::text(chat_id, "Event not found."),
            RankOutcome::InvalidRank(_) => Reply::text(chat_id, "Rank must be between 1 and 5."),
        },

        Intent::Catalogue { page } => {
            let catalogue = list_approved(page, deps).await?;
            if catalogue.events.is_empty() {
                Reply::text(chat_id, "No events published yet.")
            } else {
                let mut text = format!("📅 Events, page {}/{}\n", catalogue.page + 1, catalogue.page_count());
                let mut actions = Vec::new();
                for event in &catalogue.events {
                    text.push_str(&format!("\n• {}\n  🗓 {} 📍 {}\n", event.title, event.date_text, event.location));
                    actions.push(InlineAction::new(
                        format!("📝 {}", event.title),
                        Intent::Register(event.id).callback_data(),
                    ));
                }
                if catalogue.page + 1 < catalogue.page_count() {
                    actions.push(InlineAction::new(
                        "➡️ More",
                        Intent::Catalogue { page: catalogue.page + 1 }.callback_data(),
                    ));
                }
                Reply::text(chat_id, text).with_actions(actions)
            }
        }

        Intent::Register(event_id) => {
            let text = match request_registration(actor, event_id, deps).await? {
                RegistrationOutcome::Approved { .. } => "✅ You are registered. The calendar file is on its way.".to_string(),
                RegistrationOutcome::PendingApproval { .. } => {
                    "⏳ Your request was sent to a manager for approval.".to_string()
                }
                RegistrationOutcome::AlreadyRequested => "You have already requested this event.".to_string(),
                RegistrationOutcome::RankTooLow { rank, required } => {
                    format!("This event requires rank {}; your profile has rank {}.", required, rank)
                }
                RegistrationOutcome::AccountNotApproved => {
                    "Your account is waiting for approval. Please try again later.".to_string()
                }
                RegistrationOutcome::EventNotFound => "Event not found.".to_string(),
            };
            Reply::text(chat_id, text)
        }

        Intent::ApproveRegistration { user_id, event_id } => {
            decision_reply(chat_id, decide_registration(actor, user_id, event_id, true, deps).await?)
        }

        Intent::RejectRegistration { user_id, event_id } => {
            decision_reply(chat_id, decide_registration(actor, user_id, event_id, false, deps).await?)
        }

        Intent::ApproveAllRegistrations(event_id) => {
            let bulk = approve_all_registrations(actor, event_id, deps).await?;
            Reply::text(
                chat_id,
                format!("✅ Approved {} registration(s); {} could not be notified.", bulk.users.len(), bulk.failed),
            )
        }

        Intent::RejectAllRegistrations(event_id) => {
            let bulk = reject_all_registrations(actor, event_id, deps).await?;
            Reply::text(
                chat_id,
                format!("❌ Rejected {} registration(s); {} could not be notified.", bulk.users.len(), bulk.failed),
            )
        }

        Intent::EventCalendar(event_id) => calendar_reply(chat_id, send_event_calendar(actor, event_id, deps).await?),

        Intent::MyCalendar => calendar_reply(chat_id, send_my_calendar(actor, deps).await?),

        Intent::ApproveAccount(user_id) => match approve_account(actor, user_id, deps).await? {
            Some(user) => Reply::text(chat_id, format!("✅ Account approved: {}", user.full_name)),
            None => Reply::text(chat_id, "No pending account with this id."),
        },

        Intent::Scan => {
            let report = run_scan(actor, None, deps).await?;
            Reply::text(
                chat_id,
                format!(
                    "🔎 Scan finished\nSources: {} ({} failed)\nCandidates: {}\nNew events: {}\nDuplicates: {}",
                    report.sources_scanned,
                    report.sources_failed.len(),
                    report.candidates,
                    report.created,
                    report.duplicates,
                ),
            )
        }

        Intent::Stats => {
            let s = stats(actor, deps).await?;
            let average = s
                .events
                .average_approved_score
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "—".to_string());
            Reply::text(
                chat_id,
                format!(
                    "📊 Events: {} (new {}, pending {}, approved {})\nHigh priority: {}\nAverage approved score: {}\nPending registrations: {}",
                    s.events.total,
                    s.events.new,
                    s.events.pending,
                    s.events.approved,
                    s.events.high_priority,
                    average,
                    s.pending_registrations,
                ),
            )
        }
    };

    Ok(reply)
}

fn decision_reply(chat_id: i64, outcome: DecisionOutcome) -> Reply {
    let text = match outcome {
        DecisionOutcome::Approved => "✅ Registration approved.",
        DecisionOutcome::Rejected => "❌ Registration rejected.",
        DecisionOutcome::NotFound => "This registration was already decided.",
    };
    Reply::text(chat_id, text)
}

fn calendar_reply(chat_id: i64, outcome: CalendarOutcome) -> Reply {
    let text = match outcome {
        CalendarOutcome::Sent { events } => format!("📅 Calendar sent ({} event(s)).", events),
        CalendarOutcome::EventNotFound => "Event not found.".to_string(),
        CalendarOutcome::NoEvents => "You have no approved registrations yet.".to_string(),
        CalendarOutcome::DeliveryFailed => "The calendar file could not be sent.".to_string(),
    };
    Reply::text(chat_id, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_data_parses_back() {
        let intents = [
            Intent::ApproveEvent(EventId::from_i64(12)),
            Intent::ApproveRegistration {
                user_id: UserId::from_i64(3),
                event_id: EventId::from_i64(12),
            },
            Intent::MyCalendar,
        ];
        for intent in intents {
            assert_eq!(intent.callback_data().parse::<Intent>().unwrap(), intent);
        }
    }

    #[test]
    fn known_wire_forms() {
        assert_eq!(
            "reg_ok:3:12".parse::<Intent>().unwrap(),
            Intent::ApproveRegistration {
                user_id: UserId::from_i64(3),
                event_id: EventId::from_i64(12),
            }
        );
        assert_eq!("ev_ok:12".parse::<Intent>().unwrap(), Intent::ApproveEvent(EventId::from_i64(12)));
    }

    #[test]
    fn malformed_data_is_a_parse_error() {
        for raw in ["", "ev_ok", "ev_ok:x", "reg_ok:3", "unknown:1", "scan:1"] {
            assert!(matches!(raw.parse::<Intent>(), Err(AgentError::Parse(_))), "{}", raw);
        }
    }
}
