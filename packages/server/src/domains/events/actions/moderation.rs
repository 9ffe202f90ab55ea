//! Moderation queue: review, approve, reject, edit.
//!
//! There is no locking. Two approvers acting on the same event both succeed
//! or the second one gets `NotFound`; nothing is corrupted either way.

use chrono::Local;
use tracing::info;

use crate::common::{Actor, Capability, EventId, Result};
use crate::domains::events::date_parse::parse_event_date;
use crate::domains::events::models::{is_http_url, is_sentinel_url, Event, EventField, EventStatus};
use crate::kernel::database::is_unique_violation;
use crate::kernel::ServerDeps;

pub const MIN_REQUIRED_RANK: u8 = 1;
pub const MAX_REQUIRED_RANK: u8 = 5;

/// The event at a queue position, with the queue size at read time.
#[derive(Debug, Clone)]
pub struct ReviewItem {
    pub event: Event,
    pub position: i64,
    pub total: i64,
}

/// Show the queued event at `page` (oldest first). Presenting a `new` event
/// moves it to `pending`.
pub async fn next_for_review(actor: &Actor, page: i64, deps: &ServerDeps) -> Result<Option<ReviewItem>> {
    actor.can(Capability::ModerateEvents).check()?;

    let pool = &deps.db_pool;
    let total = Event::count_queued(pool).await?;
    if total == 0 {
        return Ok(None);
    }

    // Wrap around so paging past the end restarts at the oldest item.
    let position = page.rem_euclid(total);
    let Some(mut event) = Event::find_queued_at(position, pool).await? else {
        return Ok(None);
    };

    if Event::mark_presented(event.id, pool).await? {
        event.status = EventStatus::Pending;
    }

    Ok(Some(ReviewItem {
        event,
        position,
        total,
    }))
}

#[derive(Debug, Clone)]
pub enum ModerationOutcome {
    Approved(Event),
    Rejected(EventId),
    /// Unknown id, or already resolved by someone else
    NotFound(EventId),
}

pub async fn approve_event(actor: &Actor, id: EventId, deps: &ServerDeps) -> Result<ModerationOutcome> {
    actor.can(Capability::ModerateEvents).check()?;

    Ok(match Event::approve(id, &deps.db_pool).await? {
        Some(event) => {
            info!(event_id = %id, approver = actor.chat_id, "Event approved");
            ModerationOutcome::Approved(event)
        }
        None => ModerationOutcome::NotFound(id),
    })
}

/// Rejection deletes the row; registrations cascade.
pub async fn reject_event(actor: &Actor, id: EventId, deps: &ServerDeps) -> Result<ModerationOutcome> {
    actor.can(Capability::ModerateEvents).check()?;

    Ok(if Event::reject(id, &deps.db_pool).await? {
        info!(event_id = %id, approver = actor.chat_id, "Event rejected");
        ModerationOutcome::Rejected(id)
    } else {
        ModerationOutcome::NotFound(id)
    })
}

#[derive(Debug, Clone)]
pub enum EditOutcome {
    Updated(Event),
    NotFound(EventId),
    InvalidUrl(String),
    DuplicateUrl(String),
    EmptyValue,
}

/// Change one field in place. Status is untouched.
pub async fn edit_event(
    actor: &Actor,
    id: EventId,
    field: EventField,
    value: &str,
    deps: &ServerDeps,
) -> Result<EditOutcome> {
    actor.can(Capability::ModerateEvents).check()?;

    let value = value.trim();
    if value.is_empty() && field == EventField::Title {
        return Ok(EditOutcome::EmptyValue);
    }

    let mut event_datetime = None;
    match field {
        EventField::Url => {
            if !is_http_url(value) && !is_sentinel_url(value) {
                return Ok(EditOutcome::InvalidUrl(value.to_string()));
            }
        }
        EventField::Date => {
            event_datetime = Some(parse_event_date(value, Local::now().naive_local()).datetime);
        }
        _ => {}
    }

    match Event::update_field(id, &field, value, event_datetime, &deps.db_pool).await {
        Ok(Some(event)) => {
            info!(event_id = %id, field = ?field, "Event edited");
            Ok(EditOutcome::Updated(event))
        }
        Ok(None) => Ok(EditOutcome::NotFound(id)),
        Err(e) if is_unique_violation(&e) => Ok(EditOutcome::DuplicateUrl(value.to_string())),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Clone)]
pub enum RankOutcome {
    Updated(Event),
    NotFound(EventId),
    InvalidRank(i64),
}

pub async fn set_required_rank(
    actor: &Actor,
    id: EventId,
    rank: i64,
    deps: &ServerDeps,
) -> Result<RankOutcome> {
    actor.can(Capability::ModerateEvents).check()?;

    let valid = i64::from(MIN_REQUIRED_RANK)..=i64::from(MAX_REQUIRED_RANK);
    if !valid.contains(&rank) {
        return Ok(RankOutcome::InvalidRank(rank));
    }

    Ok(match Event::set_required_rank(id, rank as u8, &deps.db_pool).await? {
        Some(event) => {
            info!(event_id = %id, rank, "Required rank changed");
            RankOutcome::Updated(event)
        }
        None => RankOutcome::NotFound(id),
    })
}
