//! Calendar delivery through the chat channel.

use chrono::Local;
use tracing::warn;

use super::ics::{event_calendar, events_calendar};
use crate::common::{Actor, EventId, Result};
use crate::domains::events::{Event, EventStatus};
use crate::domains::members::{Registration, User};
use crate::kernel::ServerDeps;

pub const EVENT_CALENDAR_FILENAME: &str = "event.ics";
pub const MY_EVENTS_FILENAME: &str = "my_events.ics";

/// Send one event's calendar file. Delivery failures are logged and reported
/// as `false`; they never fail the surrounding operation.
pub async fn deliver_event_calendar(chat_id: i64, event: &Event, deps: &ServerDeps) -> bool {
    let body = event_calendar(event, Local::now().naive_local());
    let caption = format!("📅 {}", event.title);

    match deps
        .messenger
        .send_document(chat_id, EVENT_CALENDAR_FILENAME, body.into_bytes(), Some(&caption))
        .await
    {
        Ok(()) => true,
        Err(e) => {
            warn!(chat_id, event_id = %event.id, error = %e, "Calendar delivery failed");
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarOutcome {
    Sent { events: usize },
    /// Unknown id, or the event is not approved yet
    EventNotFound,
    NoEvents,
    DeliveryFailed,
}

/// Calendar file for one approved event, on request.
pub async fn send_event_calendar(actor: &Actor, event_id: EventId, deps: &ServerDeps) -> Result<CalendarOutcome> {
    let event = match Event::find_by_id(event_id, &deps.db_pool).await? {
        Some(event) if event.status == EventStatus::Approved => event,
        _ => return Ok(CalendarOutcome::EventNotFound),
    };

    Ok(if deliver_event_calendar(actor.chat_id, &event, deps).await {
        CalendarOutcome::Sent { events: 1 }
    } else {
        CalendarOutcome::DeliveryFailed
    })
}

/// One calendar file with every approved registration of the caller.
pub async fn send_my_calendar(actor: &Actor, deps: &ServerDeps) -> Result<CalendarOutcome> {
    let Some(user) = User::find_by_chat_id(actor.chat_id, &deps.db_pool).await? else {
        return Ok(CalendarOutcome::NoEvents);
    };

    let events = Registration::find_events_for_user(user.id, true, &deps.db_pool).await?;
    if events.is_empty() {
        return Ok(CalendarOutcome::NoEvents);
    }

    let body = events_calendar(&events, Local::now().naive_local());
    let caption = format!("📅 {} events", events.len());
    match deps
        .messenger
        .send_document(actor.chat_id, MY_EVENTS_FILENAME, body.into_bytes(), Some(&caption))
        .await
    {
        Ok(()) => Ok(CalendarOutcome::Sent { events: events.len() }),
        Err(e) => {
            warn!(chat_id = actor.chat_id, error = %e, "Bulk calendar delivery failed");
            Ok(CalendarOutcome::DeliveryFailed)
        }
    }
}
