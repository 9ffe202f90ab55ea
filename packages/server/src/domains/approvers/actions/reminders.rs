//! Backlog reminders for approvers, run once per minute by the scheduler.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::common::Result;
use crate::domains::approvers::models::Approver;
use crate::domains::approvers::schedule::Tick;
use crate::domains::members::Registration;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderReport {
    /// Approvers whose schedule matched this minute
    pub matched: usize,
    pub pending: i64,
    pub sent: usize,
    pub failed: usize,
}

/// Remind every approver scheduled for `now` about pending registrations.
///
/// Nothing is sent when the backlog is empty, even on a schedule hit.
pub async fn send_backlog_reminders(now: NaiveDateTime, deps: &ServerDeps) -> Result<ReminderReport> {
    let tick = Tick::at(now);
    let due = Approver::find_due(
        tick.weekday,
        &tick.time.to_string(),
        tick.first_of_month,
        &deps.db_pool,
    )
    .await?;

    let mut report = ReminderReport {
        matched: due.len(),
        ..ReminderReport::default()
    };
    if due.is_empty() {
        return Ok(report);
    }

    report.pending = Registration::count_pending(&deps.db_pool).await?;
    if report.pending == 0 {
        debug!(matched = report.matched, "Reminder due but backlog is empty");
        return Ok(report);
    }

    let text = format!(
        "⏰ Reminder: {} registration request(s) are waiting for your decision.",
        report.pending
    );
    for approver in &due {
        match deps.messenger.send_text(approver.chat_id, &text, &[]).await {
            Ok(()) => report.sent += 1,
            Err(e) => {
                warn!(chat_id = approver.chat_id, error = %e, "Reminder not delivered");
                report.failed += 1;
            }
        }
    }

    info!(
        pending = report.pending,
        sent = report.sent,
        failed = report.failed,
        "Backlog reminders sent"
    );
    Ok(report)
}
