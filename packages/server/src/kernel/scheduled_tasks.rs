//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (every minute, second 0)
//!     └─► send_backlog_reminders(now)
//!
//! Scheduler (SCAN_SCHEDULE, optional)
//!     └─► run_scan(Actor::system())
//! ```
//!
//! A failing tick is logged; the next tick runs as usual.

use anyhow::{Context, Result};
use chrono::Local;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::common::Actor;
use crate::domains::approvers::actions::send_backlog_reminders;
use crate::domains::events::actions::run_scan;
use crate::kernel::ServerDeps;

pub const REMINDER_SCHEDULE: &str = "0 * * * * *";

/// Start all scheduled tasks
pub async fn start_scheduler(deps: ServerDeps, scan_schedule: Option<&str>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let reminder_deps = deps.clone();
    let reminder_job = Job::new_async(REMINDER_SCHEDULE, move |_uuid, _lock| {
        let deps = reminder_deps.clone();
        Box::pin(async move {
            run_reminder_tick(&deps).await;
        })
    })?;
    scheduler.add(reminder_job).await?;

    if let Some(schedule) = scan_schedule {
        let scan_deps = deps.clone();
        let scan_job = Job::new_async(schedule, move |_uuid, _lock| {
            let deps = scan_deps.clone();
            Box::pin(async move {
                run_periodic_scan(&deps).await;
            })
        })
        .with_context(|| format!("Invalid SCAN_SCHEDULE: {}", schedule))?;
        scheduler.add(scan_job).await?;
    }

    scheduler.start().await?;

    tracing::info!(
        scan_schedule = scan_schedule.unwrap_or("off"),
        "Scheduled tasks started (backlog reminders every minute)"
    );
    Ok(scheduler)
}

async fn run_reminder_tick(deps: &ServerDeps) {
    let now = Local::now().naive_local();
    if let Err(e) = send_backlog_reminders(now, deps).await {
        tracing::error!(error = %e, "Reminder tick failed");
    }
}

async fn run_periodic_scan(deps: &ServerDeps) {
    tracing::info!("Running periodic scan");
    match run_scan(&Actor::system(), None, deps).await {
        Ok(report) => tracing::info!(created = report.created, duplicates = report.duplicates, "Periodic scan complete"),
        Err(e) => tracing::error!(error = %e, "Periodic scan failed"),
    }
}
