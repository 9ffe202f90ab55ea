//! Read-only views over approved events.

use serde::Serialize;

use crate::common::{Actor, Capability, Result};
use crate::domains::events::models::{Event, EventStats, Origin};
use crate::domains::members::models::Registration;
use crate::kernel::ServerDeps;

pub const CATALOGUE_PAGE_SIZE: i64 = 5;
pub const HIGH_PRIORITY_LIMIT: i64 = 10;
pub const SEARCH_LIMIT: i64 = 20;

#[derive(Debug, Clone)]
pub struct CataloguePage {
    pub events: Vec<Event>,
    pub page: i64,
    pub total: i64,
}

impl CataloguePage {
    pub fn page_count(&self) -> i64 {
        (self.total + CATALOGUE_PAGE_SIZE - 1) / CATALOGUE_PAGE_SIZE
    }
}

/// Approved events, best first. Open to every user.
pub async fn list_approved(page: i64, deps: &ServerDeps) -> Result<CataloguePage> {
    let page = page.max(0);
    let events = Event::find_approved_paginated(page, CATALOGUE_PAGE_SIZE, &deps.db_pool).await?;
    let total = Event::count_approved(&deps.db_pool).await?;
    Ok(CataloguePage { events, page, total })
}

pub async fn high_priority_events(deps: &ServerDeps) -> Result<Vec<Event>> {
    Event::find_high_priority(HIGH_PRIORITY_LIMIT, &deps.db_pool).await
}

/// Whitespace-separated keywords, matched against any of them.
pub async fn search_events(query: &str, deps: &ServerDeps) -> Result<Vec<Event>> {
    let keywords: Vec<String> = query.split_whitespace().map(str::to_string).collect();
    Event::search(&keywords, SEARCH_LIMIT, &deps.db_pool).await
}

pub async fn partner_events(deps: &ServerDeps) -> Result<Vec<Event>> {
    Event::find_by_origin(Origin::Partner, &deps.db_pool).await
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentStats {
    pub events: EventStats,
    pub pending_registrations: i64,
}

pub async fn stats(actor: &Actor, deps: &ServerDeps) -> Result<AgentStats> {
    actor.can(Capability::ViewStats).check()?;

    Ok(AgentStats {
        events: Event::stats(&deps.db_pool).await?,
        pending_registrations: Registration::count_pending(&deps.db_pool).await?,
    })
}
