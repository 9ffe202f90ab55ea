//! Source management actions (admin only)

use tracing::info;
use url::Url;

use super::models::Source;
use crate::common::{Actor, Capability, Result, SourceId};
use crate::kernel::database::is_unique_violation;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, PartialEq)]
pub enum AddSourceOutcome {
    Added(Source),
    AlreadyExists(Source),
    InvalidUrl(String),
}

/// Register a new source page. The base URL is the page's origin.
pub async fn add_source(
    actor: &Actor,
    name: &str,
    url: &str,
    deps: &ServerDeps,
) -> Result<AddSourceOutcome> {
    actor.can(Capability::ManageSources).check()?;

    let parsed = match Url::parse(url.trim()) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => u,
        _ => return Ok(AddSourceOutcome::InvalidUrl(url.to_string())),
    };
    let base_url = format!("{}/", parsed.origin().ascii_serialization());
    let name = if name.trim().is_empty() {
        parsed.host_str().unwrap_or("source").to_string()
    } else {
        name.trim().to_string()
    };

    match Source::create(&name, parsed.as_str(), &base_url, &deps.db_pool).await {
        Ok(source) => {
            info!(source = %source.name, url = %source.url, "Source added");
            Ok(AddSourceOutcome::Added(source))
        }
        Err(crate::common::AgentError::Store(e)) if is_unique_violation(&e) => {
            match Source::find_by_url(parsed.as_str(), &deps.db_pool).await? {
                Some(existing) => Ok(AddSourceOutcome::AlreadyExists(existing)),
                None => Err(e.into()),
            }
        }
        Err(e) => Err(e),
    }
}

pub async fn list_sources(actor: &Actor, deps: &ServerDeps) -> Result<Vec<Source>> {
    actor.can(Capability::ManageSources).check()?;
    Source::find_all(&deps.db_pool).await
}

/// Returns the updated source, or None for an unknown id.
pub async fn set_source_active(
    actor: &Actor,
    id: SourceId,
    active: bool,
    deps: &ServerDeps,
) -> Result<Option<Source>> {
    actor.can(Capability::ManageSources).check()?;
    let source = Source::set_active(id, active, &deps.db_pool).await?;
    if let Some(s) = &source {
        info!(source = %s.name, active, "Source toggled");
    }
    Ok(source)
}

/// Returns false for an unknown id.
pub async fn remove_source(actor: &Actor, id: SourceId, deps: &ServerDeps) -> Result<bool> {
    actor.can(Capability::ManageSources).check()?;
    let removed = Source::delete(id, &deps.db_pool).await?;
    if removed {
        info!(source_id = %id, "Source removed");
    }
    Ok(removed)
}
