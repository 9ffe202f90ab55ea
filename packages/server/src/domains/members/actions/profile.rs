use tracing::{info, warn};

use crate::common::{Actor, Capability, Result, UserId};
use crate::domains::events::Event;
use crate::domains::members::models::{Registration, User};
use crate::kernel::ServerDeps;

/// Called on every inbound contact; creates a pending account the first time.
pub async fn register_contact(chat_id: i64, full_name: &str, deps: &ServerDeps) -> Result<User> {
    let (user, created) = User::find_or_create(chat_id, full_name.trim(), &deps.db_pool).await?;
    if created {
        info!(user_id = %user.id, chat_id, "New user registered");
    }
    Ok(user)
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub position: Option<String>,
}

/// Update the caller's own profile. None if the caller never made contact.
pub async fn update_profile(actor: &Actor, update: ProfileUpdate, deps: &ServerDeps) -> Result<Option<User>> {
    let clean = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let full_name = clean(&update.full_name);
    let position = clean(&update.position);

    User::update_profile(actor.chat_id, full_name.as_deref(), position.as_deref(), &deps.db_pool).await
}

pub async fn list_pending_accounts(actor: &Actor, deps: &ServerDeps) -> Result<Vec<User>> {
    actor.can(Capability::ManageUsers).check()?;
    User::find_pending_accounts(&deps.db_pool).await
}

/// Approve a pending account and tell the user. None if nothing was pending.
pub async fn approve_account(actor: &Actor, user_id: UserId, deps: &ServerDeps) -> Result<Option<User>> {
    actor.can(Capability::ManageUsers).check()?;

    let Some(user) = User::approve_account(user_id, &deps.db_pool).await? else {
        return Ok(None);
    };
    info!(user_id = %user.id, approver = actor.chat_id, "Account approved");

    if let Err(e) = deps
        .messenger
        .send_text(user.chat_id, "✅ Your account has been approved. You can now register for events.", &[])
        .await
    {
        warn!(chat_id = user.chat_id, error = %e, "Account approval notice not delivered");
    }
    Ok(Some(user))
}

/// Every event the caller registered for, pending or approved.
pub async fn my_events(actor: &Actor, deps: &ServerDeps) -> Result<Vec<Event>> {
    match User::find_by_chat_id(actor.chat_id, &deps.db_pool).await? {
        Some(user) => Registration::find_events_for_user(user.id, false, &deps.db_pool).await,
        None => Ok(Vec::new()),
    }
}
