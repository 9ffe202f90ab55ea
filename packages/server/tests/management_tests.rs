//! Sources, approvers, accounts and calendar delivery.

mod common;

use agent_core::common::{Actor, AgentError, ApproverRole, AuthError};
use agent_core::domains::approvers::actions::{
    add_approver as add_approver_action, remove_approver, set_notify_schedule, RemoveApproverOutcome,
    ScheduleOutcome,
};
use agent_core::domains::calendar::{send_event_calendar, send_my_calendar, CalendarOutcome};
use agent_core::domains::members::actions::{
    approve_account, register_contact, request_registration, update_profile, ProfileUpdate,
    RegistrationOutcome,
};
use agent_core::domains::members::AccountStatus;
use agent_core::domains::source::actions::{add_source, list_sources, set_source_active, AddSourceOutcome};
use agent_core::domains::source::Source;
use common::*;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn migrations_seed_four_active_sources(ctx: &TestHarness) {
    let sources = Source::find_active(&ctx.db_pool).await.unwrap();
    assert_eq!(sources.len(), 4);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn sources_are_added_once_and_toggled(ctx: &TestHarness) {
    let outcome = add_source(&admin(), "", "https://meetups.example.ru/list?page=1", &ctx.deps).await.unwrap();
    let AddSourceOutcome::Added(source) = outcome else {
        panic!("expected a new source");
    };
    assert_eq!(source.name, "meetups.example.ru");
    assert_eq!(source.base_url, "https://meetups.example.ru/");

    let again = add_source(&admin(), "Meetups", "https://meetups.example.ru/list?page=1", &ctx.deps).await.unwrap();
    assert!(matches!(again, AddSourceOutcome::AlreadyExists(ref s) if s.id == source.id));

    let bad = add_source(&admin(), "Local", "ftp://files.example.ru", &ctx.deps).await.unwrap();
    assert!(matches!(bad, AddSourceOutcome::InvalidUrl(_)));

    let paused = set_source_active(&admin(), source.id, false, &ctx.deps).await.unwrap().unwrap();
    assert!(!paused.active);
    assert_eq!(list_sources(&admin(), &ctx.deps).await.unwrap().len(), 5);
    assert_eq!(Source::find_active(&ctx.db_pool).await.unwrap().len(), 4);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn managers_cannot_touch_sources(ctx: &TestHarness) {
    let err = list_sources(&manager(), &ctx.deps).await.unwrap_err();
    assert!(matches!(err, AgentError::Auth(AuthError::PermissionDenied(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn approvers_cannot_remove_themselves(ctx: &TestHarness) {
    let owner = Actor::new(1, Some(ApproverRole::GreatAdmin));
    add_approver_action(&owner, 1, "owner", ApproverRole::GreatAdmin, &ctx.deps).await.unwrap();
    let added = add_approver_action(&owner, 2, "@helper", ApproverRole::Manager, &ctx.deps).await.unwrap();
    assert_eq!(added.username, "helper");

    assert_eq!(
        remove_approver(&owner, 1, &ctx.deps).await.unwrap(),
        RemoveApproverOutcome::CannotRemoveSelf
    );
    assert_eq!(remove_approver(&owner, 2, &ctx.deps).await.unwrap(), RemoveApproverOutcome::Removed);
    assert_eq!(remove_approver(&owner, 2, &ctx.deps).await.unwrap(), RemoveApproverOutcome::NotFound);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn managers_set_their_own_schedule_only(ctx: &TestHarness) {
    add_approver(&ctx.db_pool, 2000, ApproverRole::Manager).await.unwrap();
    add_approver(&ctx.db_pool, 2001, ApproverRole::Manager).await.unwrap();

    let outcome = set_notify_schedule(&manager(), 2000, "friday", "9:05", &ctx.deps).await.unwrap();
    let ScheduleOutcome::Updated(approver) = outcome else {
        panic!("expected update");
    };
    assert_eq!(approver.notify_day.as_deref(), Some("4"));
    assert_eq!(approver.notify_time.as_deref(), Some("09:05"));

    let outcome = set_notify_schedule(&manager(), 2000, "someday", "09:00", &ctx.deps).await.unwrap();
    assert!(matches!(outcome, ScheduleOutcome::InvalidDay(_)));
    let outcome = set_notify_schedule(&manager(), 2000, "every_day", "25:00", &ctx.deps).await.unwrap();
    assert!(matches!(outcome, ScheduleOutcome::InvalidTime(_)));

    let err = set_notify_schedule(&manager(), 2001, "every_day", "09:00", &ctx.deps).await.unwrap_err();
    assert!(matches!(err, AgentError::Auth(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn new_contact_waits_for_account_approval(ctx: &TestHarness) {
    let event = approved_event(&ctx.db_pool, "Open meetup", 1).await.unwrap();
    let user = register_contact(77, "Анна Смирнова", &ctx.deps).await.unwrap();
    assert_eq!(user.account_status, AccountStatus::Pending);

    let outcome = request_registration(&Actor::user(77), event.id, &ctx.deps).await.unwrap();
    assert_eq!(outcome, RegistrationOutcome::AccountNotApproved);

    let approved = approve_account(&admin(), user.id, &ctx.deps).await.unwrap().unwrap();
    assert_eq!(approved.account_status, AccountStatus::Approved);
    assert_eq!(ctx.mocks.messenger.texts_to(77).len(), 1);
    assert!(approve_account(&admin(), user.id, &ctx.deps).await.unwrap().is_none());

    let update = ProfileUpdate {
        full_name: None,
        position: Some("  Junior аналитик ".to_string()),
    };
    let updated = update_profile(&Actor::user(77), update, &ctx.deps).await.unwrap().unwrap();
    assert_eq!(updated.position, "Junior аналитик");
    assert_eq!(updated.full_name, "Анна Смирнова");

    let outcome = request_registration(&Actor::user(77), event.id, &ctx.deps).await.unwrap();
    assert!(matches!(outcome, RegistrationOutcome::Approved { .. }));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn calendars_cover_approved_events_only(ctx: &TestHarness) {
    let published = approved_event(&ctx.db_pool, "Published", 1).await.unwrap();
    let queued = create_event(&ctx.db_pool, "Queued", "https://e.ru/q", agent_core::domains::events::Origin::Scan)
        .await
        .unwrap();
    let reader = Actor::user(88);

    let outcome = send_event_calendar(&reader, queued.id, &ctx.deps).await.unwrap();
    assert_eq!(outcome, CalendarOutcome::EventNotFound);

    let outcome = send_event_calendar(&reader, published.id, &ctx.deps).await.unwrap();
    assert_eq!(outcome, CalendarOutcome::Sent { events: 1 });

    let outcome = send_my_calendar(&reader, &ctx.deps).await.unwrap();
    assert_eq!(outcome, CalendarOutcome::NoEvents);

    approved_user(&ctx.db_pool, 88, "Developer").await.unwrap();
    request_registration(&reader, published.id, &ctx.deps).await.unwrap();
    let outcome = send_my_calendar(&reader, &ctx.deps).await.unwrap();
    assert_eq!(outcome, CalendarOutcome::Sent { events: 1 });

    let docs = ctx.mocks.messenger.documents_to(88);
    let bundle = docs.last().unwrap().body();
    assert_eq!(bundle.matches("BEGIN:VEVENT").count(), 1);
}
