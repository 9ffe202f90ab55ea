//! Moderation queue: ordering, transitions, edits and permissions.

mod common;

use agent_core::common::{AgentError, AuthError};
use agent_core::domains::events::actions::{
    approve_event, edit_event, next_for_review, reject_event, set_required_rank, EditOutcome,
    ModerationOutcome, RankOutcome,
};
use agent_core::domains::events::models::EventField;
use agent_core::domains::events::{Event, EventStatus, Origin};
use common::*;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn queue_is_served_oldest_first_and_marks_presented(ctx: &TestHarness) {
    let first = create_event(&ctx.db_pool, "First", "https://e.ru/1", Origin::Scan).await.unwrap();
    let second = create_event(&ctx.db_pool, "Second", "https://e.ru/2", Origin::File).await.unwrap();
    assert_eq!(first.status, EventStatus::New);

    let item = next_for_review(&admin(), 0, &ctx.deps).await.unwrap().unwrap();
    assert_eq!(item.event.id, first.id);
    assert_eq!(item.event.status, EventStatus::Pending);
    assert_eq!(item.total, 2);

    let item = next_for_review(&admin(), 1, &ctx.deps).await.unwrap().unwrap();
    assert_eq!(item.event.id, second.id);

    // Paging past the end wraps around
    let item = next_for_review(&admin(), 2, &ctx.deps).await.unwrap().unwrap();
    assert_eq!(item.event.id, first.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn empty_queue_has_nothing_to_review(ctx: &TestHarness) {
    create_event(&ctx.db_pool, "Published", "no_url", Origin::Manual).await.unwrap();
    assert!(next_for_review(&admin(), 0, &ctx.deps).await.unwrap().is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn approve_is_terminal(ctx: &TestHarness) {
    let event = create_event(&ctx.db_pool, "Meetup", "https://e.ru/m", Origin::Scan).await.unwrap();

    let outcome = approve_event(&admin(), event.id, &ctx.deps).await.unwrap();
    let ModerationOutcome::Approved(approved) = outcome else {
        panic!("expected approval");
    };
    assert_eq!(approved.status, EventStatus::Approved);

    // A second approver acting late gets a harmless not-found
    let again = approve_event(&admin(), event.id, &ctx.deps).await.unwrap();
    assert!(matches!(again, ModerationOutcome::NotFound(_)));
    let reject = reject_event(&admin(), event.id, &ctx.deps).await.unwrap();
    assert!(matches!(reject, ModerationOutcome::NotFound(_)));

    let stored = Event::find_by_id(event.id, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::Approved);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reject_deletes_the_event(ctx: &TestHarness) {
    let event = create_event(&ctx.db_pool, "Spam", "https://e.ru/spam", Origin::Scan).await.unwrap();

    let outcome = reject_event(&admin(), event.id, &ctx.deps).await.unwrap();
    assert!(matches!(outcome, ModerationOutcome::Rejected(_)));
    assert!(Event::find_by_id(event.id, &ctx.db_pool).await.unwrap().is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn edits_keep_status_and_check_urls(ctx: &TestHarness) {
    let event = create_event(&ctx.db_pool, "Draft", "https://e.ru/a", Origin::Scan).await.unwrap();
    create_event(&ctx.db_pool, "Other", "https://e.ru/b", Origin::Scan).await.unwrap();

    let outcome = edit_event(&admin(), event.id, EventField::Title, "Final title", &ctx.deps).await.unwrap();
    let EditOutcome::Updated(updated) = outcome else {
        panic!("expected update");
    };
    assert_eq!(updated.title, "Final title");
    assert_eq!(updated.status, EventStatus::New);

    let outcome = edit_event(&admin(), event.id, EventField::Url, "not a url", &ctx.deps).await.unwrap();
    assert!(matches!(outcome, EditOutcome::InvalidUrl(_)));

    let outcome = edit_event(&admin(), event.id, EventField::Url, "https://e.ru/b", &ctx.deps).await.unwrap();
    assert!(matches!(outcome, EditOutcome::DuplicateUrl(_)));

    let outcome = edit_event(&admin(), event.id, EventField::Url, "no_url", &ctx.deps).await.unwrap();
    assert!(matches!(outcome, EditOutcome::Updated(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn date_edit_reparses_the_datetime(ctx: &TestHarness) {
    let event = create_event(&ctx.db_pool, "Dated", "https://e.ru/d", Origin::Scan).await.unwrap();

    let outcome = edit_event(&admin(), event.id, EventField::Date, "15.09.2099 18:30", &ctx.deps).await.unwrap();
    let EditOutcome::Updated(updated) = outcome else {
        panic!("expected update");
    };
    assert_eq!(updated.date_text, "15.09.2099 18:30");
    assert_eq!(
        updated.event_datetime.unwrap().format("%Y-%m-%d %H:%M").to_string(),
        "2099-09-15 18:30"
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn required_rank_is_bounded(ctx: &TestHarness) {
    let event = create_event(&ctx.db_pool, "Exec forum", "https://e.ru/x", Origin::Scan).await.unwrap();

    let outcome = set_required_rank(&admin(), event.id, 4, &ctx.deps).await.unwrap();
    let RankOutcome::Updated(updated) = outcome else {
        panic!("expected update");
    };
    assert_eq!(updated.required_rank, 4);

    for bad in [0, 6, -1] {
        let outcome = set_required_rank(&admin(), event.id, bad, &ctx.deps).await.unwrap();
        assert!(matches!(outcome, RankOutcome::InvalidRank(r) if r == bad));
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn managers_cannot_moderate(ctx: &TestHarness) {
    let event = create_event(&ctx.db_pool, "Meetup", "https://e.ru/m", Origin::Scan).await.unwrap();

    let err = approve_event(&manager(), event.id, &ctx.deps).await.unwrap_err();
    assert!(matches!(err, AgentError::Auth(AuthError::PermissionDenied(_))));
}
