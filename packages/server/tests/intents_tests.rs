//! Inbound callback data resolved to actors and dispatched.

mod common;

use agent_core::common::{Actor, ApproverRole};
use agent_core::domains::approvers::Approver;
use agent_core::domains::events::{Event, EventStatus, Origin};
use agent_core::kernel::{dispatch, resolve_actor, Intent};
use common::*;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn active_approvers_resolve_with_their_role(ctx: &TestHarness) {
    add_approver(&ctx.db_pool, 1000, ApproverRole::Admin).await.unwrap();
    add_approver(&ctx.db_pool, 2000, ApproverRole::Manager).await.unwrap();
    Approver::set_active(2000, false, &ctx.db_pool).await.unwrap();

    let admin = resolve_actor(1000, &ctx.deps).await.unwrap();
    assert_eq!(admin, Actor::new(1000, Some(ApproverRole::Admin)));

    let inactive = resolve_actor(2000, &ctx.deps).await.unwrap();
    assert_eq!(inactive, Actor::user(2000));

    let stranger = resolve_actor(77, &ctx.deps).await.unwrap();
    assert!(!stranger.is_approver());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn approve_button_publishes_the_event(ctx: &TestHarness) {
    let event = create_event(&ctx.db_pool, "Night of AI", "https://e.ru/night", Origin::Scan).await.unwrap();
    let intent: Intent = format!("ev_ok:{}", event.id).parse().unwrap();

    let reply = dispatch(&admin(), intent, &ctx.deps).await;
    assert_eq!(reply.chat_id, 1000);
    assert!(reply.text.contains("Night of AI"));

    let stored = Event::find_by_id(event.id, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::Approved);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn plain_users_get_a_short_refusal(ctx: &TestHarness) {
    let event = create_event(&ctx.db_pool, "Night of AI", "https://e.ru/night", Origin::Scan).await.unwrap();

    let reply = dispatch(&Actor::user(55), Intent::ApproveEvent(event.id), &ctx.deps).await;
    assert_eq!(reply.text, "This action is available to approvers only.");
    assert!(reply.actions.is_empty());

    let stored = Event::find_by_id(event.id, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::New);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn review_queue_reply_carries_buttons(ctx: &TestHarness) {
    let event = create_event(&ctx.db_pool, "Queued", "https://e.ru/q", Origin::Scan).await.unwrap();

    let reply = dispatch(&admin(), Intent::ReviewQueue { page: 0 }, &ctx.deps).await;
    // Replies go out as plain text
    assert!(reply.text.contains("\n\nQueued\n"));
    assert!(!reply.text.contains('<'));
    let data: Vec<String> = reply.actions.iter().map(|a| a.callback_data.clone()).collect();
    assert_eq!(
        data,
        vec![
            format!("ev_ok:{}", event.id),
            format!("ev_no:{}", event.id),
            "queue:1".to_string(),
        ]
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn catalogue_offers_register_buttons(ctx: &TestHarness) {
    let event = approved_event(&ctx.db_pool, "Published talk", 1).await.unwrap();

    let reply = dispatch(&Actor::user(55), Intent::Catalogue { page: 0 }, &ctx.deps).await;
    assert!(reply.text.contains("• Published talk\n"));
    assert_eq!(reply.actions[0].callback_data, format!("reg:{}", event.id));
}
