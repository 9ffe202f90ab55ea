//! Catalogue queries over approved events.

mod common;

use agent_core::domains::events::actions::{list_approved, search_events};
use agent_core::domains::events::Origin;
use common::*;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn search_folds_cyrillic_case(ctx: &TestHarness) {
    approved_event(&ctx.db_pool, "Конференция по данным", 1).await.unwrap();
    approved_event(&ctx.db_pool, "Python Day", 1).await.unwrap();

    let hits = search_events("конференция", &ctx.deps).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Конференция по данным");

    let hits = search_events("PYTHON", &ctx.deps).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Python Day");

    // Any keyword is enough
    let hits = search_events("ДАННЫМ python", &ctx.deps).await.unwrap();
    assert_eq!(hits.len(), 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn search_treats_wildcards_literally(ctx: &TestHarness) {
    approved_event(&ctx.db_pool, "Python Day", 1).await.unwrap();

    assert!(search_events("%", &ctx.deps).await.unwrap().is_empty());
    assert!(search_events("_", &ctx.deps).await.unwrap().is_empty());
    assert!(search_events("   ", &ctx.deps).await.unwrap().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn search_skips_queued_events(ctx: &TestHarness) {
    create_event(&ctx.db_pool, "Конференция в очереди", "https://e.ru/queued", Origin::Scan)
        .await
        .unwrap();

    assert!(search_events("конференция", &ctx.deps).await.unwrap().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn catalogue_pages_hold_five_events(ctx: &TestHarness) {
    for i in 0..7 {
        approved_event(&ctx.db_pool, &format!("Talk {}", i), 1).await.unwrap();
    }

    let first = list_approved(0, &ctx.deps).await.unwrap();
    assert_eq!(first.events.len(), 5);
    assert_eq!(first.total, 7);
    assert_eq!(first.page_count(), 2);

    let second = list_approved(1, &ctx.deps).await.unwrap();
    assert_eq!(second.events.len(), 2);
}
