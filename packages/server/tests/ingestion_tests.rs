//! Ingestion gate and approver-entered events.

mod common;

use agent_core::common::Actor;
use agent_core::domains::classification::{EventAnalysis, Priority};
use agent_core::domains::events::actions::{
    add_partner_event, create_manual_event, import_events_file, ingest_event, ImportOutcome,
    IngestOutcome, IngestRequest, ManualEvent, ManualEventOutcome,
};
use agent_core::domains::events::models::{FILE_UPLOAD_URL, INVITE_URL, NO_URL};
use agent_core::domains::events::{Event, EventStatus, Origin};
use agent_core::kernel::test_dependencies::MockAI;
use agent_core::kernel::TestDependencies;
use chrono::Local;
use common::*;
use test_context::test_context;

fn request(title: &str, url: &str, origin: Origin) -> IngestRequest {
    IngestRequest {
        analysis: EventAnalysis {
            title: title.to_string(),
            date_text: "20.05.2026".to_string(),
            score: 40,
            priority: Priority::Low,
            ..EventAnalysis::fallback()
        },
        source_text: format!("{} source text", title),
        url: url.to_string(),
        origin,
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn known_http_url_is_rejected(ctx: &TestHarness) {
    let now = Local::now().naive_local();
    let url = "https://events.example.ru/e/1";

    let first = ingest_event(request("First", url, Origin::Scan), now, &ctx.deps).await.unwrap();
    assert!(matches!(first, IngestOutcome::Created(_)));

    let second = ingest_event(request("Second", url, Origin::Scan), now, &ctx.deps).await.unwrap();
    assert!(second.is_duplicate());

    let stats = Event::stats(&ctx.db_pool).await.unwrap();
    assert_eq!(stats.total, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn sentinel_urls_never_collide(ctx: &TestHarness) {
    let now = Local::now().naive_local();

    for sentinel in [NO_URL, NO_URL, FILE_UPLOAD_URL, FILE_UPLOAD_URL, INVITE_URL] {
        let outcome = ingest_event(request("Offline event", sentinel, Origin::File), now, &ctx.deps)
            .await
            .unwrap();
        assert!(matches!(outcome, IngestOutcome::Created(_)), "{}", sentinel);
    }

    assert_eq!(Event::stats(&ctx.db_pool).await.unwrap().total, 5);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn past_dates_are_rolled_forward(ctx: &TestHarness) {
    let now = Local::now().naive_local();
    let mut req = request("Old news", "https://events.example.ru/old", Origin::Scan);
    req.analysis.date_text = "01.01.2020".to_string();

    let IngestOutcome::Created(event) = ingest_event(req, now, &ctx.deps).await.unwrap() else {
        panic!("expected a new event");
    };
    assert!(event.event_datetime.unwrap() >= now);
    assert_eq!(event.date_text, "01.01.2020");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn partner_invite_is_published_with_high_priority(ctx: &TestHarness) {
    let outcome = add_partner_event(&admin(), "Партнёрская конференция, 12 июня", &ctx.deps)
        .await
        .unwrap();

    let IngestOutcome::Created(event) = outcome else {
        panic!("expected a new event");
    };
    assert_eq!(event.url, INVITE_URL);
    assert_eq!(event.origin, Origin::Partner);
    assert_eq!(event.status, EventStatus::Approved);
    assert_eq!(event.priority, Priority::High);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn manual_event_is_published_without_classifier(ctx: &TestHarness) {
    let input = ManualEvent {
        title: "Внутренний митап".to_string(),
        description: "Доклады команды".to_string(),
        location: "Офис".to_string(),
        date_text: "20.05.2027 19:00".to_string(),
        url: String::new(),
    };

    let ManualEventOutcome::Created(event) = create_manual_event(&admin(), input, &ctx.deps).await.unwrap() else {
        panic!("expected a new event");
    };
    assert_eq!(event.url, NO_URL);
    assert_eq!(event.score, 50);
    assert_eq!(event.priority, Priority::Medium);
    assert_eq!(event.status, EventStatus::Approved);
    assert!(ctx.mocks.ai.calls().is_empty());

    let missing = create_manual_event(&admin(), ManualEvent::default(), &ctx.deps).await.unwrap();
    assert!(matches!(missing, ManualEventOutcome::MissingTitle));

    let bad_url = ManualEvent {
        title: "X".to_string(),
        url: "ftp://files".to_string(),
        ..ManualEvent::default()
    };
    let outcome = create_manual_event(&admin(), bad_url, &ctx.deps).await.unwrap();
    assert!(matches!(outcome, ManualEventOutcome::InvalidUrl(_)));
}

#[tokio::test]
async fn file_import_queues_each_draft() {
    let drafts = r#"```json
[
  {"title": "Rust Meetup", "date": "12.06.2026", "location": "СПб", "description": "Доклады про async"},
  {"title": "Go Day", "date": "завтра 18:00"}
]
```"#;
    let ctx = TestHarness::with_mocks(TestDependencies::new().mock_ai(MockAI::new().with_response(drafts)))
        .await
        .unwrap();

    let outcome = import_events_file(&admin(), "events.txt", "Rust Meetup ...\nGo Day ...".as_bytes(), &ctx.deps)
        .await
        .unwrap();

    let ImportOutcome::Imported(report) = outcome else {
        panic!("expected an import");
    };
    assert_eq!(report.drafts, 2);
    assert_eq!(report.created, 2);

    let first = Event::find_queued_at(0, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(first.title, "Rust Meetup");
    assert_eq!(first.url, FILE_UPLOAD_URL);
    assert_eq!(first.origin, Origin::File);
    assert_eq!(first.status, EventStatus::New);
    // one batch call plus one call per draft
    assert_eq!(ctx.mocks.ai.calls().len(), 3);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn only_text_files_are_imported(ctx: &TestHarness) {
    let outcome = import_events_file(&admin(), "events.pdf", b"%PDF", &ctx.deps).await.unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::UnsupportedFile {
            filename: "events.pdf".to_string()
        }
    );
    assert!(ctx.mocks.ai.calls().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn imports_need_an_approver(ctx: &TestHarness) {
    assert!(add_partner_event(&Actor::user(5), "text", &ctx.deps).await.is_err());
}
