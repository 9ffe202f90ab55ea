//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use agent_core::common::{Actor, ApproverRole};
use agent_core::domains::approvers::Approver;
use agent_core::domains::classification::{EventAnalysis, Priority};
use agent_core::domains::events::models::{InsertOutcome, NewEvent};
use agent_core::domains::events::{Event, Origin};
use agent_core::domains::members::User;
use agent_core::domains::source::Source;
use anyhow::{bail, Result};
use chrono::{Duration, Local};
use sqlx::SqlitePool;

/// Listing page with two event cards and a third one inside the footer.
pub const LISTING_WITH_FOOTER: &str = r#"<html>
<body>
  <nav class="menu">
    <a class="nav-item" href="/about">О нас: регистрация на все события 2026</a>
  </nav>
  <main>
    <div class="event-card">
      <h3>AI Meetup</h3>
      <p>15 апреля 2026, Санкт-Петербург, регистрация открыта</p>
      <a href="/events/ai-meetup">Подробнее</a>
    </div>
    <div class="event-card">
      <h3>Data Conf</h3>
      <p>20 мая 2026, онлайн, бесплатно</p>
      <a href="https://other.example.ru/data-conf">Подробнее</a>
    </div>
  </main>
  <footer>
    <div class="event-card">
      <h3>Партнёрский вечер</h3>
      <p>1 июня 2026, Москва, регистрация</p>
      <a href="/partner-evening">Подробнее</a>
    </div>
  </footer>
</body>
</html>"#;

pub const LISTING_URL: &str = "https://events.example.ru/calendar";

/// Replace the seeded sources with a single active one.
pub async fn only_source(pool: &SqlitePool, name: &str, url: &str) -> Result<Source> {
    sqlx::query("DELETE FROM sources").execute(pool).await?;
    Ok(Source::create(name, url, "https://events.example.ru/", pool).await?)
}

pub fn admin() -> Actor {
    Actor::new(1000, Some(ApproverRole::Admin))
}

pub fn manager() -> Actor {
    Actor::new(2000, Some(ApproverRole::Manager))
}

/// Insert an event directly. Scan/file origins land in the queue as `new`.
pub async fn create_event(pool: &SqlitePool, title: &str, url: &str, origin: Origin) -> Result<Event> {
    let analysis = EventAnalysis {
        title: title.to_string(),
        score: 60,
        priority: Priority::Medium,
        ..EventAnalysis::fallback()
    };
    let new = NewEvent {
        title: title.to_string(),
        description: format!("{} description", title),
        location: "Санкт-Петербург".to_string(),
        date_text: "in two weeks".to_string(),
        event_datetime: Local::now().naive_local() + Duration::days(14),
        url: url.to_string(),
        analysis,
        score: 60,
        priority: Priority::Medium,
        required_rank: 1,
        origin,
    };

    match Event::insert(&new, pool).await? {
        InsertOutcome::Inserted(event) => Ok(event),
        InsertOutcome::DuplicateUrl => bail!("fixture url already used: {}", url),
    }
}

/// Published event with the given required rank.
pub async fn approved_event(pool: &SqlitePool, title: &str, required_rank: u8) -> Result<Event> {
    let event = create_event(pool, title, "no_url", Origin::Manual).await?;
    match Event::set_required_rank(event.id, required_rank, pool).await? {
        Some(event) => Ok(event),
        None => bail!("event vanished"),
    }
}

/// User with an approved account and the given job title.
pub async fn approved_user(pool: &SqlitePool, chat_id: i64, position: &str) -> Result<User> {
    User::upsert_approved(chat_id, &format!("User {}", chat_id), pool).await?;
    match User::update_profile(chat_id, None, Some(position), pool).await? {
        Some(user) => Ok(user),
        None => bail!("user vanished"),
    }
}

pub async fn add_approver(pool: &SqlitePool, chat_id: i64, role: ApproverRole) -> Result<Approver> {
    Ok(Approver::upsert(chat_id, "", role, pool).await?)
}

/// Classifier answer with the given title and score.
pub fn classifier_answer(title: &str, score: u8) -> String {
    serde_json::json!({
        "title": title,
        "description": format!("{} description", title),
        "date": "12.06.2026 18:00",
        "location": "Санкт-Петербург",
        "score": score,
        "priority": "low",
        "key_themes": ["ai"],
        "summary": "short summary"
    })
    .to_string()
}
