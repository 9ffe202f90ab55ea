//! Events entered by approvers: partner invites, file imports, manual entry.

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use super::ingest::{ingest_event, IngestOutcome, IngestRequest};
use crate::common::{Actor, Capability, Result};
use crate::domains::classification::{EventAnalysis, Priority};
use crate::domains::events::models::{
    is_http_url, is_sentinel_url, Event, Origin, FILE_UPLOAD_URL, INVITE_URL, NO_URL,
};
use crate::kernel::ServerDeps;

/// Score given to manually entered events.
pub const MANUAL_EVENT_SCORE: u8 = 50;

/// Classify partner-supplied text and publish it straight away.
pub async fn add_partner_event(actor: &Actor, text: &str, deps: &ServerDeps) -> Result<IngestOutcome> {
    actor.can(Capability::ImportEvents).check()?;

    let classified = deps.classifier.classify(text, None).await;
    let request = IngestRequest {
        analysis: classified.analysis,
        source_text: text.to_string(),
        url: INVITE_URL.to_string(),
        origin: Origin::Partner,
    };

    ingest_event(request, Local::now().naive_local(), deps).await
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub drafts: usize,
    pub created: usize,
    pub classifier_fallbacks: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Imported(ImportReport),
    /// Only `.txt` files are accepted
    UnsupportedFile { filename: String },
}

/// Import events from an uploaded text file.
///
/// The whole file goes to the classifier in batch mode; each returned draft is
/// then classified on its own and queued for moderation.
pub async fn import_events_file(
    actor: &Actor,
    filename: &str,
    bytes: &[u8],
    deps: &ServerDeps,
) -> Result<ImportOutcome> {
    actor.can(Capability::ImportEvents).check()?;

    if !filename.to_lowercase().ends_with(".txt") {
        return Ok(ImportOutcome::UnsupportedFile {
            filename: filename.to_string(),
        });
    }

    let content = String::from_utf8_lossy(bytes);
    let drafts = deps.classifier.extract_drafts(&content).await;
    let mut report = ImportReport {
        drafts: drafts.len(),
        ..ImportReport::default()
    };

    let texts: Vec<String> = drafts.iter().map(|d| d.as_candidate_text()).collect();
    let classified = deps.classifier.classify_all(texts.clone(), None).await;

    for ((draft, text), result) in drafts.into_iter().zip(texts).zip(classified) {
        if result.is_fallback() {
            report.classifier_fallbacks += 1;
        }

        // The draft is the file's own wording; it wins over the classifier's.
        let mut analysis = result.analysis;
        prefer(&mut analysis.title, draft.title);
        prefer(&mut analysis.date_text, draft.date_text);
        prefer(&mut analysis.location, draft.location);
        prefer(&mut analysis.description, draft.description);

        let request = IngestRequest {
            analysis,
            source_text: text,
            url: FILE_UPLOAD_URL.to_string(),
            origin: Origin::File,
        };

        match ingest_event(request, Local::now().naive_local(), deps).await {
            Ok(IngestOutcome::Created(_)) => report.created += 1,
            Ok(IngestOutcome::Duplicate { .. }) => report.failed += 1,
            Err(e) => {
                warn!(error = %e, "Failed to store imported draft");
                report.failed += 1;
            }
        }
    }

    info!(
        filename,
        drafts = report.drafts,
        created = report.created,
        "File import finished"
    );
    Ok(ImportOutcome::Imported(report))
}

fn prefer(field: &mut String, value: String) {
    if !value.trim().is_empty() {
        *field = value.trim().to_string();
    }
}

/// Fields typed in by an approver.
#[derive(Debug, Clone, Default)]
pub struct ManualEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub date_text: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub enum ManualEventOutcome {
    Created(Event),
    Duplicate { url: String },
    InvalidUrl(String),
    MissingTitle,
}

/// Publish an approver-entered event without classification.
pub async fn create_manual_event(
    actor: &Actor,
    input: ManualEvent,
    deps: &ServerDeps,
) -> Result<ManualEventOutcome> {
    actor.can(Capability::ImportEvents).check()?;

    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Ok(ManualEventOutcome::MissingTitle);
    }

    let url = input.url.trim();
    let url = if url.is_empty() || url == "-" {
        NO_URL.to_string()
    } else if is_http_url(url) || is_sentinel_url(url) {
        url.to_string()
    } else {
        return Ok(ManualEventOutcome::InvalidUrl(url.to_string()));
    };

    let analysis = EventAnalysis {
        title,
        description: input.description.trim().to_string(),
        date_text: input.date_text.trim().to_string(),
        location: input.location.trim().to_string(),
        url: url.clone(),
        score: MANUAL_EVENT_SCORE,
        priority: Priority::from_score(MANUAL_EVENT_SCORE),
        ..EventAnalysis::fallback()
    };

    let request = IngestRequest {
        source_text: analysis.description.clone(),
        analysis,
        url,
        origin: Origin::Manual,
    };

    Ok(match ingest_event(request, Local::now().naive_local(), deps).await? {
        IngestOutcome::Created(event) => ManualEventOutcome::Created(event),
        IngestOutcome::Duplicate { url } => ManualEventOutcome::Duplicate { url },
    })
}
