//! Full scan: sources -> extractor -> classifier -> ingestion gate

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use super::ingest::{ingest_event, IngestOutcome, IngestRequest};
use crate::common::{Actor, Capability, Result};
use crate::domains::events::models::Origin;
use crate::domains::scraping::extract_from_sources;
use crate::domains::source::Source;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub sources_scanned: usize,
    pub sources_failed: Vec<String>,
    pub candidates: usize,
    pub created: usize,
    pub duplicates: usize,
    /// Candidates stored with the default analysis
    pub classifier_fallbacks: usize,
    /// Candidates lost to store errors
    pub failed: usize,
}

/// Scan every active source and ingest what looks like an event.
///
/// Each candidate is classified once, with bounded concurrency. A failure on
/// one candidate is logged and counted; the scan carries on.
pub async fn run_scan(
    actor: &Actor,
    keywords: Option<&[String]>,
    deps: &ServerDeps,
) -> Result<ScanReport> {
    actor.can(Capability::TriggerScan).check()?;

    let sources = Source::find_active(&deps.db_pool).await?;
    info!(sources = sources.len(), keywords = ?keywords, "Scan started");

    let extraction = extract_from_sources(&sources, keywords, deps).await;
    let mut report = ScanReport {
        sources_scanned: extraction.sources_scanned,
        sources_failed: extraction.sources_failed,
        candidates: extraction.candidates.len(),
        ..ScanReport::default()
    };

    let texts = extraction
        .candidates
        .iter()
        .map(|c| c.raw_text.clone())
        .collect();
    let classified = deps.classifier.classify_all(texts, keywords).await;

    for (candidate, result) in extraction.candidates.into_iter().zip(classified) {
        if result.is_fallback() {
            report.classifier_fallbacks += 1;
        }

        let request = IngestRequest {
            analysis: result.analysis,
            source_text: candidate.raw_text,
            url: candidate.url,
            origin: Origin::Scan,
        };

        match ingest_event(request, Local::now().naive_local(), deps).await {
            Ok(IngestOutcome::Created(_)) => report.created += 1,
            Ok(IngestOutcome::Duplicate { .. }) => report.duplicates += 1,
            Err(e) => {
                warn!(source = %candidate.source_name, error = %e, "Failed to store candidate");
                report.failed += 1;
            }
        }
    }

    info!(
        candidates = report.candidates,
        created = report.created,
        duplicates = report.duplicates,
        fallbacks = report.classifier_fallbacks,
        failed = report.failed,
        "Scan finished"
    );
    Ok(report)
}
