use std::collections::HashSet;
use tracing::{info, warn};
use url::Url;

use super::heuristics::{extract_candidates, CandidateEvent};
use crate::domains::source::Source;
use crate::kernel::ServerDeps;

#[derive(Debug, Default, Clone)]
pub struct ExtractionReport {
    pub candidates: Vec<CandidateEvent>,
    pub sources_scanned: usize,
    /// Names of sources whose fetch or parse failed
    pub sources_failed: Vec<String>,
}

/// Fetch and parse every source in order, pausing between sources.
///
/// A failing source is logged and skipped; it never aborts the run.
pub async fn extract_from_sources(
    sources: &[Source],
    keywords: Option<&[String]>,
    deps: &ServerDeps,
) -> ExtractionReport {
    let mut report = ExtractionReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    let keywords: Option<Vec<String>> = keywords.map(|k| k.to_vec());

    for (index, source) in sources.iter().enumerate() {
        if index > 0 && !deps.settings.source_cooldown.is_zero() {
            tokio::time::sleep(deps.settings.source_cooldown).await;
        }
        report.sources_scanned += 1;

        let Some(base_url) = Url::parse(&source.base_url)
            .or_else(|_| Url::parse(&source.url))
            .ok()
        else {
            warn!(source = %source.name, url = %source.url, "Source has no usable base URL, skipping");
            report.sources_failed.push(source.name.clone());
            continue;
        };

        let html = match deps.fetcher.fetch_html(&source.url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(source = %source.name, error = %e, "Fetch failed, skipping source");
                report.sources_failed.push(source.name.clone());
                continue;
            }
        };

        let name = source.name.clone();
        let kw = keywords.clone();
        let seen_before = std::mem::take(&mut seen);
        let parsed = tokio::task::spawn_blocking(move || {
            let mut seen = seen_before;
            let found = extract_candidates(&html, &name, &base_url, kw.as_deref(), &mut seen);
            (found, seen)
        })
        .await;

        match parsed {
            Ok((found, seen_after)) => {
                seen = seen_after;
                info!(source = %source.name, found = found.len(), "Source parsed");
                report.candidates.extend(found);
            }
            Err(e) => {
                // The seen set moved into the panicked task; rebuild it.
                seen = report.candidates.iter().map(|c| c.url.clone()).collect();
                warn!(source = %source.name, error = %e, "Parse task failed, skipping source");
                report.sources_failed.push(source.name.clone());
            }
        }
    }

    info!(
        sources = report.sources_scanned,
        failed = report.sources_failed.len(),
        candidates = report.candidates.len(),
        "Extraction finished"
    );
    report
}
