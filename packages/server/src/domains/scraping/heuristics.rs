use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

use crate::common::utils::{collapse_whitespace, truncate_chars};

pub const MAX_CANDIDATES_PER_SOURCE: usize = 10;
pub const MIN_TEXT_CHARS: usize = 15;
pub const MAX_TEXT_CHARS: usize = 1000;

lazy_static! {
    static ref BLOCK_SELECTOR: Selector = Selector::parse("[class]").expect("valid selector");
    static ref LINK_SELECTOR: Selector = Selector::parse("a[href]").expect("valid selector");
    static ref HEADING_SELECTOR: Selector =
        Selector::parse("h1, h2, h3, h4, h5, h6, [class]").expect("valid selector");

    static ref BLOCK_CLASS: Regex = Regex::new(r"(?i)event|card|item|post").expect("valid regex");
    static ref TITLE_CLASS: Regex = Regex::new(r"(?i)title|name|header").expect("valid regex");

    static ref REGISTRATION_WORDING: Regex = Regex::new(
        r"(?i)регистрац|участи|участвова|спикер|бесплатно|билет|\bруб|₽|register|registration|sign up|speaker|tickets?\b|free entry"
    )
    .expect("valid regex");
    static ref DATE_TOKEN: Regex = Regex::new(
        r"(?i)\b\d{1,2}\.\d{2}\b|\b\d{1,2}\s+(?:янв|фев|мар|апр|ма[йя]|июн|июл|авг|сен|окт|ноя|дек)|\b\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)|\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s+\d{1,2}\b|сегодня|завтра|\btoday\b|\btomorrow\b"
    )
    .expect("valid regex");
    static ref PLACE_MARKER: Regex = Regex::new(
        r"(?i)онлайн|офлайн|online|offline|москв|moscow|петербург|спб|petersburg|казан|новосибирск|екатеринбург|\bместо\b|venue"
    )
    .expect("valid regex");
    static ref YEAR_TOKEN: Regex = Regex::new(r"\b20\d{2}\b").expect("valid regex");
}

/// Unverified text+URL pair scraped from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEvent {
    pub raw_text: String,
    pub url: String,
    pub source_name: String,
}

/// Extract candidate events from one page.
///
/// `seen` carries URLs already taken earlier in the same run; kept URLs are
/// added to it. Pure and synchronous so it can run on the blocking pool.
pub fn extract_candidates(
    html: &str,
    source_name: &str,
    base_url: &Url,
    keywords: Option<&[String]>,
    seen: &mut HashSet<String>,
) -> Vec<CandidateEvent> {
    let document = Html::parse_document(html);

    let mut blocks: Vec<ElementRef> = document
        .select(&BLOCK_SELECTOR)
        .filter(|el| el.value().attr("class").is_some_and(|c| BLOCK_CLASS.is_match(c)))
        .collect();
    if blocks.is_empty() {
        blocks = document.select(&LINK_SELECTOR).collect();
    }

    let keywords: Vec<String> = keywords
        .unwrap_or_default()
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    let mut candidates = Vec::new();
    for block in blocks {
        if candidates.len() >= MAX_CANDIDATES_PER_SOURCE {
            break;
        }
        if inside_page_chrome(&block) {
            continue;
        }

        let Some(url) = block_link(&block).and_then(|href| resolve_link(base_url, href)) else {
            continue;
        };
        if seen.contains(&url) {
            continue;
        }

        let text = block_text(&block);
        if text.chars().count() < MIN_TEXT_CHARS {
            continue;
        }

        if !keywords.is_empty() {
            let lower = text.to_lowercase();
            if !keywords.iter().any(|k| lower.contains(k.as_str())) {
                continue;
            }
        }

        if !looks_like_event(&text) {
            continue;
        }

        seen.insert(url.clone());
        candidates.push(CandidateEvent {
            raw_text: truncate_chars(&text, MAX_TEXT_CHARS),
            url,
            source_name: source_name.to_string(),
        });
    }

    candidates
}

/// Registration wording, a date, a place marker or a year.
pub fn looks_like_event(text: &str) -> bool {
    REGISTRATION_WORDING.is_match(text)
        || DATE_TOKEN.is_match(text)
        || PLACE_MARKER.is_match(text)
        || YEAR_TOKEN.is_match(text)
}

fn inside_page_chrome(el: &ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| matches!(a.value().name(), "nav" | "footer" | "header"))
}

fn block_link<'a>(block: &ElementRef<'a>) -> Option<&'a str> {
    if block.value().name() == "a" {
        if let Some(href) = block.value().attr("href") {
            return Some(href);
        }
    }
    block
        .select(&LINK_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))
}

/// Absolute http(s) URL, or None for anchors, scripts and other schemes.
fn resolve_link(base_url: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let resolved = base_url.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

fn block_text(block: &ElementRef) -> String {
    let full = collapse_whitespace(&block.text().collect::<Vec<_>>().join(" "));

    let title = block
        .select(&HEADING_SELECTOR)
        .find(|el| {
            let name = el.value().name();
            name.len() == 2 && name.starts_with('h') && name != "hr"
                || el.value().attr("class").is_some_and(|c| TITLE_CLASS.is_match(c))
        })
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|t| !t.is_empty());

    match title {
        Some(title) if title != full => format!("{}. {}", title, full),
        _ => full,
    }
}
