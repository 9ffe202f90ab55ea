//! Deterministic corrections applied on top of the classifier's score.
//!
//! Rules are an ordered table. Each rule that matches the candidate's source
//! text adds its bonus; some also force the priority to high. The final score
//! is clamped to 0..=100 and, unless forced, the priority is re-derived from
//! the score band.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use super::schema::{EventAnalysis, Priority};

lazy_static! {
    static ref AI_ML_VOCABULARY: Regex = Regex::new(
        r"(?i)\b(?:ai|ml|llm|gpt|genai|nlp|ии|machine learning|deep learning|data science|computer vision|нейросет\w*|искусственн\w* интеллект\w*|машинн\w* обучени\w*|генеративн\w*)\b"
    )
    .expect("valid AI/ML regex");

    static ref STRATEGIC_OR_SPONSORSHIP: Regex = Regex::new(
        r"(?i)(?:стратегическ\w* сесси\w*|strategic session|официальн\w* спонсор\w*|генеральн\w* спонсор\w*|official sponsor\w*|sponsorship|спонсорств\w*)"
    )
    .expect("valid sponsorship regex");

    static ref LARGE_AUDIENCE: Regex = Regex::new(
        r"(?i)(?:(?:^|\D)(?:100|500|1[\s\u{a0}]?000)\s*\+|(?:более|от|свыше|over|more than)\s+(?:100|500|1[\s\u{a0}]?000)\s+(?:участник|человек|гост|attendee|participant|people))"
    )
    .expect("valid audience regex");
}

pub const DEFAULT_PREMIUM_ORGANIZERS: &[&str] = &["Сбер", "Sber", "Яндекс", "Yandex", "VK"];

pub const DEFAULT_REGION_TOKENS: &[&str] = &[
    "Санкт-Петербург",
    "Петербург",
    "СПб",
    "SPb",
    "Saint Petersburg",
    "St. Petersburg",
    "Ленинградская",
];

/// A single scoring rule.
#[derive(Debug, Clone)]
pub struct ScoreRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub bonus: i32,
    pub force_high: bool,
}

/// Which rules fired for a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    pub name: &'static str,
    pub bonus: i32,
}

#[derive(Debug, Clone)]
pub struct ScoringRules {
    rules: Vec<ScoreRule>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::new(DEFAULT_PREMIUM_ORGANIZERS, DEFAULT_REGION_TOKENS)
    }
}

impl ScoringRules {
    pub fn new<S: AsRef<str>>(premium_organizers: &[S], region_tokens: &[S]) -> Self {
        let mut rules = vec![ScoreRule {
            name: "ai_ml_vocabulary",
            pattern: AI_ML_VOCABULARY.clone(),
            bonus: 15,
            force_high: false,
        }];

        if let Some(pattern) = any_of(premium_organizers) {
            rules.push(ScoreRule {
                name: "premium_organizer",
                pattern,
                bonus: 20,
                force_high: true,
            });
        }

        rules.push(ScoreRule {
            name: "strategic_or_sponsorship",
            pattern: STRATEGIC_OR_SPONSORSHIP.clone(),
            bonus: 25,
            force_high: true,
        });

        rules.push(ScoreRule {
            name: "large_audience",
            pattern: LARGE_AUDIENCE.clone(),
            bonus: 10,
            force_high: false,
        });

        if let Some(pattern) = any_of(region_tokens) {
            rules.push(ScoreRule {
                name: "target_region",
                pattern,
                bonus: 5,
                force_high: false,
            });
        }

        Self { rules }
    }

    /// Built-in lists, each replaced by its override when one is given.
    pub fn with_overrides(premium_organizers: Option<&[String]>, region_tokens: Option<&[String]>) -> Self {
        let defaults = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let premium = premium_organizers
            .map(<[String]>::to_vec)
            .unwrap_or_else(|| defaults(DEFAULT_PREMIUM_ORGANIZERS));
        let regions = region_tokens
            .map(<[String]>::to_vec)
            .unwrap_or_else(|| defaults(DEFAULT_REGION_TOKENS));
        Self::new(&premium, &regions)
    }

    pub fn rules(&self) -> &[ScoreRule] {
        &self.rules
    }

    /// Adjust `analysis` in place using the candidate's source text.
    pub fn apply(&self, source_text: &str, analysis: &mut EventAnalysis) -> Vec<RuleHit> {
        let hits: Vec<&ScoreRule> = self
            .rules
            .iter()
            .filter(|rule| rule.pattern.is_match(source_text))
            .collect();

        let bonus: i32 = hits.iter().map(|r| r.bonus).sum();
        let forced = hits.iter().any(|r| r.force_high);

        analysis.score = (i32::from(analysis.score) + bonus).clamp(0, 100) as u8;
        analysis.priority = if forced {
            Priority::High
        } else {
            Priority::from_score(analysis.score)
        };

        hits.into_iter()
            .map(|r| RuleHit {
                name: r.name,
                bonus: r.bonus,
            })
            .collect()
    }
}

/// Case-insensitive alternation of literal tokens, or None for an empty list.
fn any_of<S: AsRef<str>>(tokens: &[S]) -> Option<Regex> {
    let alternatives: Vec<String> = tokens
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        return None;
    }

    RegexBuilder::new(&format!("(?:{})", alternatives.join("|")))
        .case_insensitive(true)
        .build()
        .ok()
}
