//! Seniority rank (1..=5) from a free-text job title.
//!
//! Bands are checked top-down and the first band with a keyword anywhere in
//! the title wins, so compounds like "Гендиректор" count. Matching is
//! case-insensitive; no match means rank 1.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

/// Registrations from users at or below this rank are approved without a human.
pub const AUTO_APPROVE_MAX_RANK: u8 = 2;

pub const LOWEST_RANK: u8 = 1;

pub struct RankBand {
    pub rank: u8,
    pub keywords: &'static [&'static str],
}

pub const RANK_BANDS: &[RankBand] = &[
    RankBand {
        rank: 5,
        keywords: &[
            "директор", "director", "ceo", "cto", "cfo", "cpo", "cmo", "c-level", "chief",
            "президент", "president", "вице-президент", "vice president", "founder",
            "основатель", "учредитель", "генеральн",
        ],
    },
    RankBand {
        rank: 4,
        keywords: &[
            "руководитель", "head", "начальник", "заведующ", "ведущий менеджер",
            "lead manager", "department lead",
        ],
    },
    RankBand {
        rank: 3,
        keywords: &[
            "senior", "сеньор", "старший", "team lead", "teamlead", "тимлид", "tech lead",
            "техлид", "principal", "architect", "архитектор",
        ],
    },
    RankBand {
        rank: 2,
        keywords: &[
            "middle", "мидл", "junior", "джун", "разработчик", "developer", "engineer",
            "инженер", "программист", "manager", "менеджер", "аналитик", "analyst",
            "дизайнер", "designer", "специалист", "specialist",
        ],
    },
];

lazy_static! {
    static ref COMPILED_BANDS: Vec<(u8, Regex)> = RANK_BANDS
        .iter()
        .filter_map(|band| any_substring(band.keywords).map(|re| (band.rank, re)))
        .collect();
}

fn any_substring(keywords: &[&str]) -> Option<Regex> {
    let alternatives: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
    RegexBuilder::new(&alternatives.join("|"))
        .case_insensitive(true)
        .build()
        .ok()
}

pub fn rank_for_position(position: &str) -> u8 {
    let position = position.trim();
    if position.is_empty() {
        return LOWEST_RANK;
    }

    COMPILED_BANDS
        .iter()
        .find(|(_, pattern)| pattern.is_match(position))
        .map(|(rank, _)| *rank)
        .unwrap_or(LOWEST_RANK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directors_and_c_level_are_top_rank() {
        assert_eq!(rank_for_position("Директор по продукту"), 5);
        assert_eq!(rank_for_position("CEO"), 5);
        assert_eq!(rank_for_position("Chief Data Officer"), 5);
    }

    #[test]
    fn empty_or_unknown_is_rank_one() {
        assert_eq!(rank_for_position(""), 1);
        assert_eq!(rank_for_position("   "), 1);
        assert_eq!(rank_for_position("Стажер"), 1);
    }

    #[test]
    fn first_matching_band_wins() {
        assert_eq!(rank_for_position("Senior разработчик"), 3);
        assert_eq!(rank_for_position("Руководитель отдела"), 4);
        assert_eq!(rank_for_position("Team Lead"), 3);
        assert_eq!(rank_for_position("Менеджер проектов"), 2);
        assert_eq!(rank_for_position("Middle разработчик"), 2);
    }

    #[test]
    fn keywords_match_inside_compound_titles() {
        assert_eq!(rank_for_position("Гендиректор"), 5);
        assert_eq!(rank_for_position("Замдиректора по ИТ"), 5);
        assert_eq!(rank_for_position("Финдиректор"), 5);
        assert_eq!(rank_for_position("Backend-разработчик"), 2);
        assert_eq!(rank_for_position("ВЕДУЩИЙ МЕНЕДЖЕР"), 4);
    }
}
