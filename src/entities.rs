//! Player, team and season extraction from free text.

use serde::{Deserialize, Serialize};

use crate::catalog::CanonicalCatalog;
use crate::config::FIRST_SEASON;
use crate::fuzzy::{contains_phrase, NameMatcher};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref YEAR_RE: Regex = Regex::new(r"\b(20\d{2})\b").unwrap();
}

/// Matchup phrasing that makes a binary reading of the player list.
const MATCHUP_MARKERS: &[&str] = &["vs", "versus", "against", "matchup"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedEntities {
    /// Canonical player names, deduplicated, first-seen order.
    pub players: Vec<String>,
    /// Canonical team names, deduplicated, first-seen order.
    pub teams: Vec<String>,
    /// Four-digit season years as strings, deduplicated.
    pub seasons: Vec<String>,
}

pub struct EntityExtractor {
    matcher: NameMatcher,
    current_season: u16,
}

impl EntityExtractor {
    pub fn new(current_season: u16) -> Self {
        Self {
            matcher: NameMatcher::default(),
            current_season,
        }
    }

    pub fn extract(&self, raw_query: &str, catalog: &CanonicalCatalog) -> ExtractedEntities {
        ExtractedEntities {
            players: self.extract_players(raw_query, catalog),
            teams: self.extract_teams(raw_query, catalog),
            seasons: self.extract_seasons(raw_query),
        }
    }

    /// Two passes: curated aliases first, then fuzzy matching against the
    /// full catalog only when no alias hit at all. Matchup questions are
    /// strictly binary, so more than two hits truncate to the first two.
    fn extract_players(&self, raw_query: &str, catalog: &CanonicalCatalog) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();

        for (alias, canonical) in catalog.player_aliases() {
            if contains_phrase(raw_query, alias) && !found.contains(canonical) {
                found.push(canonical.clone());
            }
        }
        // Alias iteration order is arbitrary; restore first-seen order by
        // position of the alias hit in the query text.
        let normalized = format!(" {} ", NameMatcher::normalize(raw_query));
        found.sort_by_key(|canonical| {
            catalog
                .player_aliases()
                .iter()
                .filter(|(_, c)| *c == canonical)
                .filter_map(|(alias, _)| normalized.find(&format!(" {} ", alias)))
                .min()
                .unwrap_or(usize::MAX)
        });

        if found.is_empty() {
            found = self.fuzzy_players(raw_query, catalog);
        }

        let is_matchup = MATCHUP_MARKERS
            .iter()
            .any(|marker| contains_phrase(raw_query, marker));
        if is_matchup && found.len() > 2 {
            found.truncate(2);
        }

        found
    }

    fn fuzzy_players(&self, raw_query: &str, catalog: &CanonicalCatalog) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        let words: Vec<&str> = raw_query.split_whitespace().collect();

        for (i, word) in words.iter().enumerate() {
            if word.chars().filter(|c| c.is_alphanumeric()).count() > 2 {
                if let Some((name, _)) = self.matcher.best_partial_match(word, catalog.players())
                {
                    if !found.iter().any(|f| f == name) {
                        found.push(name.to_string());
                    }
                }
            }

            if i + 1 < words.len() {
                let window = format!("{} {}", word, words[i + 1]);
                if let Some((name, _)) = self.matcher.best_ratio_match(&window, catalog.players())
                {
                    if !found.iter().any(|f| f == name) {
                        found.push(name.to_string());
                    }
                }
            }
        }

        found
    }

    /// Exact alias lookup only. No fuzzy fallback: franchise names are too
    /// short and too similar for it to be safe.
    fn extract_teams(&self, raw_query: &str, catalog: &CanonicalCatalog) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for (alias, canonical) in catalog.team_aliases() {
            if contains_phrase(raw_query, alias) && !found.contains(canonical) {
                found.push(canonical.clone());
            }
        }
        let normalized = format!(" {} ", NameMatcher::normalize(raw_query));
        found.sort_by_key(|canonical| {
            catalog
                .team_aliases()
                .iter()
                .filter(|(_, c)| *c == canonical)
                .filter_map(|(alias, _)| normalized.find(&format!(" {} ", alias)))
                .min()
                .unwrap_or(usize::MAX)
        });
        found
    }

    fn extract_seasons(&self, raw_query: &str) -> Vec<String> {
        let mut seasons: Vec<String> = Vec::new();

        for capture in YEAR_RE.captures_iter(raw_query) {
            let year: u16 = capture[1].parse().unwrap_or(0);
            if (FIRST_SEASON..=self.current_season).contains(&year) {
                let year = year.to_string();
                if !seasons.contains(&year) {
                    seasons.push(year);
                }
            }
        }

        let lowered = raw_query.to_lowercase();
        if lowered.contains("this season") {
            let year = self.current_season.to_string();
            if !seasons.contains(&year) {
                seasons.push(year);
            }
        } else if lowered.contains("last season") {
            let year = (self.current_season - 1).to_string();
            if !seasons.contains(&year) {
                seasons.push(year);
            }
        }

        seasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_catalog() -> CanonicalCatalog {
        CanonicalCatalog::new(
            vec![
                "Virat Kohli".to_string(),
                "Jasprit Bumrah".to_string(),
                "Rohit Sharma".to_string(),
                "MS Dhoni".to_string(),
                "Faf du Plessis".to_string(),
                "Shubman Gill".to_string(),
            ],
            vec![
                "Chennai Super Kings".to_string(),
                "Mumbai Indians".to_string(),
            ],
        )
    }

    fn extractor() -> EntityExtractor {
        EntityExtractor::new(2024)
    }

    #[test]
    fn alias_hits_resolve_to_canonical_names() {
        let entities = extractor().extract("Kohli vs Bumrah", &test_catalog());
        assert_eq!(entities.players, vec!["Virat Kohli", "Jasprit Bumrah"]);
    }

    #[test]
    fn alias_hit_skips_fuzzy_pass() {
        // "dhoni" is an alias hit, so the misspelled "Sharmma" must not be
        // fuzzy-matched in the same call.
        let entities = extractor().extract("dhoni and Sharmma", &test_catalog());
        assert_eq!(entities.players, vec!["MS Dhoni"]);
    }

    #[test]
    fn fuzzy_pass_finds_uncurated_players() {
        let entities = extractor().extract("Shubman Gill total runs", &test_catalog());
        assert_eq!(entities.players, vec!["Shubman Gill"]);
    }

    #[test]
    fn duplicate_aliases_dedupe_to_one_player() {
        let entities = extractor().extract("virat kohli vk stats", &test_catalog());
        assert_eq!(entities.players, vec!["Virat Kohli"]);
    }

    #[test]
    fn matchup_truncates_to_two_players() {
        let entities = extractor().extract("kohli vs bumrah and dhoni", &test_catalog());
        assert_eq!(entities.players.len(), 2);
    }

    #[test]
    fn team_aliases_are_word_bounded() {
        let catalog = test_catalog();
        let entities = extractor().extract("CSK vs MI head to head", &catalog);
        assert_eq!(
            entities.teams,
            vec!["Chennai Super Kings", "Mumbai Indians"]
        );

        // "mi" inside "minimum" is not a team mention.
        let entities = extractor().extract("minimum 500 runs in chennai", &catalog);
        assert_eq!(entities.teams, vec!["Chennai Super Kings"]);
    }

    #[test]
    fn seasons_parse_years_and_relative_phrases() {
        let entities = extractor().extract("top scorers in 2023", &test_catalog());
        assert_eq!(entities.seasons, vec!["2023"]);

        let entities = extractor().extract("best bowlers this season", &test_catalog());
        assert_eq!(entities.seasons, vec!["2024"]);

        let entities = extractor().extract("last season highlights", &test_catalog());
        assert_eq!(entities.seasons, vec!["2023"]);
    }

    #[test]
    fn out_of_range_years_are_ignored() {
        let entities = extractor().extract("stats from 2005 and 2031", &test_catalog());
        assert!(entities.seasons.is_empty());
    }

    #[test]
    fn unknown_names_yield_empty_lists() {
        let entities = extractor().extract("Zorblax Quux batting average", &test_catalog());
        assert!(entities.players.is_empty());
        assert!(entities.teams.is_empty());
    }
}
