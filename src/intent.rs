//! Query-type classification.
//!
//! The precedence chain is load-bearing: a phrase like "best batters in
//! powerplay" satisfies both the superlative and the phase families, and
//! ranking is the more useful reading, so superlatives are checked before
//! phase keywords. That ordering is a policy choice, not an accident.

use serde::{Deserialize, Serialize};

use crate::analysis::Metric;
use crate::entities::ExtractedEntities;
use crate::filters::ExtractedFilters;
use crate::fuzzy::contains_phrase;

const MATCHUP: &[&str] = &["vs", "against", "matchup", "head to head", "h2h", "versus"];
const ENTRY_POINT: &[&str] = &[
    "entry point",
    "next batter",
    "batting position",
    "batting order",
];
const SUPERLATIVE: &[&str] = &[
    "most", "highest", "best", "top", "leading", "maximum", "lowest", "worst", "poorest",
];
const PHASE: &[&str] = &[
    "phase",
    "powerplay",
    "power play",
    "death over",
    "death overs",
    "middle over",
    "middle overs",
    "overs",
];
const PARTNERSHIP: &[&str] = &["partnership", "partnerships", "batting partners", "and"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Matchup,
    TopPerformers,
    PhaseAnalysis,
    Partnership,
    EntryPointAnalysis,
    BasicStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialAnalysis {
    TeamVsTeam,
    PlayerVsPlayer,
    PlayerVsBowlingType,
    NextBatter,
}

/// Advisory only; never changes which SQL template is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Basic,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryIntent {
    pub kind: IntentKind,
    pub special_analysis: Option<SpecialAnalysis>,
    pub complexity: Complexity,
}

pub struct IntentClassifier;

impl IntentClassifier {
    pub fn classify(
        query_lower: &str,
        entities: &ExtractedEntities,
        filters: &ExtractedFilters,
        metrics: &[Metric],
    ) -> QueryIntent {
        let hit = |phrases: &[&str]| phrases.iter().any(|p| contains_phrase(query_lower, p));

        let mut special_analysis = None;
        let kind = if hit(MATCHUP) {
            IntentKind::Matchup
        } else if hit(ENTRY_POINT) {
            special_analysis = Some(SpecialAnalysis::NextBatter);
            IntentKind::EntryPointAnalysis
        } else if hit(SUPERLATIVE) {
            IntentKind::TopPerformers
        } else if hit(PHASE) {
            IntentKind::PhaseAnalysis
        } else if hit(PARTNERSHIP) && entities.players.len() >= 2 {
            IntentKind::Partnership
        } else if entities.players.is_empty() && entities.teams.is_empty() && !metrics.is_empty() {
            // A bare metric mention ("economy rate") with nobody named reads
            // as a leaderboard, not as stats about a missing player.
            IntentKind::TopPerformers
        } else {
            IntentKind::BasicStats
        };

        if kind == IntentKind::Matchup {
            // Teams dominate: ambiguous text like "CSK vs MI" mentions city
            // names that could fuzzy-hit players, but a team head-to-head is
            // the intended reading whenever two teams are present.
            if entities.teams.len() >= 2 {
                special_analysis = Some(SpecialAnalysis::TeamVsTeam);
            } else if entities.players.len() >= 2 {
                special_analysis = Some(SpecialAnalysis::PlayerVsPlayer);
            } else if entities.players.len() == 1 && filters.bowling_type.is_some() {
                special_analysis = Some(SpecialAnalysis::PlayerVsBowlingType);
            }
        }

        let complexity = Self::score_complexity(query_lower, entities, filters, kind);

        QueryIntent {
            kind,
            special_analysis,
            complexity,
        }
    }

    fn score_complexity(
        query_lower: &str,
        entities: &ExtractedEntities,
        filters: &ExtractedFilters,
        kind: IntentKind,
    ) -> Complexity {
        let factors = [
            entities.players.len() > 1,
            filters.count_set() > 1,
            matches!(
                kind,
                IntentKind::Matchup | IntentKind::EntryPointAnalysis | IntentKind::Partnership
            ),
            contains_phrase(query_lower, "vs"),
            filters.phase.is_some() || contains_phrase(query_lower, "phase"),
        ];

        match factors.iter().filter(|f| **f).count() {
            0 => Complexity::Basic,
            1 => Complexity::Intermediate,
            _ => Complexity::Advanced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{BowlingType, FilterExtractor};

    fn entities(players: &[&str], teams: &[&str]) -> ExtractedEntities {
        ExtractedEntities {
            players: players.iter().map(|s| s.to_string()).collect(),
            teams: teams.iter().map(|s| s.to_string()).collect(),
            seasons: vec![],
        }
    }

    fn classify(query: &str, entities: &ExtractedEntities) -> QueryIntent {
        let filters = FilterExtractor::extract(query);
        let metrics = crate::analysis::detect_metrics(query);
        IntentClassifier::classify(query, entities, &filters, &metrics)
    }

    #[test]
    fn matchup_beats_everything() {
        let intent = classify(
            "best kohli vs bumrah stats in powerplay",
            &entities(&["Virat Kohli", "Jasprit Bumrah"], &[]),
        );
        assert_eq!(intent.kind, IntentKind::Matchup);
        assert_eq!(intent.special_analysis, Some(SpecialAnalysis::PlayerVsPlayer));
    }

    #[test]
    fn superlative_beats_phase() {
        // Policy: ranking is the dominant reading of "best ... in powerplay".
        let intent = classify("best batters in powerplay", &entities(&[], &[]));
        assert_eq!(intent.kind, IntentKind::TopPerformers);
    }

    #[test]
    fn phase_without_superlative() {
        let intent = classify(
            "kohli in death overs",
            &entities(&["Virat Kohli"], &[]),
        );
        assert_eq!(intent.kind, IntentKind::PhaseAnalysis);
    }

    #[test]
    fn entry_point_sets_next_batter_tag() {
        let intent = classify("dhoni entry point analysis", &entities(&["MS Dhoni"], &[]));
        assert_eq!(intent.kind, IntentKind::EntryPointAnalysis);
        assert_eq!(intent.special_analysis, Some(SpecialAnalysis::NextBatter));
    }

    #[test]
    fn partnership_requires_two_players() {
        let intent = classify(
            "kohli and de villiers partnership",
            &entities(&["Virat Kohli", "AB de Villiers"], &[]),
        );
        assert_eq!(intent.kind, IntentKind::Partnership);

        // One resolved player: the conjunction alone is not enough.
        let intent = classify("kohli and friends", &entities(&["Virat Kohli"], &[]));
        assert_eq!(intent.kind, IntentKind::BasicStats);
    }

    #[test]
    fn teams_dominate_matchup_refinement() {
        let intent = classify(
            "csk vs mi head to head",
            &entities(
                &["MS Dhoni", "Rohit Sharma"],
                &["Chennai Super Kings", "Mumbai Indians"],
            ),
        );
        assert_eq!(intent.special_analysis, Some(SpecialAnalysis::TeamVsTeam));
    }

    #[test]
    fn single_player_with_bowling_type_is_player_vs_bowling_type() {
        let query = "kohli vs spin";
        let entities = entities(&["Virat Kohli"], &[]);
        let filters = FilterExtractor::extract(query);
        assert_eq!(filters.bowling_type, Some(BowlingType::Spin));

        let intent = IntentClassifier::classify(query, &entities, &filters, &[]);
        assert_eq!(intent.kind, IntentKind::Matchup);
        assert_eq!(
            intent.special_analysis,
            Some(SpecialAnalysis::PlayerVsBowlingType)
        );
    }

    #[test]
    fn bare_metric_without_entities_reads_as_leaderboard() {
        let intent = classify("economy rate", &entities(&[], &[]));
        assert_eq!(intent.kind, IntentKind::TopPerformers);

        // No metric keyword and nobody named: stays basic stats, which the
        // synthesizer turns into a placeholder.
        let intent = classify("john smith stats", &entities(&[], &[]));
        assert_eq!(intent.kind, IntentKind::BasicStats);
    }

    #[test]
    fn default_is_basic_stats() {
        let intent = classify("virat kohli total runs", &entities(&["Virat Kohli"], &[]));
        assert_eq!(intent.kind, IntentKind::BasicStats);
        assert_eq!(intent.complexity, Complexity::Basic);
    }

    #[test]
    fn complexity_counts_factors() {
        let intent = classify(
            "kohli vs bumrah in death overs",
            &entities(&["Virat Kohli", "Jasprit Bumrah"], &[]),
        );
        assert_eq!(intent.complexity, Complexity::Advanced);
    }
}
