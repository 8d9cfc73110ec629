//! Plan building: one normalized record per request.
//!
//! `QueryAnalyzer` runs the extractors and the classifier and assembles the
//! `AnalysisRecord`. The record is the sole input to SQL synthesis, which
//! keeps the synthesizer unit-testable with literal records instead of
//! parsed strings.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::CanonicalCatalog;
use crate::config::AnalyticsConfig;
use crate::entities::{EntityExtractor, ExtractedEntities};
use crate::filters::{ExtractedFilters, FilterExtractor};
use crate::fuzzy::contains_phrase;
use crate::intent::{IntentClassifier, QueryIntent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Runs,
    Wickets,
    Sixes,
    Fours,
    StrikeRate,
    Average,
    Economy,
    DotBalls,
}

impl Metric {
    /// Metrics that frame a question as a bowling question.
    pub fn is_bowling(&self) -> bool {
        matches!(self, Metric::Wickets | Metric::Economy)
    }
}

/// Keyword families for metric detection; every family that matches is
/// recorded, first family hit ranks first. An empty result means the text
/// named no metric at all; `AnalysisRecord::primary_metric` falls back to
/// runs in that case.
pub fn detect_metrics(query_lower: &str) -> Vec<Metric> {
    const FAMILIES: &[(Metric, &[&str])] = &[
        (Metric::Wickets, &["wicket", "wickets", "dismissed"]),
        (Metric::Economy, &["economy", "economy rate"]),
        (Metric::Sixes, &["six", "sixes", "6s"]),
        (Metric::Fours, &["four", "fours", "boundaries", "4s"]),
        (Metric::StrikeRate, &["strike rate", "sr"]),
        (Metric::Average, &["average", "avg"]),
        (Metric::DotBalls, &["dot balls", "dots"]),
        (Metric::Runs, &["runs", "run", "scored", "score", "scorers"]),
    ];

    FAMILIES
        .iter()
        .filter(|(_, phrases)| phrases.iter().any(|p| contains_phrase(query_lower, p)))
        .map(|(metric, _)| *metric)
        .collect()
}

/// Everything the synthesizer needs, and nothing it has to re-parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub raw_query: String,
    pub entities: ExtractedEntities,
    pub filters: ExtractedFilters,
    pub metrics: Vec<Metric>,
    pub intent: QueryIntent,
}

impl AnalysisRecord {
    pub fn primary_metric(&self) -> Metric {
        self.metrics.first().copied().unwrap_or(Metric::Runs)
    }
}

pub struct QueryAnalyzer {
    entity_extractor: EntityExtractor,
}

impl QueryAnalyzer {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            entity_extractor: EntityExtractor::new(config.current_season),
        }
    }

    pub fn analyze(&self, raw_query: &str, catalog: &CanonicalCatalog) -> AnalysisRecord {
        let query_lower = raw_query.to_lowercase();

        let entities = self.entity_extractor.extract(raw_query, catalog);
        let filters = FilterExtractor::extract(&query_lower);
        let metrics = detect_metrics(&query_lower);
        let intent = IntentClassifier::classify(&query_lower, &entities, &filters, &metrics);

        debug!(
            intent = ?intent.kind,
            special = ?intent.special_analysis,
            players = ?entities.players,
            teams = ?entities.teams,
            "query analyzed"
        );

        AnalysisRecord {
            raw_query: raw_query.to_string(),
            entities,
            filters,
            metrics,
            intent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentKind;

    fn catalog() -> CanonicalCatalog {
        CanonicalCatalog::new(
            vec![
                "Virat Kohli".to_string(),
                "Jasprit Bumrah".to_string(),
                "Rashid Khan".to_string(),
            ],
            vec!["Chennai Super Kings".to_string(), "Mumbai Indians".to_string()],
        )
    }

    fn analyzer() -> QueryAnalyzer {
        QueryAnalyzer::new(&AnalyticsConfig::default())
    }

    #[test]
    fn no_metric_keyword_yields_empty_list() {
        assert!(detect_metrics("kohli stats").is_empty());
    }

    #[test]
    fn primary_metric_falls_back_to_runs() {
        let record = analyzer().analyze("kohli stats", &catalog());
        assert!(record.metrics.is_empty());
        assert_eq!(record.primary_metric(), Metric::Runs);
    }

    #[test]
    fn bowling_metrics_are_flagged() {
        let metrics = detect_metrics("rashid khan economy rate");
        assert!(metrics.contains(&Metric::Economy));
        assert!(metrics[0].is_bowling());
    }

    #[test]
    fn analyze_assembles_full_record() {
        let record = analyzer().analyze("Kohli runs in death overs min 500 runs", &catalog());
        assert_eq!(record.entities.players, vec!["Virat Kohli"]);
        assert_eq!(record.filters.min_runs, Some(500));
        assert!(record.filters.over_range.is_some());
        assert_eq!(record.raw_query, "Kohli runs in death overs min 500 runs");
    }

    #[test]
    fn analyze_is_deterministic() {
        let a = analyzer().analyze("CSK vs MI head to head", &catalog());
        let b = analyzer().analyze("CSK vs MI head to head", &catalog());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn matchup_query_classifies_end_to_end() {
        let record = analyzer().analyze("Kohli vs Bumrah", &catalog());
        assert_eq!(record.intent.kind, IntentKind::Matchup);
        assert_eq!(
            record.entities.players,
            vec!["Virat Kohli", "Jasprit Bumrah"]
        );
    }
}
