//! Cricket-semantic filter extraction.
//!
//! Each field is set only when the text carries explicit evidence for it;
//! absence means "no constraint". Defaults are a synthesis-time concern.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::fuzzy::contains_phrase;

lazy_static! {
    static ref OVER_RANGE_RES: Vec<Regex> = vec![
        Regex::new(r"overs?\s+(\d{1,2})\s+to\s+(\d{1,2})").unwrap(),
        Regex::new(r"overs?\s+(\d{1,2})\s*-\s*(\d{1,2})").unwrap(),
    ];
    // Priority order matters: the first matching pattern wins.
    static ref MIN_RUNS_RES: Vec<Regex> = vec![
        Regex::new(r"min(?:imum)?\.?\s+of\s+(\d+)\s+runs?").unwrap(),
        Regex::new(r"min(?:imum)?\.?\s*(\d+)\s+runs?").unwrap(),
        Regex::new(r"at least\s+(\d+)\s+runs?").unwrap(),
        Regex::new(r"more than\s+(\d+)\s+runs?").unwrap(),
        Regex::new(r"min(?:imum)?\s+(\d+)").unwrap(),
    ];
    static ref MIN_TARGET_RE: Regex = Regex::new(r"(\d+)\+?\s+chase").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Powerplay,
    Middle,
    Death,
    Custom,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Powerplay => "powerplay",
            Phase::Middle => "middle overs",
            Phase::Death => "death overs",
            Phase::Custom => "custom overs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BowlingType {
    Pace,
    Spin,
}

impl BowlingType {
    /// Value stored in the `bowling_type` column.
    pub fn column_value(&self) -> &'static str {
        match self {
            BowlingType::Pace => "pace",
            BowlingType::Spin => "spin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattingStyle {
    Lhb,
    Rhb,
}

impl BattingStyle {
    /// Value stored in the `bat_hand` column.
    pub fn column_value(&self) -> &'static str {
        match self {
            BattingStyle::Lhb => "LHB",
            BattingStyle::Rhb => "RHB",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    Runs,
    Average,
    StrikeRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomyDirection {
    Best,
    Worst,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedFilters {
    pub phase: Option<Phase>,
    /// Inclusive over range, 1-20, start <= end. Always present when
    /// `phase` is present.
    pub over_range: Option<(u8, u8)>,
    pub bowling_type: Option<BowlingType>,
    pub batting_style: Option<BattingStyle>,
    pub min_runs: Option<u32>,
    pub min_target: Option<u32>,
    pub order_by: Option<OrderBy>,
    pub economy_direction: Option<EconomyDirection>,
    pub innings: Option<u8>,
}

impl ExtractedFilters {
    /// Number of constraints present; feeds the complexity score.
    pub fn count_set(&self) -> usize {
        [
            self.phase.is_some(),
            self.bowling_type.is_some(),
            self.batting_style.is_some(),
            self.min_runs.is_some(),
            self.min_target.is_some(),
            self.order_by.is_some(),
            self.economy_direction.is_some(),
            self.innings.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

pub struct FilterExtractor;

impl FilterExtractor {
    pub fn extract(query_lower: &str) -> ExtractedFilters {
        let mut filters = ExtractedFilters::default();

        Self::extract_phase(query_lower, &mut filters);
        Self::extract_bowling_type(query_lower, &mut filters);
        Self::extract_batting_style(query_lower, &mut filters);
        Self::extract_thresholds(query_lower, &mut filters);
        Self::extract_ordering(query_lower, &mut filters);
        Self::extract_innings(query_lower, &mut filters);

        filters
    }

    /// Explicit numeric ranges beat named phases; only one phase is ever
    /// set, first match in precedence order wins.
    fn extract_phase(query: &str, filters: &mut ExtractedFilters) {
        for re in OVER_RANGE_RES.iter() {
            if let Some(caps) = re.captures(query) {
                let start: u8 = caps[1].parse().unwrap_or(0);
                let end: u8 = caps[2].parse().unwrap_or(0);
                // Invalid ranges are not evidence, not something to clamp.
                if (1..=20).contains(&start) && (1..=20).contains(&end) && start <= end {
                    filters.phase = Some(Phase::Custom);
                    filters.over_range = Some((start, end));
                    return;
                }
            }
        }

        const POWERPLAY: &[&str] = &["powerplay", "power play", "first 6 overs"];
        const MIDDLE: &[&str] = &["middle over", "middle overs"];
        const DEATH: &[&str] = &[
            "death over",
            "death overs",
            "death",
            "final over",
            "final overs",
            "last 5 overs",
        ];

        let hit = |phrases: &[&str]| phrases.iter().any(|p| contains_phrase(query, p));

        if hit(POWERPLAY) {
            filters.phase = Some(Phase::Powerplay);
            filters.over_range = Some((1, 6));
        } else if hit(MIDDLE) {
            filters.phase = Some(Phase::Middle);
            filters.over_range = Some((7, 15));
        } else if hit(DEATH) {
            filters.phase = Some(Phase::Death);
            filters.over_range = Some((16, 20));
        }
    }

    /// Spin keywords are checked before pace keywords; first hit wins.
    fn extract_bowling_type(query: &str, filters: &mut ExtractedFilters) {
        const SPIN: &[&str] = &["spin", "spinner", "spinners", "spin bowling"];
        const PACE: &[&str] = &[
            "pace",
            "pacer",
            "pacers",
            "fast bowling",
            "fast bowlers",
            "seam",
            "medium pace",
        ];

        if SPIN.iter().any(|p| contains_phrase(query, p)) {
            filters.bowling_type = Some(BowlingType::Spin);
        } else if PACE.iter().any(|p| contains_phrase(query, p)) {
            filters.bowling_type = Some(BowlingType::Pace);
        }
    }

    fn extract_batting_style(query: &str, filters: &mut ExtractedFilters) {
        const LEFT: &[&str] = &["lhb", "left hand", "left handed", "leftie", "left handers"];
        const RIGHT: &[&str] = &["rhb", "right hand", "right handed", "right handers"];

        if LEFT.iter().any(|p| contains_phrase(query, p)) {
            filters.batting_style = Some(BattingStyle::Lhb);
        } else if RIGHT.iter().any(|p| contains_phrase(query, p)) {
            filters.batting_style = Some(BattingStyle::Rhb);
        }
    }

    fn extract_thresholds(query: &str, filters: &mut ExtractedFilters) {
        for re in MIN_RUNS_RES.iter() {
            if let Some(caps) = re.captures(query) {
                if let Ok(value) = caps[1].parse() {
                    filters.min_runs = Some(value);
                    break;
                }
            }
        }

        if let Some(caps) = MIN_TARGET_RE.captures(query) {
            if let Ok(value) = caps[1].parse() {
                filters.min_target = Some(value);
            }
        }
    }

    fn extract_ordering(query: &str, filters: &mut ExtractedFilters) {
        if contains_phrase(query, "by average") {
            filters.order_by = Some(OrderBy::Average);
        } else if contains_phrase(query, "by strike rate") {
            filters.order_by = Some(OrderBy::StrikeRate);
        } else if contains_phrase(query, "by runs") {
            filters.order_by = Some(OrderBy::Runs);
        }

        const WORST_ECONOMY: &[&str] = &["worst economy", "highest economy", "poorest economy"];
        const BEST_ECONOMY: &[&str] = &["best economy", "lowest economy"];

        if WORST_ECONOMY.iter().any(|p| contains_phrase(query, p)) {
            filters.economy_direction = Some(EconomyDirection::Worst);
        } else if BEST_ECONOMY.iter().any(|p| contains_phrase(query, p)) {
            filters.economy_direction = Some(EconomyDirection::Best);
        }
    }

    fn extract_innings(query: &str, filters: &mut ExtractedFilters) {
        if contains_phrase(query, "first innings") {
            filters.innings = Some(1);
        } else if contains_phrase(query, "second innings") {
            filters.innings = Some(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_phases_map_to_fixed_ranges() {
        let filters = FilterExtractor::extract("best batters in powerplay");
        assert_eq!(filters.phase, Some(Phase::Powerplay));
        assert_eq!(filters.over_range, Some((1, 6)));

        let filters = FilterExtractor::extract("runs in death overs");
        assert_eq!(filters.phase, Some(Phase::Death));
        assert_eq!(filters.over_range, Some((16, 20)));

        let filters = FilterExtractor::extract("middle overs economy");
        assert_eq!(filters.over_range, Some((7, 15)));
    }

    #[test]
    fn explicit_range_beats_named_phase() {
        let filters = FilterExtractor::extract("death over stats for overs 7 to 10");
        assert_eq!(filters.phase, Some(Phase::Custom));
        assert_eq!(filters.over_range, Some((7, 10)));
    }

    #[test]
    fn hyphenated_range_is_recognized() {
        let filters = FilterExtractor::extract("overs 16-20 scoring");
        assert_eq!(filters.over_range, Some((16, 20)));
    }

    #[test]
    fn invalid_ranges_are_not_evidence() {
        let filters = FilterExtractor::extract("overs 12 to 5");
        assert_eq!(filters.phase, None);
        assert_eq!(filters.over_range, None);

        let filters = FilterExtractor::extract("overs 18 to 25");
        assert_eq!(filters.over_range, None);
    }

    #[test]
    fn spin_wins_over_pace_on_joint_mention() {
        let filters = FilterExtractor::extract("spin and pace comparison");
        assert_eq!(filters.bowling_type, Some(BowlingType::Spin));
    }

    #[test]
    fn batting_style_keywords() {
        let filters = FilterExtractor::extract("Rashid Khan vs LHB");
        assert_eq!(filters.batting_style, Some(BattingStyle::Lhb));

        let filters = FilterExtractor::extract("economy against right handers");
        assert_eq!(filters.batting_style, Some(BattingStyle::Rhb));
    }

    #[test]
    fn min_runs_patterns_in_priority_order() {
        assert_eq!(
            FilterExtractor::extract("minimum 800 runs").min_runs,
            Some(800)
        );
        assert_eq!(
            FilterExtractor::extract("min 500 runs").min_runs,
            Some(500)
        );
        assert_eq!(
            FilterExtractor::extract("at least 1000 runs").min_runs,
            Some(1000)
        );
        assert_eq!(
            FilterExtractor::extract("more than 250 runs").min_runs,
            Some(250)
        );
        assert_eq!(FilterExtractor::extract("min 300").min_runs, Some(300));
    }

    #[test]
    fn chase_threshold() {
        let filters = FilterExtractor::extract("best batters in 180+ chases");
        assert_eq!(filters.min_target, Some(180));

        let filters = FilterExtractor::extract("200 chase scenarios");
        assert_eq!(filters.min_target, Some(200));
    }

    #[test]
    fn ordering_and_economy_direction() {
        assert_eq!(
            FilterExtractor::extract("top scorers by average").order_by,
            Some(OrderBy::Average)
        );
        assert_eq!(
            FilterExtractor::extract("rank by strike rate").order_by,
            Some(OrderBy::StrikeRate)
        );
        assert_eq!(
            FilterExtractor::extract("worst economy in death overs").economy_direction,
            Some(EconomyDirection::Worst)
        );
        assert_eq!(
            FilterExtractor::extract("economy rate").economy_direction,
            None
        );
    }

    #[test]
    fn innings_filter() {
        assert_eq!(
            FilterExtractor::extract("second innings collapse").innings,
            Some(2)
        );
    }

    #[test]
    fn empty_text_sets_nothing() {
        let filters = FilterExtractor::extract("tell me something about cricket");
        assert_eq!(filters.count_set(), 0);
    }
}
