//! Deterministic SQL synthesis.
//!
//! `SqlSynthesizer::synthesize` is a total, side-effect-free function from an
//! `AnalysisRecord` to one SELECT statement. Missing preconditions produce a
//! comment-only placeholder instead of an error, so callers distinguish "no
//! SQL" from "SQL failed" by inspecting the result, not by catching.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisRecord, Metric};
use crate::config::{SynthesisConfig, BALL_BY_BALL_TABLE};
use crate::filters::{EconomyDirection, ExtractedFilters, OrderBy, Phase};
use crate::intent::{IntentKind, SpecialAnalysis};

/// Valid deliveries only; wides and no-balls do not count toward the over.
const VALID_BALLS: &str = "COUNT(CASE WHEN valid_ball = 1 THEN 1 END)";
const FOURS: &str = "COUNT(CASE WHEN is_four = 1 THEN 1 END)";
const SIXES: &str = "COUNT(CASE WHEN is_six = 1 THEN 1 END)";
const WICKETS: &str = "COUNT(CASE WHEN is_wicket = 1 THEN 1 END)";
/// Dismissals credited to the batter on strike, not run-outs of the partner.
const DISMISSALS: &str =
    "COUNT(CASE WHEN is_wicket = 1 AND player_out = batter_full_name THEN 1 END)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSql {
    /// Human-readable heading for the presentation layer.
    pub title: String,
    /// Either a complete SELECT/WITH statement (with a leading title
    /// comment) or a comment-only placeholder.
    pub sql: String,
}

impl GeneratedSql {
    fn statement(title: impl Into<String>, body: String) -> Self {
        let title = title.into();
        Self {
            sql: format!("-- {}\n{}", title, body),
            title,
        }
    }

    fn placeholder(title: impl Into<String>, reason: &str) -> Self {
        Self {
            title: title.into(),
            sql: format!("-- {}", reason),
        }
    }

    /// The statement with leading comment lines stripped, or `None` for a
    /// placeholder. Callers must check this before executing.
    pub fn executable(&self) -> Option<&str> {
        let body = self.sql.lines().find(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })?;
        let offset = self.sql.find(body)?;
        Some(self.sql[offset..].trim())
    }

    pub fn is_placeholder(&self) -> bool {
        self.executable().is_none()
    }
}

/// Double every single quote so names like O'Brien cannot break out of a
/// string literal.
fn escape(name: &str) -> String {
    name.replace('\'', "''")
}

fn quoted_list(values: &[String]) -> String {
    values.iter().map(|v| format!("'{}'", escape(v))).join(", ")
}

fn strike_rate_expr() -> String {
    format!(
        "ROUND(CASE WHEN {vb} > 0 THEN SUM(runs_batter) * 100.0 / {vb} ELSE 0 END, 2)",
        vb = VALID_BALLS
    )
}

fn batting_average_expr() -> String {
    format!("ROUND(SUM(runs_batter) * 1.0 / NULLIF({}, 0), 2)", DISMISSALS)
}

fn economy_expr() -> String {
    format!(
        "ROUND(CASE WHEN {vb} > 0 THEN SUM(runs_total) * 6.0 / {vb} ELSE 0 END, 2)",
        vb = VALID_BALLS
    )
}

fn bowling_average_expr() -> String {
    format!("ROUND(SUM(runs_total) * 1.0 / NULLIF({}, 0), 2)", WICKETS)
}

fn boundary_percentage_expr() -> String {
    format!(
        "ROUND(CASE WHEN {vb} > 0 THEN ({fours} + {sixes}) * 100.0 / {vb} ELSE 0 END, 2)",
        vb = VALID_BALLS,
        fours = FOURS,
        sixes = SIXES
    )
}

/// Shared WHERE fragments for the current record. Season, phase, innings and
/// chase constraints read the same columns in every template.
fn shared_predicates(record: &AnalysisRecord) -> Vec<String> {
    let mut predicates = Vec::new();
    if !record.entities.seasons.is_empty() {
        predicates.push(format!(
            "season IN ({})",
            quoted_list(&record.entities.seasons)
        ));
    }
    if let Some((start, end)) = record.filters.over_range {
        predicates.push(format!("over_col BETWEEN {} AND {}", start, end));
    }
    if let Some(innings) = record.filters.innings {
        predicates.push(format!("innings = {}", innings));
    }
    if let Some(target) = record.filters.min_target {
        predicates.push(format!("runs_target >= {}", target));
    }
    predicates
}

fn bowling_type_predicate(filters: &ExtractedFilters) -> Option<String> {
    filters
        .bowling_type
        .map(|bt| format!("bowling_type LIKE '%{}%'", bt.column_value()))
}

fn batting_style_predicate(filters: &ExtractedFilters) -> Option<String> {
    filters
        .batting_style
        .map(|style| format!("bat_hand = '{}'", style.column_value()))
}

fn phase_suffix(filters: &ExtractedFilters) -> String {
    match (filters.phase, filters.over_range) {
        (Some(Phase::Custom), Some((start, end))) => format!(" in overs {}-{}", start, end),
        (Some(phase), _) => format!(" in the {}", phase.label()),
        _ => String::new(),
    }
}

pub struct SqlSynthesizer {
    config: SynthesisConfig,
}

impl SqlSynthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn synthesize(&self, record: &AnalysisRecord) -> GeneratedSql {
        match record.intent.kind {
            IntentKind::Matchup => self.matchup(record),
            IntentKind::EntryPointAnalysis => self.entry_point(record),
            IntentKind::Partnership => self.partnership(record),
            IntentKind::TopPerformers => self.top_performers(record),
            IntentKind::PhaseAnalysis => self.phase_analysis(record),
            IntentKind::BasicStats => self.basic_stats(record),
        }
    }

    // ---- basic stats ----------------------------------------------------

    fn basic_stats(&self, record: &AnalysisRecord) -> GeneratedSql {
        let players = &record.entities.players;
        let teams = &record.entities.teams;

        if players.is_empty() {
            if let Some(team) = teams.first() {
                return self.team_stats(team, record);
            }
            return GeneratedSql::placeholder(
                "Basic stats",
                "No player or team specified; cannot build a stats query.",
            );
        }

        let player = &players[0];
        let bowling_framing = record.metrics.iter().any(Metric::is_bowling)
            || ["bowl", "wicket", "economy"]
                .iter()
                .any(|w| record.raw_query.to_lowercase().contains(w))
            || (record.filters.batting_style.is_some() && record.filters.bowling_type.is_none());

        if bowling_framing {
            self.player_bowling_stats(player, record)
        } else {
            self.player_batting_stats(player, record)
        }
    }

    fn player_batting_stats(&self, player: &str, record: &AnalysisRecord) -> GeneratedSql {
        let mut predicates = vec![format!("batter_full_name = '{}'", escape(player))];
        predicates.extend(shared_predicates(record));
        predicates.extend(bowling_type_predicate(&record.filters));

        let title = format!("BATTING STATS: {}{}", player, phase_suffix(&record.filters));
        let body = format!(
            "SELECT\n    batter_full_name AS player,\n    COUNT(DISTINCT season) AS seasons_played,\n    COUNT(DISTINCT match_id) AS matches_played,\n    {vb} AS balls_faced,\n    SUM(runs_batter) AS total_runs,\n    {fours} AS fours,\n    {sixes} AS sixes,\n    COUNT(CASE WHEN runs_batter = 0 AND valid_ball = 1 THEN 1 END) AS dots,\n    {dismissals} AS dismissals,\n    {sr} AS strike_rate,\n    {avg} AS batting_average,\n    {boundary} AS boundary_percentage\nFROM {table}\nWHERE {predicates}\nGROUP BY batter_full_name",
            vb = VALID_BALLS,
            fours = FOURS,
            sixes = SIXES,
            dismissals = DISMISSALS,
            sr = strike_rate_expr(),
            avg = batting_average_expr(),
            boundary = boundary_percentage_expr(),
            table = BALL_BY_BALL_TABLE,
            predicates = predicates.join("\n  AND "),
        );
        GeneratedSql::statement(title, body)
    }

    fn player_bowling_stats(&self, player: &str, record: &AnalysisRecord) -> GeneratedSql {
        let mut predicates = vec![format!("bowler_full_name = '{}'", escape(player))];
        predicates.extend(shared_predicates(record));
        predicates.extend(batting_style_predicate(&record.filters));

        let versus = record
            .filters
            .batting_style
            .map(|style| format!(" vs {}", style.column_value()))
            .unwrap_or_default();
        let title = format!(
            "BOWLING STATS: {}{}{}",
            player,
            versus,
            phase_suffix(&record.filters)
        );
        let body = format!(
            "SELECT\n    bowler_full_name AS player,\n    COUNT(DISTINCT season) AS seasons_played,\n    COUNT(DISTINCT match_id) AS matches_played,\n    {vb} AS balls_bowled,\n    ROUND({vb} / 6.0, 1) AS overs_bowled,\n    SUM(runs_total) AS runs_conceded,\n    {wickets} AS wickets_taken,\n    {economy} AS economy_rate,\n    {avg} AS bowling_average,\n    ROUND({vb} * 1.0 / NULLIF({wickets}, 0), 2) AS bowling_strike_rate,\n    COUNT(CASE WHEN runs_total = 0 AND valid_ball = 1 THEN 1 END) AS dot_balls\nFROM {table}\nWHERE {predicates}\nGROUP BY bowler_full_name",
            vb = VALID_BALLS,
            wickets = WICKETS,
            economy = economy_expr(),
            avg = bowling_average_expr(),
            table = BALL_BY_BALL_TABLE,
            predicates = predicates.join("\n  AND "),
        );
        GeneratedSql::statement(title, body)
    }

    fn team_stats(&self, team: &str, record: &AnalysisRecord) -> GeneratedSql {
        let mut predicates = vec![format!("batting_team = '{}'", escape(team))];
        predicates.extend(shared_predicates(record));

        let title = format!("TEAM STATS: {}", team);
        let body = format!(
            "SELECT\n    batting_team AS team,\n    COUNT(DISTINCT match_id) AS matches_played,\n    COUNT(DISTINCT CASE WHEN winner = batting_team THEN match_id END) AS wins,\n    COUNT(DISTINCT season) AS seasons_active,\n    SUM(runs_batter) AS total_runs_scored,\n    {fours} AS total_fours,\n    {sixes} AS total_sixes\nFROM {table}\nWHERE {predicates}\nGROUP BY batting_team",
            fours = FOURS,
            sixes = SIXES,
            table = BALL_BY_BALL_TABLE,
            predicates = predicates.join("\n  AND "),
        );
        GeneratedSql::statement(title, body)
    }

    // ---- top performers -------------------------------------------------

    fn top_performers(&self, record: &AnalysisRecord) -> GeneratedSql {
        match record.primary_metric() {
            Metric::Economy => self.top_economy(record),
            Metric::Wickets => self.top_wicket_takers(record),
            Metric::Sixes => self.top_six_hitters(record),
            _ => self.top_run_scorers(record),
        }
    }

    fn ranking_predicates(&self, record: &AnalysisRecord, bowler_view: bool) -> Vec<String> {
        let mut predicates = vec![if bowler_view {
            "bowler_full_name IS NOT NULL".to_string()
        } else {
            "batter_full_name IS NOT NULL".to_string()
        }];
        predicates.extend(shared_predicates(record));
        predicates.extend(bowling_type_predicate(&record.filters));
        if bowler_view {
            predicates.extend(batting_style_predicate(&record.filters));
        }
        predicates
    }

    fn top_economy(&self, record: &AnalysisRecord) -> GeneratedSql {
        let worst = record.filters.economy_direction == Some(EconomyDirection::Worst);
        let (direction, label) = if worst { ("DESC", "WORST") } else { ("ASC", "BEST") };

        let title = format!(
            "{} ECONOMY RATES{}",
            label,
            phase_suffix(&record.filters)
        );
        let body = format!(
            "SELECT\n    bowler_full_name,\n    {vb} AS balls_bowled,\n    SUM(runs_total) AS runs_conceded,\n    {wickets} AS wickets,\n    {economy} AS economy_rate\nFROM {table}\nWHERE {predicates}\nGROUP BY bowler_full_name\nHAVING {vb} >= {min_balls}\nORDER BY economy_rate {direction}\nLIMIT {limit}",
            vb = VALID_BALLS,
            wickets = WICKETS,
            economy = economy_expr(),
            table = BALL_BY_BALL_TABLE,
            predicates = self.ranking_predicates(record, true).join("\n  AND "),
            min_balls = self.config.min_sample_balls,
            direction = direction,
            limit = self.config.ranking_limit,
        );
        GeneratedSql::statement(title, body)
    }

    fn top_wicket_takers(&self, record: &AnalysisRecord) -> GeneratedSql {
        let title = format!("TOP WICKET TAKERS{}", phase_suffix(&record.filters));
        let body = format!(
            "SELECT\n    bowler_full_name,\n    COUNT(DISTINCT season) AS seasons_played,\n    {vb} AS balls_bowled,\n    {wickets} AS wickets_taken,\n    SUM(runs_total) AS runs_conceded,\n    {economy} AS economy_rate,\n    {avg} AS bowling_average\nFROM {table}\nWHERE {predicates}\nGROUP BY bowler_full_name\nHAVING {vb} >= {min_balls}\nORDER BY wickets_taken DESC\nLIMIT {limit}",
            vb = VALID_BALLS,
            wickets = WICKETS,
            economy = economy_expr(),
            avg = bowling_average_expr(),
            table = BALL_BY_BALL_TABLE,
            predicates = self.ranking_predicates(record, true).join("\n  AND "),
            min_balls = self.config.min_sample_balls,
            limit = self.config.ranking_limit,
        );
        GeneratedSql::statement(title, body)
    }

    fn top_six_hitters(&self, record: &AnalysisRecord) -> GeneratedSql {
        let title = format!("MOST SIXES{}", phase_suffix(&record.filters));
        let body = format!(
            "SELECT\n    batter_full_name,\n    {sixes} AS total_sixes,\n    SUM(runs_batter) AS total_runs,\n    {vb} AS balls_faced,\n    {sr} AS strike_rate\nFROM {table}\nWHERE {predicates}\nGROUP BY batter_full_name\nHAVING {vb} >= {min_balls}\nORDER BY total_sixes DESC\nLIMIT {limit}",
            sixes = SIXES,
            vb = VALID_BALLS,
            sr = strike_rate_expr(),
            table = BALL_BY_BALL_TABLE,
            predicates = self.ranking_predicates(record, false).join("\n  AND "),
            min_balls = self.config.min_sample_balls,
            limit = self.config.ranking_limit,
        );
        GeneratedSql::statement(title, body)
    }

    fn top_run_scorers(&self, record: &AnalysisRecord) -> GeneratedSql {
        // User-supplied run floors replace the default balls floor; both
        // keep degenerate two-ball samples out of the rankings.
        let mut having = match record.filters.min_runs {
            Some(min_runs) => format!("SUM(runs_batter) >= {}", min_runs),
            None => format!("{} >= {}", VALID_BALLS, self.config.min_sample_balls),
        };

        let (order_clause, title_suffix) = match record.filters.order_by {
            Some(OrderBy::Average) => {
                // Average is undefined at zero dismissals; keep those rows out
                // rather than sorting NULLs to the top.
                having.push_str(&format!(" AND {} > 0", DISMISSALS));
                ("batting_average DESC", " (by average)")
            }
            Some(OrderBy::StrikeRate) => ("strike_rate DESC", " (by strike rate)"),
            _ => ("total_runs DESC", ""),
        };

        let title = format!(
            "TOP RUN SCORERS{}{}",
            phase_suffix(&record.filters),
            title_suffix
        );
        let body = format!(
            "SELECT\n    batter_full_name,\n    SUM(runs_batter) AS total_runs,\n    {vb} AS balls_faced,\n    {sr} AS strike_rate,\n    {avg} AS batting_average,\n    {fours} AS fours,\n    {sixes} AS sixes\nFROM {table}\nWHERE {predicates}\nGROUP BY batter_full_name\nHAVING {having}\nORDER BY {order_clause}\nLIMIT {limit}",
            vb = VALID_BALLS,
            sr = strike_rate_expr(),
            avg = batting_average_expr(),
            fours = FOURS,
            sixes = SIXES,
            table = BALL_BY_BALL_TABLE,
            predicates = self.ranking_predicates(record, false).join("\n  AND "),
            having = having,
            order_clause = order_clause,
            limit = self.config.ranking_limit,
        );
        GeneratedSql::statement(title, body)
    }

    // ---- phase analysis -------------------------------------------------

    /// A named player gets their profile scoped to the phase; otherwise the
    /// phase gets a top-scorer leaderboard.
    fn phase_analysis(&self, record: &AnalysisRecord) -> GeneratedSql {
        if !record.entities.players.is_empty() {
            return self.basic_stats(record);
        }
        self.top_run_scorers(record)
    }

    // ---- matchup --------------------------------------------------------

    fn matchup(&self, record: &AnalysisRecord) -> GeneratedSql {
        let players = &record.entities.players;
        let teams = &record.entities.teams;

        match record.intent.special_analysis {
            Some(SpecialAnalysis::TeamVsTeam) if teams.len() >= 2 => {
                self.team_vs_team(&teams[0], &teams[1], record)
            }
            Some(SpecialAnalysis::PlayerVsBowlingType) if !players.is_empty() => {
                self.player_vs_bowling_type(&players[0], record)
            }
            _ if players.len() >= 2 => self.player_vs_player(&players[0], &players[1], record),
            _ => GeneratedSql::placeholder(
                "Matchup",
                "Could not resolve two players or two teams for a matchup.",
            ),
        }
    }

    /// First player reads as the batter, second as the bowler.
    fn player_vs_player(&self, batter: &str, bowler: &str, record: &AnalysisRecord) -> GeneratedSql {
        let mut predicates = vec![
            format!("batter_full_name = '{}'", escape(batter)),
            format!("bowler_full_name = '{}'", escape(bowler)),
        ];
        predicates.extend(shared_predicates(record));

        let title = format!("MATCHUP: {} vs {}", batter, bowler);
        let body = format!(
            "SELECT\n    batter_full_name AS batter,\n    bowler_full_name AS bowler,\n    {vb} AS balls_faced,\n    SUM(runs_batter) AS runs_scored,\n    {fours} AS fours,\n    {sixes} AS sixes,\n    {dismissals} AS dismissals,\n    {sr} AS strike_rate,\n    {avg} AS average_per_dismissal\nFROM {table}\nWHERE {predicates}\nGROUP BY batter_full_name, bowler_full_name",
            vb = VALID_BALLS,
            fours = FOURS,
            sixes = SIXES,
            dismissals = DISMISSALS,
            sr = strike_rate_expr(),
            avg = batting_average_expr(),
            table = BALL_BY_BALL_TABLE,
            predicates = predicates.join("\n  AND "),
        );
        GeneratedSql::statement(title, body)
    }

    /// Ball rows repeat per innings, so match facts are deduplicated into a
    /// CTE keyed by match_id before any counting.
    fn team_vs_team(&self, team1: &str, team2: &str, record: &AnalysisRecord) -> GeneratedSql {
        let t1 = escape(team1);
        let t2 = escape(team2);

        let mut predicates = vec![format!(
            "batting_team IN ('{t1}', '{t2}') AND bowling_team IN ('{t1}', '{t2}')",
            t1 = t1,
            t2 = t2
        )];
        predicates.extend(shared_predicates(record));

        let title = format!("HEAD TO HEAD: {} vs {}", team1, team2);
        let body = format!(
            "WITH match_results AS (\n    SELECT\n        match_id,\n        season,\n        winner,\n        batting_team,\n        MAX(team_runs) AS innings_score\n    FROM {table}\n    WHERE {predicates}\n    GROUP BY match_id, season, winner, batting_team\n)\nSELECT\n    '{t1}' AS team1,\n    '{t2}' AS team2,\n    COUNT(DISTINCT match_id) AS total_matches,\n    COUNT(DISTINCT CASE WHEN winner = '{t1}' THEN match_id END) AS team1_wins,\n    COUNT(DISTINCT CASE WHEN winner = '{t2}' THEN match_id END) AS team2_wins,\n    COUNT(DISTINCT season) AS seasons_played,\n    ROUND(AVG(CASE WHEN batting_team = '{t1}' THEN innings_score END), 1) AS team1_avg_score,\n    ROUND(AVG(CASE WHEN batting_team = '{t2}' THEN innings_score END), 1) AS team2_avg_score,\n    MAX(CASE WHEN batting_team = '{t1}' THEN innings_score END) AS team1_highest_score,\n    MAX(CASE WHEN batting_team = '{t2}' THEN innings_score END) AS team2_highest_score\nFROM match_results",
            table = BALL_BY_BALL_TABLE,
            predicates = predicates.join("\n      AND "),
            t1 = t1,
            t2 = t2,
        );
        GeneratedSql::statement(title, body)
    }

    fn player_vs_bowling_type(&self, player: &str, record: &AnalysisRecord) -> GeneratedSql {
        let bowling_type = match record.filters.bowling_type {
            Some(bt) => bt,
            None => {
                return GeneratedSql::placeholder(
                    "Matchup",
                    "No bowling type found for a player-vs-bowling-type matchup.",
                )
            }
        };

        let mut predicates = vec![
            format!("batter_full_name = '{}'", escape(player)),
            format!("bowling_type LIKE '%{}%'", bowling_type.column_value()),
        ];
        predicates.extend(shared_predicates(record));

        let title = format!(
            "MATCHUP: {} vs {} bowling",
            player,
            bowling_type.column_value()
        );
        let body = format!(
            "SELECT\n    batter_full_name,\n    '{bt}' AS bowling_type,\n    {vb} AS balls_faced,\n    SUM(runs_batter) AS runs_scored,\n    {fours} AS fours,\n    {sixes} AS sixes,\n    {dismissals} AS dismissals,\n    {sr} AS strike_rate,\n    COUNT(CASE WHEN runs_batter = 0 AND valid_ball = 1 THEN 1 END) AS dots\nFROM {table}\nWHERE {predicates}\nGROUP BY batter_full_name",
            bt = bowling_type.column_value(),
            vb = VALID_BALLS,
            fours = FOURS,
            sixes = SIXES,
            dismissals = DISMISSALS,
            sr = strike_rate_expr(),
            table = BALL_BY_BALL_TABLE,
            predicates = predicates.join("\n  AND "),
        );
        GeneratedSql::statement(title, body)
    }

    // ---- partnership ----------------------------------------------------

    fn partnership(&self, record: &AnalysisRecord) -> GeneratedSql {
        let players = &record.entities.players;

        if players.len() >= 2 {
            return self.partnership_pair(&players[0], &players[1], record);
        }
        if players.len() == 1 {
            return GeneratedSql::placeholder(
                "Partnership",
                "A partnership needs two players; only one was recognized.",
            );
        }
        self.partnership_leaderboard(record)
    }

    fn partnership_pair(&self, p1: &str, p2: &str, record: &AnalysisRecord) -> GeneratedSql {
        let mut predicates = vec![
            format!("batting_partners LIKE '%{}%'", escape(p1)),
            format!("batting_partners LIKE '%{}%'", escape(p2)),
            "batting_partners IS NOT NULL".to_string(),
        ];
        predicates.extend(shared_predicates(record));

        let title = format!("PARTNERSHIP: {} & {}", p1, p2);
        let body = format!(
            "SELECT\n    batting_partners,\n    COUNT(DISTINCT match_id) AS matches_together,\n    COUNT(*) AS balls_together,\n    SUM(runs_total) AS partnership_runs,\n    COUNT(CASE WHEN is_four = 1 OR is_six = 1 THEN 1 END) AS boundaries\nFROM {table}\nWHERE {predicates}\nGROUP BY batting_partners\nORDER BY partnership_runs DESC",
            table = BALL_BY_BALL_TABLE,
            predicates = predicates.join("\n  AND "),
        );
        GeneratedSql::statement(title, body)
    }

    fn partnership_leaderboard(&self, record: &AnalysisRecord) -> GeneratedSql {
        let mut predicates = vec![
            "batting_partners IS NOT NULL".to_string(),
            "batting_partners != ''".to_string(),
        ];
        predicates.extend(shared_predicates(record));

        let title = "TOP PARTNERSHIPS".to_string();
        let body = format!(
            "SELECT\n    batting_partners,\n    COUNT(DISTINCT match_id) AS matches,\n    SUM(runs_total) AS total_runs,\n    COUNT(CASE WHEN is_four = 1 OR is_six = 1 THEN 1 END) AS boundaries\nFROM {table}\nWHERE {predicates}\nGROUP BY batting_partners\nHAVING COUNT(*) >= {min_balls}\nORDER BY total_runs DESC\nLIMIT {limit}",
            table = BALL_BY_BALL_TABLE,
            predicates = predicates.join("\n  AND "),
            min_balls = self.config.min_partnership_balls,
            limit = self.config.leaderboard_limit,
        );
        GeneratedSql::statement(title, body)
    }

    // ---- entry point ----------------------------------------------------

    fn entry_point(&self, record: &AnalysisRecord) -> GeneratedSql {
        match record.entities.players.first() {
            Some(player) => self.entry_point_for_player(player, record),
            None => self.entry_point_leaderboard(record),
        }
    }

    fn entry_point_for_player(&self, player: &str, record: &AnalysisRecord) -> GeneratedSql {
        let mut predicates = vec![format!("next_batter = '{}'", escape(player))];
        predicates.extend(shared_predicates(record));

        let title = format!("ENTRY POINT ANALYSIS: {}", player);
        let body = format!(
            "SELECT\n    '{player}' AS player,\n    COUNT(DISTINCT match_id) AS matches_as_next_batter,\n    COUNT(*) AS entry_situations,\n    ROUND(AVG(team_runs), 1) AS avg_team_score_at_entry,\n    ROUND(AVG(team_wickets), 1) AS avg_wickets_at_entry,\n    ROUND(AVG(over_col + ball / 6.0), 2) AS avg_entry_over,\n    COUNT(CASE WHEN team_wickets >= 5 THEN 1 END) AS crisis_entries,\n    COUNT(CASE WHEN over_col >= 16 THEN 1 END) AS death_over_entries,\n    ROUND(AVG(required_rr), 2) AS avg_required_rate_at_entry,\n    ROUND(AVG(current_rr), 2) AS avg_current_rate_at_entry\nFROM {table}\nWHERE {predicates}",
            player = escape(player),
            table = BALL_BY_BALL_TABLE,
            predicates = predicates.join("\n  AND "),
        );
        GeneratedSql::statement(title, body)
    }

    fn entry_point_leaderboard(&self, record: &AnalysisRecord) -> GeneratedSql {
        let mut predicates = vec![
            "next_batter IS NOT NULL".to_string(),
            "next_batter != ''".to_string(),
        ];
        predicates.extend(shared_predicates(record));

        let title = "ENTRY POINT ANALYSIS".to_string();
        let body = format!(
            "SELECT\n    next_batter,\n    COUNT(DISTINCT match_id) AS matches,\n    COUNT(*) AS entry_opportunities,\n    ROUND(AVG(team_runs), 1) AS avg_team_score_at_entry,\n    ROUND(AVG(team_wickets), 1) AS avg_wickets_at_entry,\n    ROUND(AVG(over_col + ball / 6.0), 2) AS avg_entry_over\nFROM {table}\nWHERE {predicates}\nGROUP BY next_batter\nHAVING COUNT(*) >= {min_entries}\nORDER BY entry_opportunities DESC\nLIMIT {limit}",
            table = BALL_BY_BALL_TABLE,
            predicates = predicates.join("\n  AND "),
            min_entries = self.config.min_entry_situations,
            limit = self.config.leaderboard_limit,
        );
        GeneratedSql::statement(title, body)
    }
}
