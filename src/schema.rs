//! The fixed ball-by-ball schema the whole system queries against.
//!
//! One denormalized row per delivery. The synthesizer inlines column names
//! directly; this module carries the prose description handed to the LLM
//! fallback and the cricket notes that define derived rates.

/// Schema summary for prompt construction. Kept to the columns the
/// generated statements actually touch.
pub const SCHEMA_OVERVIEW: &str = r#"Table: ipl_data_complete (one row per delivery)
Columns:
- season (TEXT): IPL season, e.g. '2023'
- match_id (INTEGER): unique match identifier
- venue (TEXT): stadium name
- innings (INTEGER): 1 or 2
- over_col (INTEGER): over number, 1-20
- ball (INTEGER): ball number within the over
- batting_team (TEXT), bowling_team (TEXT)
- batter_full_name (TEXT), bowler_full_name (TEXT)
- runs_batter (INTEGER): runs off the bat this delivery
- runs_total (INTEGER): all runs this delivery including extras
- valid_ball (INTEGER): 1 if the delivery counts toward the over
- is_four (INTEGER), is_six (INTEGER), is_wicket (INTEGER): 0/1 flags
- player_out (TEXT): dismissed batter, NULL otherwise
- dismissal_type (TEXT)
- bat_hand (TEXT): 'LHB' or 'RHB'
- bowling_type (TEXT): contains 'pace' or 'spin'
- team_runs (INTEGER), team_wickets (INTEGER): team score at this delivery
- runs_target (INTEGER): chase target, second innings only
- required_rr (NUMERIC), current_rr (NUMERIC): run rates at this delivery
- next_batter (TEXT): batter due in at the fall of the next wicket
- batting_partners (TEXT): the two batters at the wicket, e.g. 'V Kohli & AB de Villiers'
- winner (TEXT): match winner

Cricket notes:
- Powerplay: over_col BETWEEN 1 AND 6; middle: 7-15; death: 16-20
- Strike rate: SUM(runs_batter) * 100.0 / COUNT(CASE WHEN valid_ball = 1 THEN 1 END)
- Batting average: SUM(runs_batter) / NULLIF(count of dismissals, 0)
- Economy rate: SUM(runs_total) * 6.0 / COUNT(CASE WHEN valid_ball = 1 THEN 1 END)
- Bowling average: SUM(runs_total) / NULLIF(count of wickets, 0)
- Guard every division against zero denominators with NULLIF or CASE"#;
