//! Runtime configuration for the analytics pipeline.
//!
//! The minimum-sample thresholds here mirror the heuristics the analysts
//! settled on for T20 data; they are plain configuration, not invariants,
//! and callers may override any of them.

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

/// Denormalized ball-by-ball table every generated statement reads from.
pub const BALL_BY_BALL_TABLE: &str = "ipl_data_complete";

/// First IPL season with ball-by-ball coverage.
pub const FIRST_SEASON: u16 = 2008;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Season that "this season" resolves to; "last season" is one less.
    pub current_season: u16,

    /// Postgres connection string for the executor and catalog source.
    pub database_url: Option<String>,

    /// Sample-size and presentation knobs for SQL synthesis.
    pub synthesis: SynthesisConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            current_season: 2024,
            database_url: None,
            synthesis: SynthesisConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Build config from the environment (after dotenv has run).
    ///
    /// `DATABASE_URL` is optional here; the executor rejects a missing URL
    /// at connection time, not at config time, so the offline pipeline
    /// (analyze + synthesize only) stays usable.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(season) = std::env::var("IPL_CURRENT_SEASON") {
            config.current_season = season.parse().map_err(|_| {
                AnalyticsError::Config(format!("invalid IPL_CURRENT_SEASON: {}", season))
            })?;
            if config.current_season < FIRST_SEASON {
                return Err(AnalyticsError::Config(format!(
                    "IPL_CURRENT_SEASON {} predates {}",
                    config.current_season, FIRST_SEASON
                )));
            }
        }

        config.database_url = std::env::var("DATABASE_URL").ok();

        Ok(config)
    }
}

/// Tunable thresholds used by the SQL synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Minimum valid balls faced/bowled before a player appears in rankings.
    pub min_sample_balls: u32,

    /// Minimum balls together before a partnership appears in leaderboards.
    pub min_partnership_balls: u32,

    /// Minimum entry situations before a batter appears in entry leaderboards.
    pub min_entry_situations: u32,

    /// Row cap for ranking queries.
    pub ranking_limit: u32,

    /// Row cap for leaderboard variants (partnerships, entry points).
    pub leaderboard_limit: u32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            min_sample_balls: 50,
            min_partnership_balls: 100,
            min_entry_situations: 10,
            ranking_limit: 15,
            leaderboard_limit: 20,
        }
    }
}
