//! Canonical names for players and teams.
//!
//! The catalog is loaded once from the backing store at startup and held as
//! an immutable snapshot for the life of the process. Reload builds a fresh
//! catalog and swaps the published `Arc`, so in-flight requests keep the
//! snapshot they started with.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::info;

use crate::error::{AnalyticsError, Result};

/// Where canonical names come from. Implemented over Postgres in the
/// executor module; tests supply in-memory fixtures.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn all_player_names(&self) -> Result<Vec<String>>;
    async fn all_team_names(&self) -> Result<Vec<String>>;
}

/// Immutable snapshot of every known canonical name plus alias tables.
#[derive(Debug, Clone)]
pub struct CanonicalCatalog {
    players: Vec<String>,
    player_set: HashSet<String>,
    teams: Vec<String>,
    /// Lowercased alias or nickname -> canonical player name.
    player_aliases: HashMap<String, String>,
    /// Lowercased abbreviation or city -> canonical franchise name.
    team_aliases: HashMap<String, String>,
}

impl CanonicalCatalog {
    pub fn new(players: Vec<String>, teams: Vec<String>) -> Self {
        let player_set = players.iter().cloned().collect();
        let player_aliases = default_player_aliases();
        let team_aliases = default_team_aliases();
        Self {
            players,
            player_set,
            teams,
            player_aliases,
            team_aliases,
        }
    }

    /// Load from the backing store. Fatal on failure or on an empty player
    /// list: an empty catalog silently turns every fuzzy match into "no
    /// match", which is worse than refusing to start.
    pub async fn load(source: &dyn CatalogSource) -> Result<Self> {
        let players = source.all_player_names().await?;
        let teams = source.all_team_names().await?;

        if players.is_empty() {
            return Err(AnalyticsError::Catalog(
                "catalog source returned no player names".to_string(),
            ));
        }

        info!(players = players.len(), teams = teams.len(), "catalog loaded");
        Ok(Self::new(players, teams))
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn is_known_player(&self, name: &str) -> bool {
        self.player_set.contains(name)
    }

    pub fn player_aliases(&self) -> &HashMap<String, String> {
        &self.player_aliases
    }

    pub fn team_aliases(&self) -> &HashMap<String, String> {
        &self.team_aliases
    }
}

/// Shared handle with copy-and-swap reload semantics.
pub struct CatalogHandle {
    inner: RwLock<Arc<CanonicalCatalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: CanonicalCatalog) -> Self {
        Self {
            inner: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Current snapshot. Cheap to clone; callers keep it for the whole
    /// request so a concurrent reload never changes what they see.
    pub fn snapshot(&self) -> Arc<CanonicalCatalog> {
        self.inner.read().expect("catalog lock poisoned").clone()
    }

    /// Build a new catalog from the source, then atomically publish it.
    pub async fn reload(&self, source: &dyn CatalogSource) -> Result<()> {
        let fresh = CanonicalCatalog::load(source).await?;
        let mut guard = self.inner.write().expect("catalog lock poisoned");
        *guard = Arc::new(fresh);
        info!("catalog reloaded");
        Ok(())
    }
}

/// Curated nicknames and short forms for players that dominate questions.
/// Checked before any fuzzy matching.
fn default_player_aliases() -> HashMap<String, String> {
    let entries: &[(&str, &str)] = &[
        ("virat", "Virat Kohli"),
        ("kohli", "Virat Kohli"),
        ("vk", "Virat Kohli"),
        ("rohit", "Rohit Sharma"),
        ("hitman", "Rohit Sharma"),
        ("dhoni", "MS Dhoni"),
        ("msd", "MS Dhoni"),
        ("captain cool", "MS Dhoni"),
        ("bumrah", "Jasprit Bumrah"),
        ("jasprit", "Jasprit Bumrah"),
        ("boom boom", "Jasprit Bumrah"),
        ("abd", "AB de Villiers"),
        ("de villiers", "AB de Villiers"),
        ("mr 360", "AB de Villiers"),
        ("gayle", "Chris Gayle"),
        ("universe boss", "Chris Gayle"),
        ("warner", "David Warner"),
        ("raina", "Suresh Raina"),
        ("jadeja", "Ravindra Jadeja"),
        ("sir jadeja", "Ravindra Jadeja"),
        ("ravindra", "Ravindra Jadeja"),
        ("rashid", "Rashid Khan"),
        ("rashid khan", "Rashid Khan"),
        ("chahal", "Yuzvendra Chahal"),
        ("yuzvendra", "Yuzvendra Chahal"),
        ("malinga", "Lasith Malinga"),
        ("lasith", "Lasith Malinga"),
        ("kl rahul", "KL Rahul"),
        ("rahul", "KL Rahul"),
        ("pollard", "Kieron Pollard"),
    ];
    entries
        .iter()
        .map(|(alias, name)| (alias.to_string(), name.to_string()))
        .collect()
}

/// Franchise abbreviations and city names. Exact lookup only; team names
/// are too short and too similar for fuzzy matching to be safe.
fn default_team_aliases() -> HashMap<String, String> {
    let entries: &[(&str, &str)] = &[
        ("csk", "Chennai Super Kings"),
        ("chennai", "Chennai Super Kings"),
        ("mi", "Mumbai Indians"),
        ("mumbai", "Mumbai Indians"),
        ("rcb", "Royal Challengers Bangalore"),
        ("bangalore", "Royal Challengers Bangalore"),
        ("royal challengers", "Royal Challengers Bangalore"),
        ("kkr", "Kolkata Knight Riders"),
        ("kolkata", "Kolkata Knight Riders"),
        ("dc", "Delhi Capitals"),
        ("delhi", "Delhi Capitals"),
        ("rr", "Rajasthan Royals"),
        ("rajasthan", "Rajasthan Royals"),
        ("pbks", "Punjab Kings"),
        ("punjab", "Punjab Kings"),
        ("srh", "Sunrisers Hyderabad"),
        ("hyderabad", "Sunrisers Hyderabad"),
        ("gt", "Gujarat Titans"),
        ("gujarat", "Gujarat Titans"),
        ("lsg", "Lucknow Super Giants"),
        ("lucknow", "Lucknow Super Giants"),
    ];
    entries
        .iter()
        .map(|(alias, name)| (alias.to_string(), name.to_string()))
        .collect()
}
