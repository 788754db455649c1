//! Type-safe wrappers for the ids and values the CLI passes around.

use crate::error::{Result, SyncError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for ESPN team ids.
///
/// Keeps team ids from being mixed up with the other numeric ids that
/// flow through the collector.
///
/// # Examples
///
/// ```rust
/// use cbb_sync::TeamId;
///
/// let team_id = TeamId::new(52);
/// assert_eq!(team_id.as_u32(), 52);
/// assert_eq!(team_id.to_string(), "52");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u32);

impl TeamId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TeamId {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Type-safe wrapper for ESPN athlete ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl PlayerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-safe wrapper for ESPN event (game) ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl GameId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GameId {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Type-safe wrapper for season years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Season(pub u16);

impl Season {
    pub fn new(year: u16) -> Self {
        Self(year)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Default for Season {
    fn default() -> Self {
        use chrono::Datelike;
        Self(chrono::Utc::now().year() as u16)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Season {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.parse()?))
    }
}

/// Which persistence backend a run writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Append-only CSV files under the output directory (default).
    Csv,
    /// Local SQLite database.
    Sqlite,
    /// Batched REST upserts against a PostgREST-style proxy.
    Rest,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Csv => write!(f, "csv"),
            BackendKind::Sqlite => write!(f, "sqlite"),
            BackendKind::Rest => write!(f, "rest"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_id_round_trips_through_strings() {
        let id: TeamId = " 2306 ".parse().unwrap();
        assert_eq!(id, TeamId::new(2306));
        assert_eq!(id.to_string(), "2306");
    }

    #[test]
    fn team_id_rejects_garbage() {
        assert!("abc".parse::<TeamId>().is_err());
        assert!("".parse::<TeamId>().is_err());
    }

    #[test]
    fn game_id_parses_large_values() {
        let id: GameId = "401705432".parse().unwrap();
        assert_eq!(id.as_u64(), 401705432);
    }

    #[test]
    fn season_default_is_plausible() {
        let season = Season::default();
        assert!(season.as_u16() >= 2025);
    }
}
