//! Flat record types shared by all three persistence backends.
//!
//! These serialize directly into REST upsert bodies, so field names match
//! the relational column names.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cli::types::{GameId, PlayerId, TeamId};

#[derive(Debug, Clone, Serialize)]
pub struct TeamRecord {
    pub team_id: TeamId,
    pub slug: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub abbreviation: Option<String>,
    pub display_name: Option<String>,
    pub short_display_name: Option<String>,
    pub color: Option<String>,
    pub alternate_color: Option<String>,
    pub logo_url: Option<String>,
    pub conference_id: Option<String>,
    pub conference_name: Option<String>,
}

impl TeamRecord {
    /// Minimal record for teams first seen in a box score.
    pub fn stub(team_id: TeamId, display_name: Option<String>) -> Self {
        Self {
            team_id,
            slug: None,
            location: None,
            name: display_name.clone(),
            nickname: None,
            abbreviation: None,
            display_name,
            short_display_name: None,
            color: None,
            alternate_color: None,
            logo_url: None,
            conference_id: None,
            conference_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub short_name: Option<String>,
    pub short_name_abbr: Option<String>,
    pub jersey: Option<String>,
    pub position: Option<String>,
    pub height: Option<f64>,
    pub display_height: Option<String>,
    pub weight: Option<f64>,
    pub experience: Option<String>,
    pub headshot: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterRecord {
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub season: u16,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_id: GameId,
    pub game_date: Option<NaiveDate>,
    pub game_datetime: Option<DateTime<Utc>>,
    pub season: Option<u16>,
    pub home_team_id: Option<TeamId>,
    pub home_team_name: Option<String>,
    pub away_team_id: Option<TeamId>,
    pub away_team_name: Option<String>,
    pub status: Option<String>,
    pub neutral_site: Option<bool>,
}

/// One box-score line: counting stats for a player in a game.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerGameRecord {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub game_date: Option<NaiveDate>,
    pub team_id: TeamId,
    pub pts: i64,
    pub fgm: i64,
    pub fga: i64,
    pub tpm: i64,
    pub tpa: i64,
    pub ftm: i64,
    pub fta: i64,
    pub reb: i64,
    pub ast: i64,
    pub turnovers: i64,
    pub stl: i64,
    pub blk: i64,
    pub oreb: i64,
    pub dreb: i64,
    pub pf: i64,
    pub minutes: f64,
    pub season: Option<u16>,
}

/// Per-team totals for a game, summed from the player lines (CSV backend).
#[derive(Debug, Clone, Serialize)]
pub struct TeamGameRecord {
    pub game_id: GameId,
    pub team_id: TeamId,
    pub team_name: Option<String>,
    pub game_date: Option<NaiveDate>,
    pub pts: i64,
    pub fgm: i64,
    pub fga: i64,
    pub tpm: i64,
    pub tpa: i64,
    pub ftm: i64,
    pub fta: i64,
    pub reb: i64,
    pub ast: i64,
    pub turnovers: i64,
    pub stl: i64,
    pub blk: i64,
    pub oreb: i64,
    pub dreb: i64,
    pub pf: i64,
    pub minutes: f64,
}

/// One play-by-play entry, keyed by `(game_id, play_index)` (CSV backend).
#[derive(Debug, Clone, Serialize)]
pub struct PlayRecord {
    pub game_id: GameId,
    pub play_index: u32,
    pub play_id: String,
    pub type_id: String,
    pub type_text: String,
    pub play_text: String,
    pub away_score: Option<i64>,
    pub home_score: Option<i64>,
    pub period: Option<u32>,
    pub period_display: String,
    pub clock: String,
    pub team_id: Option<TeamId>,
    /// Space-separated athlete ids of the participants.
    pub player_ids: String,
    pub coord_x: Option<f64>,
    pub coord_y: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FantasyTeamRecord {
    pub fantasy_team_id: u32,
    pub name: String,
    pub short_code: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FantasyTeamSeasonRecord {
    pub season: u16,
    pub fantasy_team_id: u32,
    pub draft_order: u32,
}

/// Watermark row for one run type (`roster`, `schedule`, `stats`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub run_type: String,
    pub last_run_at: DateTime<Utc>,
    pub last_game_date: Option<NaiveDate>,
    pub details: Option<String>,
}
