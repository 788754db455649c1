//! Append-only CSV backend.
//!
//! Each table is one file with a fixed header. Rows are never rewritten;
//! dedup happens up front by loading the existing key columns into a
//! [`KeySet`](crate::sync::KeySet) before appending.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::{ReaderBuilder, WriterBuilder};

use super::models::{
    GameRecord, PlayRecord, PlayerGameRecord, PlayerRecord, RosterRecord, TeamGameRecord,
    TeamRecord,
};
use crate::error::{Result, SyncError};
use crate::sync::{KeySet, SeenTracker};

pub const TEAMS_FILE: &str = "teams.csv";
pub const ROSTERS_FILE: &str = "rosters.csv";
pub const SCHEDULE_FILE: &str = "schedule.csv";
pub const PLAYER_STATS_FILE: &str = "player_stats.csv";
pub const TEAM_STATS_FILE: &str = "team_stats.csv";
pub const PLAYS_FILE: &str = "plays.csv";
pub const STATUS_LOG_FILE: &str = "status_log.csv";

pub const TEAMS_HEADER: &[&str] = &[
    "team_id",
    "slug",
    "location",
    "name",
    "nickname",
    "abbreviation",
    "display_name",
    "short_display_name",
    "color",
    "alternate_color",
    "logo_url",
    "conference_id",
    "conference_name",
];

pub const ROSTERS_HEADER: &[&str] = &[
    "team_id",
    "player_id",
    "season",
    "first_name",
    "last_name",
    "short_name",
    "jersey",
    "position",
    "height",
    "display_height",
    "weight",
    "experience",
    "headshot",
    "is_active",
];

pub const SCHEDULE_HEADER: &[&str] = &[
    "game_id",
    "game_date",
    "game_datetime",
    "season",
    "home_team_id",
    "home_team_name",
    "away_team_id",
    "away_team_name",
    "status",
    "neutral_site",
];

pub const PLAYER_STATS_HEADER: &[&str] = &[
    "game_id",
    "player_id",
    "game_date",
    "team_id",
    "pts",
    "fgm",
    "fga",
    "tpm",
    "tpa",
    "ftm",
    "fta",
    "reb",
    "ast",
    "turnovers",
    "stl",
    "blk",
    "oreb",
    "dreb",
    "pf",
    "minutes",
    "season",
];

pub const TEAM_STATS_HEADER: &[&str] = &[
    "game_id",
    "team_id",
    "team_name",
    "game_date",
    "pts",
    "fgm",
    "fga",
    "tpm",
    "tpa",
    "ftm",
    "fta",
    "reb",
    "ast",
    "turnovers",
    "stl",
    "blk",
    "oreb",
    "dreb",
    "pf",
    "minutes",
];

pub const PLAYS_HEADER: &[&str] = &[
    "game_id",
    "play_index",
    "play_id",
    "type_id",
    "type_text",
    "play_text",
    "away_score",
    "home_score",
    "period",
    "period_display",
    "clock",
    "team_id",
    "player_ids",
    "coord_x",
    "coord_y",
];

pub const STATUS_LOG_HEADER: &[&str] = &["logged_at", "run_type", "summary"];

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// One CSV file with a fixed header and composite-key dedup.
pub struct CsvTable {
    path: PathBuf,
    header: &'static [&'static str],
    key_cols: Vec<usize>,
}

impl CsvTable {
    /// Open a table in `out_dir`, writing the header if the file is new or
    /// empty. Key columns are header indexes used for dedup.
    pub fn open(out_dir: &Path, file: &str, header: &'static [&'static str], key_cols: &[usize]) -> Result<Self> {
        std::fs::create_dir_all(out_dir)?;
        let path = out_dir.join(file);

        let needs_header = match std::fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };
        if needs_header {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let mut writer = WriterBuilder::new().from_writer(file);
            writer.write_record(header)?;
            writer.flush()?;
        }

        Ok(Self {
            path,
            header,
            key_cols: key_cols.to_vec(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load existing composite keys so re-runs append nothing twice.
    ///
    /// Rejects a file whose header differs from the expected one: key
    /// column positions would otherwise silently point at the wrong data.
    pub fn load_keys(&self) -> Result<KeySet> {
        let mut keys = KeySet::new();
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(_) => return Ok(keys),
        };
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
        let found = reader.headers()?;
        if found.iter().ne(self.header.iter().copied()) {
            return Err(SyncError::Storage {
                message: format!(
                    "{}: header {:?} does not match expected {:?}",
                    self.path.display(),
                    found,
                    self.header
                ),
            });
        }
        for record in reader.records() {
            let record = record?;
            let key: Vec<String> = self
                .key_cols
                .iter()
                .filter_map(|&idx| record.get(idx))
                .map(|s| s.to_string())
                .collect();
            if key.len() == self.key_cols.len() {
                keys.mark_seen(&key);
            }
        }
        Ok(keys)
    }

    /// Append rows whose keys are unseen; returns how many were written.
    pub fn append_rows(&self, seen: &mut KeySet, rows: &[Vec<String>]) -> Result<usize> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().from_writer(file);
        let mut written = 0;
        for row in rows {
            debug_assert_eq!(row.len(), self.header.len());
            let key: Vec<String> = self
                .key_cols
                .iter()
                .filter_map(|&idx| row.get(idx))
                .cloned()
                .collect();
            if !seen.mark_seen(&key) {
                continue;
            }
            writer.write_record(row)?;
            written += 1;
        }
        writer.flush()?;
        Ok(written)
    }
}

/// Append one line to the status log; no dedup, it is a plain journal.
pub fn append_status_log(out_dir: &Path, run_type: &str, summary: &str) -> Result<()> {
    let table = CsvTable::open(out_dir, STATUS_LOG_FILE, STATUS_LOG_HEADER, &[])?;
    let file = OpenOptions::new().append(true).open(table.path())?;
    let mut writer = WriterBuilder::new().from_writer(file);
    writer.write_record([Utc::now().to_rfc3339().as_str(), run_type, summary])?;
    writer.flush()?;
    Ok(())
}

pub fn team_row(team: &TeamRecord) -> Vec<String> {
    vec![
        team.team_id.to_string(),
        opt(&team.slug),
        opt(&team.location),
        opt(&team.name),
        opt(&team.nickname),
        opt(&team.abbreviation),
        opt(&team.display_name),
        opt(&team.short_display_name),
        opt(&team.color),
        opt(&team.alternate_color),
        opt(&team.logo_url),
        opt(&team.conference_id),
        opt(&team.conference_name),
    ]
}

pub fn roster_row(player: &PlayerRecord, roster: &RosterRecord) -> Vec<String> {
    vec![
        roster.team_id.to_string(),
        roster.player_id.to_string(),
        roster.season.to_string(),
        opt(&player.first_name),
        opt(&player.last_name),
        opt(&player.short_name),
        opt(&player.jersey),
        opt(&player.position),
        opt(&player.height),
        opt(&player.display_height),
        opt(&player.weight),
        opt(&player.experience),
        opt(&player.headshot),
        opt(&player.is_active),
    ]
}

pub fn game_row(game: &GameRecord) -> Vec<String> {
    vec![
        game.game_id.to_string(),
        opt(&game.game_date),
        game.game_datetime
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default(),
        opt(&game.season),
        opt(&game.home_team_id),
        opt(&game.home_team_name),
        opt(&game.away_team_id),
        opt(&game.away_team_name),
        opt(&game.status),
        opt(&game.neutral_site),
    ]
}

pub fn player_stat_row(row: &PlayerGameRecord) -> Vec<String> {
    vec![
        row.game_id.to_string(),
        row.player_id.to_string(),
        opt(&row.game_date),
        row.team_id.to_string(),
        row.pts.to_string(),
        row.fgm.to_string(),
        row.fga.to_string(),
        row.tpm.to_string(),
        row.tpa.to_string(),
        row.ftm.to_string(),
        row.fta.to_string(),
        row.reb.to_string(),
        row.ast.to_string(),
        row.turnovers.to_string(),
        row.stl.to_string(),
        row.blk.to_string(),
        row.oreb.to_string(),
        row.dreb.to_string(),
        row.pf.to_string(),
        format!("{:.2}", row.minutes),
        opt(&row.season),
    ]
}

pub fn team_stat_row(row: &TeamGameRecord) -> Vec<String> {
    vec![
        row.game_id.to_string(),
        row.team_id.to_string(),
        opt(&row.team_name),
        opt(&row.game_date),
        row.pts.to_string(),
        row.fgm.to_string(),
        row.fga.to_string(),
        row.tpm.to_string(),
        row.tpa.to_string(),
        row.ftm.to_string(),
        row.fta.to_string(),
        row.reb.to_string(),
        row.ast.to_string(),
        row.turnovers.to_string(),
        row.stl.to_string(),
        row.blk.to_string(),
        row.oreb.to_string(),
        row.dreb.to_string(),
        row.pf.to_string(),
        format!("{:.2}", row.minutes),
    ]
}

pub fn play_row(play: &PlayRecord) -> Vec<String> {
    vec![
        play.game_id.to_string(),
        play.play_index.to_string(),
        play.play_id.clone(),
        play.type_id.clone(),
        play.type_text.clone(),
        play.play_text.clone(),
        opt(&play.away_score),
        opt(&play.home_score),
        opt(&play.period),
        play.period_display.clone(),
        play.clock.clone(),
        opt(&play.team_id),
        play.player_ids.clone(),
        opt(&play.coord_x),
        opt(&play.coord_y),
    ]
}
