//! Database schema and connection management

use std::path::{Path, PathBuf};

use anyhow::Result;
use dirs::cache_dir;
use rusqlite::Connection;

use crate::config::DB_PATH_ENV_VAR;
use crate::error::SyncError;

/// Connection manager for the local SQLite backend.
pub struct SyncDatabase {
    pub(crate) conn: Connection,
}

impl SyncDatabase {
    /// Open (or create) the database and ensure tables exist.
    ///
    /// Path resolution: explicit argument, then the `CBB_SYNC_DB`
    /// environment variable, then the platform cache directory.
    pub fn new(path: Option<&Path>) -> Result<Self> {
        let db_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::database_path()?,
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// In-memory database for tests.
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Raw connection, for ad-hoc queries and test assertions.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn database_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(DB_PATH_ENV_VAR) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let cache_dir = cache_dir().ok_or_else(|| SyncError::Storage {
            message: "Could not determine cache directory".to_string(),
        })?;
        Ok(cache_dir.join("cbb-sync").join("cbb.db"))
    }

    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS teams (
                team_id INTEGER PRIMARY KEY,
                slug TEXT,
                location TEXT,
                name TEXT,
                nickname TEXT,
                abbreviation TEXT,
                display_name TEXT,
                short_display_name TEXT,
                color TEXT,
                alternate_color TEXT,
                logo_url TEXT,
                conference_id TEXT,
                conference_name TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS players (
                player_id INTEGER PRIMARY KEY,
                team_id INTEGER,
                first_name TEXT,
                last_name TEXT,
                short_name TEXT,
                short_name_abbr TEXT,
                jersey TEXT,
                position TEXT,
                height REAL,
                display_height TEXT,
                weight REAL,
                experience TEXT,
                headshot TEXT,
                is_active INTEGER,
                FOREIGN KEY (team_id) REFERENCES teams(team_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS team_rosters (
                team_id INTEGER NOT NULL,
                player_id INTEGER NOT NULL,
                season INTEGER NOT NULL,
                is_active INTEGER,
                PRIMARY KEY (team_id, player_id, season),
                FOREIGN KEY (team_id) REFERENCES teams(team_id),
                FOREIGN KEY (player_id) REFERENCES players(player_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS games (
                game_id INTEGER PRIMARY KEY,
                game_date TEXT,
                game_datetime TEXT,
                season INTEGER,
                home_team_id INTEGER,
                home_team_name TEXT,
                away_team_id INTEGER,
                away_team_name TEXT,
                status TEXT,
                neutral_site INTEGER
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS player_games (
                game_id INTEGER NOT NULL,
                player_id INTEGER NOT NULL,
                game_date TEXT,
                team_id INTEGER,
                pts INTEGER NOT NULL DEFAULT 0,
                fgm INTEGER NOT NULL DEFAULT 0,
                fga INTEGER NOT NULL DEFAULT 0,
                tpm INTEGER NOT NULL DEFAULT 0,
                tpa INTEGER NOT NULL DEFAULT 0,
                ftm INTEGER NOT NULL DEFAULT 0,
                fta INTEGER NOT NULL DEFAULT 0,
                reb INTEGER NOT NULL DEFAULT 0,
                ast INTEGER NOT NULL DEFAULT 0,
                turnovers INTEGER NOT NULL DEFAULT 0,
                stl INTEGER NOT NULL DEFAULT 0,
                blk INTEGER NOT NULL DEFAULT 0,
                oreb INTEGER NOT NULL DEFAULT 0,
                dreb INTEGER NOT NULL DEFAULT 0,
                pf INTEGER NOT NULL DEFAULT 0,
                minutes REAL NOT NULL DEFAULT 0,
                season INTEGER,
                PRIMARY KEY (game_id, player_id),
                FOREIGN KEY (game_id) REFERENCES games(game_id),
                FOREIGN KEY (player_id) REFERENCES players(player_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS sync_log (
                run_type TEXT PRIMARY KEY,
                last_run_at TEXT NOT NULL,
                last_game_date TEXT,
                details TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS fantasy_teams (
                fantasy_team_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                short_code TEXT NOT NULL,
                logo_url TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS fantasy_team_seasons (
                season INTEGER NOT NULL,
                fantasy_team_id INTEGER NOT NULL,
                draft_order INTEGER NOT NULL,
                PRIMARY KEY (season, fantasy_team_id),
                FOREIGN KEY (fantasy_team_id) REFERENCES fantasy_teams(fantasy_team_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_games_date ON games(game_date)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_player_games_date
             ON player_games(game_date)",
            [],
        )?;

        Ok(())
    }
}
