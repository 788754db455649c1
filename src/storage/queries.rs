//! SQLite upserts and sync-log queries.
//!
//! Row-level helpers take a plain connection so the unit-level methods can
//! run them inside one transaction per team or game.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{
    FantasyTeamRecord, FantasyTeamSeasonRecord, GameRecord, PlayerGameRecord, PlayerRecord,
    RosterRecord, SyncLogEntry, TeamRecord,
};
use super::schema::SyncDatabase;
use crate::cli::types::GameId;

fn date_str(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.to_string())
}

fn parse_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").ok())
}

fn upsert_team_row(conn: &Connection, team: &TeamRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO teams (team_id, slug, location, name, nickname, abbreviation,
                            display_name, short_display_name, color, alternate_color,
                            logo_url, conference_id, conference_name)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(team_id) DO UPDATE SET
             slug = excluded.slug,
             location = excluded.location,
             name = excluded.name,
             nickname = excluded.nickname,
             abbreviation = excluded.abbreviation,
             display_name = excluded.display_name,
             short_display_name = excluded.short_display_name,
             color = excluded.color,
             alternate_color = excluded.alternate_color,
             logo_url = excluded.logo_url,
             conference_id = excluded.conference_id,
             conference_name = excluded.conference_name",
        params![
            team.team_id.as_u32(),
            team.slug,
            team.location,
            team.name,
            team.nickname,
            team.abbreviation,
            team.display_name,
            team.short_display_name,
            team.color,
            team.alternate_color,
            team.logo_url,
            team.conference_id,
            team.conference_name,
        ],
    )?;
    Ok(())
}

fn upsert_player_row(conn: &Connection, player: &PlayerRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO players (player_id, team_id, first_name, last_name, short_name,
                              short_name_abbr, jersey, position, height, display_height,
                              weight, experience, headshot, is_active)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(player_id) DO UPDATE SET
             team_id = excluded.team_id,
             first_name = excluded.first_name,
             last_name = excluded.last_name,
             short_name = excluded.short_name,
             short_name_abbr = excluded.short_name_abbr,
             jersey = excluded.jersey,
             position = excluded.position,
             height = excluded.height,
             display_height = excluded.display_height,
             weight = excluded.weight,
             experience = excluded.experience,
             headshot = excluded.headshot,
             is_active = excluded.is_active",
        params![
            player.player_id.as_u64(),
            player.team_id.as_u32(),
            player.first_name,
            player.last_name,
            player.short_name,
            player.short_name_abbr,
            player.jersey,
            player.position,
            player.height,
            player.display_height,
            player.weight,
            player.experience,
            player.headshot,
            player.is_active,
        ],
    )?;
    Ok(())
}

fn upsert_roster_row(conn: &Connection, roster: &RosterRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO team_rosters (team_id, player_id, season, is_active)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(team_id, player_id, season) DO UPDATE SET
             is_active = excluded.is_active",
        params![
            roster.team_id.as_u32(),
            roster.player_id.as_u64(),
            roster.season,
            roster.is_active,
        ],
    )?;
    Ok(())
}

fn upsert_game_row(conn: &Connection, game: &GameRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO games (game_id, game_date, game_datetime, season,
                            home_team_id, home_team_name, away_team_id, away_team_name,
                            status, neutral_site)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(game_id) DO UPDATE SET
             game_date = excluded.game_date,
             game_datetime = excluded.game_datetime,
             season = excluded.season,
             home_team_id = excluded.home_team_id,
             home_team_name = excluded.home_team_name,
             away_team_id = excluded.away_team_id,
             away_team_name = excluded.away_team_name,
             status = excluded.status,
             neutral_site = excluded.neutral_site",
        params![
            game.game_id.as_u64(),
            date_str(game.game_date),
            game.game_datetime.map(|dt| dt.to_rfc3339()),
            game.season,
            game.home_team_id.map(|id| id.as_u32()),
            game.home_team_name,
            game.away_team_id.map(|id| id.as_u32()),
            game.away_team_name,
            game.status,
            game.neutral_site,
        ],
    )?;
    Ok(())
}

fn upsert_player_game_row(conn: &Connection, row: &PlayerGameRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO player_games (game_id, player_id, game_date, team_id,
                                   pts, fgm, fga, tpm, tpa, ftm, fta, reb, ast,
                                   turnovers, stl, blk, oreb, dreb, pf, minutes, season)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(game_id, player_id) DO UPDATE SET
             game_date = excluded.game_date,
             team_id = excluded.team_id,
             pts = excluded.pts,
             fgm = excluded.fgm,
             fga = excluded.fga,
             tpm = excluded.tpm,
             tpa = excluded.tpa,
             ftm = excluded.ftm,
             fta = excluded.fta,
             reb = excluded.reb,
             ast = excluded.ast,
             turnovers = excluded.turnovers,
             stl = excluded.stl,
             blk = excluded.blk,
             oreb = excluded.oreb,
             dreb = excluded.dreb,
             pf = excluded.pf,
             minutes = excluded.minutes,
             season = excluded.season",
        params![
            row.game_id.as_u64(),
            row.player_id.as_u64(),
            date_str(row.game_date),
            row.team_id.as_u32(),
            row.pts,
            row.fgm,
            row.fga,
            row.tpm,
            row.tpa,
            row.ftm,
            row.fta,
            row.reb,
            row.ast,
            row.turnovers,
            row.stl,
            row.blk,
            row.oreb,
            row.dreb,
            row.pf,
            row.minutes,
            row.season,
        ],
    )?;
    Ok(())
}

fn ensure_game_stub_row(conn: &Connection, row: &PlayerGameRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO games (game_id, game_date, season)
         VALUES (?, ?, ?)
         ON CONFLICT(game_id) DO NOTHING",
        params![row.game_id.as_u64(), date_str(row.game_date), row.season],
    )?;
    Ok(())
}

fn ensure_team_stub_row(conn: &Connection, team: &TeamRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO teams (team_id, name, display_name)
         VALUES (?, ?, ?)
         ON CONFLICT(team_id) DO NOTHING",
        params![team.team_id.as_u32(), team.name, team.display_name],
    )?;
    Ok(())
}

fn ensure_player_stub_row(conn: &Connection, player: &PlayerRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO players (player_id, team_id, first_name, last_name, short_name)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(player_id) DO NOTHING",
        params![
            player.player_id.as_u64(),
            player.team_id.as_u32(),
            player.first_name,
            player.last_name,
            player.short_name,
        ],
    )?;
    Ok(())
}

impl SyncDatabase {
    /// Store one team's roster in a single transaction.
    pub fn store_roster(
        &mut self,
        team: &TeamRecord,
        players: &[(PlayerRecord, RosterRecord)],
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        upsert_team_row(&tx, team)?;
        for (player, roster) in players {
            upsert_player_row(&tx, player)?;
            upsert_roster_row(&tx, roster)?;
        }
        tx.commit()?;
        Ok(players.len())
    }

    /// Store one team's schedule in a single transaction.
    pub fn store_games(&mut self, games: &[GameRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for game in games {
            upsert_game_row(&tx, game)?;
        }
        tx.commit()?;
        Ok(games.len())
    }

    /// Store one game's stat lines, creating game, team, and player stubs
    /// first so every foreign key resolves even into an empty database.
    /// One transaction per game.
    pub fn store_stat_lines(
        &mut self,
        team_stubs: &[TeamRecord],
        player_stubs: &[PlayerRecord],
        rows: &[PlayerGameRecord],
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut stubbed_games = std::collections::HashSet::new();
        for row in rows {
            if stubbed_games.insert(row.game_id.as_u64()) {
                ensure_game_stub_row(&tx, row)?;
            }
        }
        for team in team_stubs {
            ensure_team_stub_row(&tx, team)?;
        }
        for player in player_stubs {
            ensure_player_stub_row(&tx, player)?;
        }
        for row in rows {
            upsert_player_game_row(&tx, row)?;
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Seed the fantasy league tables in a single transaction.
    pub fn store_fantasy_teams(
        &mut self,
        teams: &[FantasyTeamRecord],
        seasons: &[FantasyTeamSeasonRecord],
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for team in teams {
            tx.execute(
                "INSERT INTO fantasy_teams (fantasy_team_id, name, short_code, logo_url)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT(fantasy_team_id) DO UPDATE SET
                     name = excluded.name,
                     short_code = excluded.short_code,
                     logo_url = excluded.logo_url",
                params![team.fantasy_team_id, team.name, team.short_code, team.logo_url],
            )?;
        }
        for entry in seasons {
            tx.execute(
                "INSERT INTO fantasy_team_seasons (season, fantasy_team_id, draft_order)
                 VALUES (?, ?, ?)
                 ON CONFLICT(season, fantasy_team_id) DO UPDATE SET
                     draft_order = excluded.draft_order",
                params![entry.season, entry.fantasy_team_id, entry.draft_order],
            )?;
        }
        tx.commit()?;
        Ok(teams.len())
    }

    /// Whether any stat line exists for a game.
    pub fn has_player_games(&self, game_id: GameId) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM player_games WHERE game_id = ?",
            params![game_id.as_u64()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Final game ids inside a date window, oldest first. `start = None`
    /// means the window is unbounded on the left.
    pub fn game_ids_between(
        &self,
        start: Option<NaiveDate>,
        up_to: NaiveDate,
    ) -> Result<Vec<GameId>> {
        let mut stmt = self.conn.prepare(
            "SELECT game_id FROM games
             WHERE game_date IS NOT NULL
               AND (?1 IS NULL OR game_date >= ?1)
               AND game_date <= ?2
             ORDER BY game_date, game_id",
        )?;
        let ids = stmt
            .query_map(params![date_str(start), up_to.to_string()], |row| {
                row.get::<_, u64>(0)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids.into_iter().map(GameId::new).collect())
    }

    pub fn get_last_run(&self, run_type: &str) -> Result<Option<SyncLogEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT run_type, last_run_at, last_game_date, details
                 FROM sync_log WHERE run_type = ?",
                params![run_type],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        Ok(entry.map(|(run_type, last_run_at, last_game_date, details)| SyncLogEntry {
            run_type,
            last_run_at: DateTime::parse_from_rfc3339(&last_run_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_default(),
            last_game_date: parse_date(last_game_date),
            details,
        }))
    }

    /// Record a run's watermark. `last_game_date = None` keeps the
    /// previous watermark so an empty window never moves it backwards.
    pub fn update_sync_log(
        &mut self,
        run_type: &str,
        last_game_date: Option<NaiveDate>,
        details: Option<&str>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sync_log (run_type, last_run_at, last_game_date, details)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(run_type) DO UPDATE SET
                 last_run_at = excluded.last_run_at,
                 last_game_date = COALESCE(excluded.last_game_date, sync_log.last_game_date),
                 details = excluded.details",
            params![
                run_type,
                Utc::now().to_rfc3339(),
                date_str(last_game_date),
                details,
            ],
        )?;
        Ok(())
    }
}
