//! Stats sync: box scores for completed games inside the sync window.
//!
//! SQLite and REST resume from the `stats` watermark; when the window
//! turns up nothing and no explicit `--since` was given, the run falls
//! back to a full scan so a stale watermark cannot hide games. The CSV
//! backend scans its own schedule file and dedups by key.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;

use crate::cli::types::GameId;
use crate::cli::StatsArgs;
use crate::config;
use crate::error::Result;
use crate::espn::extract::{
    play_records, player_stub, stats_rows, summary_game_date, team_totals, StatLine,
};
use crate::storage::csv::{
    play_row, player_stat_row, team_stat_row, CsvTable, PLAYER_STATS_FILE, PLAYER_STATS_HEADER,
    PLAYS_FILE, PLAYS_HEADER, SCHEDULE_FILE, TEAM_STATS_FILE, TEAM_STATS_HEADER,
};
use crate::storage::models::{PlayerRecord, TeamRecord};
use crate::sync::{sync_window, KeySet, RunCounts};

use super::{Backend, RunContext};

struct CsvStatsTables {
    player_stats: CsvTable,
    player_keys: KeySet,
    team_stats: CsvTable,
    team_keys: KeySet,
    plays: CsvTable,
    play_keys: KeySet,
    games_with_player_stats: HashSet<u64>,
    games_with_team_stats: HashSet<u64>,
    games_with_plays: HashSet<u64>,
}

impl CsvStatsTables {
    /// A game counts as done only when all three files cover it, so a
    /// run that died between writes gets picked up again.
    fn has_game(&self, game_id: GameId) -> bool {
        let id = game_id.as_u64();
        self.games_with_player_stats.contains(&id)
            && self.games_with_team_stats.contains(&id)
            && self.games_with_plays.contains(&id)
    }

    fn mark_game(&mut self, game_id: GameId) {
        let id = game_id.as_u64();
        self.games_with_player_stats.insert(id);
        self.games_with_team_stats.insert(id);
        self.games_with_plays.insert(id);
    }
}

pub async fn run_stats(ctx: &mut RunContext, args: &StatsArgs) -> Result<RunCounts> {
    println!(
        "Syncing stats (season {}, backend {})...",
        ctx.season,
        ctx.backend.name()
    );

    let watermark = match &ctx.backend {
        Backend::Csv { .. } => None,
        Backend::Sqlite(db) => db.get_last_run("stats")?.and_then(|e| e.last_game_date),
        Backend::Rest(store) => store
            .get_last_run("stats")
            .await?
            .and_then(|e| e.last_game_date),
    };
    let (start, up_to) = sync_window(args.since, watermark);
    if let Some(start) = start {
        println!("Window: {start} to {up_to}");
    }

    let mut game_ids = candidate_games(ctx, start, up_to).await?;
    if game_ids.is_empty() && start.is_some() && args.since.is_none() {
        println!("No games in window; falling back to a full scan");
        game_ids = candidate_games(ctx, None, up_to).await?;
    }
    println!("{} candidate games", game_ids.len());

    let mut csv_tables = match &ctx.backend {
        Backend::Csv { out_dir } => Some(open_csv_tables(out_dir)?),
        _ => None,
    };

    let allowed = config::allowed_team_set();
    let mut counts = RunCounts::default();
    let mut latest_date: Option<NaiveDate> = None;
    let mut first = true;

    for game_id in game_ids {
        let already = match (&ctx.backend, csv_tables.as_ref()) {
            (Backend::Csv { .. }, Some(tables)) => tables.has_game(game_id),
            (Backend::Sqlite(db), _) => db.has_player_games(game_id)?,
            (Backend::Rest(store), _) => store.has_player_games(game_id).await?,
            _ => false,
        };
        if already && !args.force {
            counts.skipped += 1;
            continue;
        }

        if !first {
            ctx.pause().await;
        }
        first = false;

        let summary = match ctx.client.game_summary(game_id).await {
            Ok(summary) => summary,
            Err(err) => {
                eprintln!("⚠ game {game_id}: summary fetch failed: {err}");
                counts.failed += 1;
                continue;
            }
        };
        if !summary.is_completed() {
            counts.skipped += 1;
            continue;
        }

        let rows = stats_rows(&summary, ctx.season, game_id, &allowed);
        if rows.is_empty() {
            counts.skipped += 1;
            continue;
        }
        if let Some(date) = summary_game_date(&summary) {
            if Some(date) > latest_date {
                latest_date = Some(date);
            }
        }

        let (team_stubs, player_stubs) = stub_records(&rows);
        let stored = match &mut ctx.backend {
            Backend::Csv { .. } => {
                let Some(tables) = csv_tables.as_mut() else {
                    unreachable!("csv tables opened for csv backend");
                };
                let stat_rows: Vec<_> = rows.iter().map(|l| player_stat_row(&l.record)).collect();
                let written = tables
                    .player_stats
                    .append_rows(&mut tables.player_keys, &stat_rows)?;

                let total_rows: Vec<_> = team_totals(&rows).iter().map(team_stat_row).collect();
                tables
                    .team_stats
                    .append_rows(&mut tables.team_keys, &total_rows)?;

                let plays: Vec<_> = play_records(&summary, game_id).iter().map(play_row).collect();
                tables.plays.append_rows(&mut tables.play_keys, &plays)?;

                tables.mark_game(game_id);
                written
            }
            Backend::Sqlite(db) => {
                let records: Vec<_> = rows.iter().map(|l| l.record.clone()).collect();
                db.store_stat_lines(&team_stubs, &player_stubs, &records)?
            }
            Backend::Rest(store) => {
                store.insert_missing("teams", &team_stubs, "team_id").await?;
                store
                    .insert_missing("players", &player_stubs, "player_id")
                    .await?;
                let records: Vec<_> = rows.iter().map(|l| l.record.clone()).collect();
                store
                    .upsert("player_games", &records, "game_id,player_id")
                    .await?;
                records.len()
            }
        };

        counts.added += stored;
        println!("✓ game {game_id}: {stored} stat lines");
    }

    ctx.log_run("stats", latest_date, counts).await?;
    println!("Stats sync finished: {}", counts.summary());
    Ok(counts)
}

/// Final games inside the window, from wherever this backend keeps its
/// schedule.
async fn candidate_games(
    ctx: &RunContext,
    start: Option<NaiveDate>,
    up_to: NaiveDate,
) -> Result<Vec<GameId>> {
    match &ctx.backend {
        Backend::Csv { out_dir } => csv_game_ids(out_dir, start, up_to),
        Backend::Sqlite(db) => Ok(db.game_ids_between(start, up_to)?),
        Backend::Rest(store) => store.game_ids_between(start, up_to).await,
    }
}

fn stub_records(rows: &[StatLine]) -> (Vec<TeamRecord>, Vec<PlayerRecord>) {
    let mut team_stubs: Vec<TeamRecord> = Vec::new();
    let mut player_stubs: Vec<PlayerRecord> = Vec::new();
    let mut seen_teams = HashSet::new();
    let mut seen_players = HashSet::new();

    for line in rows {
        if seen_teams.insert(line.record.team_id.as_u32()) {
            team_stubs.push(TeamRecord::stub(line.record.team_id, line.team_name.clone()));
        }
        if seen_players.insert(line.record.player_id.as_u64()) {
            if let Some(stub) = player_stub(&line.athlete, line.record.team_id) {
                player_stubs.push(stub);
            }
        }
    }
    (team_stubs, player_stubs)
}

fn open_csv_tables(out_dir: &Path) -> Result<CsvStatsTables> {
    let player_stats = CsvTable::open(out_dir, PLAYER_STATS_FILE, PLAYER_STATS_HEADER, &[0, 1])?;
    let player_keys = player_stats.load_keys()?;
    let team_stats = CsvTable::open(out_dir, TEAM_STATS_FILE, TEAM_STATS_HEADER, &[0, 1])?;
    let team_keys = team_stats.load_keys()?;
    let plays = CsvTable::open(out_dir, PLAYS_FILE, PLAYS_HEADER, &[0, 1])?;
    let play_keys = plays.load_keys()?;

    // Per-file game ids for skip checks; a game missing from any file
    // still needs a fetch.
    let games_with_player_stats = first_column_u64(player_stats.path())?;
    let games_with_team_stats = first_column_u64(team_stats.path())?;
    let games_with_plays = first_column_u64(plays.path())?;

    Ok(CsvStatsTables {
        player_stats,
        player_keys,
        team_stats,
        team_keys,
        plays,
        play_keys,
        games_with_player_stats,
        games_with_team_stats,
        games_with_plays,
    })
}

fn first_column_u64(path: &Path) -> Result<HashSet<u64>> {
    let mut ids = HashSet::new();
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return Ok(ids),
    };
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    for record in reader.records() {
        let record = record?;
        if let Some(id) = record.get(0).and_then(|v| v.parse().ok()) {
            ids.insert(id);
        }
    }
    Ok(ids)
}

/// Final games from the CSV schedule file, filtered by date window.
fn csv_game_ids(
    out_dir: &Path,
    start: Option<NaiveDate>,
    up_to: NaiveDate,
) -> Result<Vec<GameId>> {
    let path = out_dir.join(SCHEDULE_FILE);
    let file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(_) => return Ok(Vec::new()),
    };
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let mut games: Vec<(NaiveDate, u64)> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(game_id) = record.get(0).and_then(|v| v.parse::<u64>().ok()) else {
            continue;
        };
        let Some(date) = record
            .get(1)
            .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
        else {
            continue;
        };
        let status = record.get(8).unwrap_or_default();
        if !status.to_lowercase().contains("final") {
            continue;
        }
        if start.is_some_and(|s| date < s) || date > up_to {
            continue;
        }
        games.push((date, game_id));
    }
    games.sort();
    games.dedup_by_key(|(_, id)| *id);
    Ok(games.into_iter().map(|(_, id)| GameId::new(id)).collect())
}
