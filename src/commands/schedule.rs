//! Schedule sync: game records per team, deduped by game id.
//!
//! Crawl mode walks the opponent graph from a start team instead of
//! using the fixed list, until no unvisited team remains.

use std::collections::{HashSet, VecDeque};

use chrono::NaiveDate;

use crate::cli::types::TeamId;
use crate::cli::ScheduleArgs;
use crate::error::Result;
use crate::espn::extract::{game_records, schedule_team_ids};
use crate::espn::types::SchedulePayload;
use crate::storage::csv::{game_row, CsvTable, SCHEDULE_FILE, SCHEDULE_HEADER};
use crate::storage::models::GameRecord;
use crate::sync::RunCounts;

use super::{Backend, RunContext};

pub async fn run_schedule(ctx: &mut RunContext, args: &ScheduleArgs) -> Result<RunCounts> {
    println!(
        "Syncing schedules (season {}, backend {}{})...",
        ctx.season,
        ctx.backend.name(),
        if args.crawl { ", crawl" } else { "" }
    );

    let mut csv_table = match &ctx.backend {
        Backend::Csv { out_dir } => {
            let table = CsvTable::open(out_dir, SCHEDULE_FILE, SCHEDULE_HEADER, &[0])?;
            let keys = table.load_keys()?;
            Some((table, keys))
        }
        _ => None,
    };

    let mut counts = RunCounts::default();
    let mut latest_date: Option<NaiveDate> = None;
    // Dedup within this run; games show up on both teams' schedules.
    let mut seen_games: HashSet<u64> = HashSet::new();

    let mut queue: VecDeque<_> = if args.crawl {
        let start = args
            .crawl_start_team
            .or_else(|| ctx.team_ids.first().copied());
        start.into_iter().collect()
    } else {
        ctx.team_ids.iter().copied().collect()
    };
    let mut visited: HashSet<u32> = queue.iter().map(|id| id.as_u32()).collect();

    let mut first = true;
    while let Some(team_id) = queue.pop_front() {
        if !first {
            ctx.pause().await;
        }
        first = false;

        let payload = match ctx.client.team_schedule(team_id, ctx.season).await {
            Ok(payload) => payload,
            Err(err) => {
                eprintln!("⚠ team {team_id}: schedule fetch failed: {err}");
                counts.failed += 1;
                continue;
            }
        };

        if args.crawl {
            enqueue_opponents(&payload, &mut visited, &mut queue);
        }

        let games: Vec<GameRecord> = game_records(&payload, ctx.season, args.finals_only)
            .into_iter()
            .filter(|game| seen_games.insert(game.game_id.as_u64()))
            .collect();
        if games.is_empty() {
            counts.skipped += 1;
            continue;
        }

        for game in &games {
            if game.game_date > latest_date {
                latest_date = game.game_date;
            }
        }

        let stored = match &mut ctx.backend {
            Backend::Csv { .. } => {
                let Some((table, keys)) = csv_table.as_mut() else {
                    unreachable!("csv table opened for csv backend");
                };
                let rows: Vec<_> = games.iter().map(game_row).collect();
                table.append_rows(keys, &rows)?
            }
            Backend::Sqlite(db) => db.store_games(&games)?,
            Backend::Rest(store) => {
                store.upsert("games", &games, "game_id").await?;
                games.len()
            }
        };

        counts.added += stored;
        println!("✓ team {team_id}: {stored} games");
    }

    ctx.log_run("schedule", latest_date, counts).await?;
    println!("Schedule sync finished: {}", counts.summary());
    Ok(counts)
}

fn enqueue_opponents(
    payload: &SchedulePayload,
    visited: &mut HashSet<u32>,
    queue: &mut VecDeque<TeamId>,
) {
    for opponent in schedule_team_ids(payload) {
        if visited.insert(opponent.as_u32()) {
            queue.push_back(opponent);
        }
    }
}
