//! Roster sync: one roster fetch per selected team.
//!
//! Without an explicit team list, the CSV backend sources team ids from
//! the schedule file when one exists, so crawled opponents get rosters.

use std::collections::HashSet;
use std::path::Path;

use crate::cli::types::TeamId;
use crate::error::Result;
use crate::espn::extract::roster_records;
use crate::storage::csv::{
    roster_row, team_row, CsvTable, ROSTERS_FILE, ROSTERS_HEADER, SCHEDULE_FILE, SCHEDULE_HEADER,
    TEAMS_FILE, TEAMS_HEADER,
};
use crate::sync::RunCounts;

use super::{Backend, RunContext};

pub async fn run_roster(ctx: &mut RunContext) -> Result<RunCounts> {
    let team_ids = roster_team_ids(ctx)?;
    println!(
        "Syncing rosters for {} teams (season {}, backend {})...",
        team_ids.len(),
        ctx.season,
        ctx.backend.name()
    );

    let mut csv_tables = match &ctx.backend {
        Backend::Csv { out_dir } => {
            let teams = CsvTable::open(out_dir, TEAMS_FILE, TEAMS_HEADER, &[0])?;
            let rosters = CsvTable::open(out_dir, ROSTERS_FILE, ROSTERS_HEADER, &[0, 1, 2])?;
            let team_keys = teams.load_keys()?;
            let roster_keys = rosters.load_keys()?;
            Some((teams, team_keys, rosters, roster_keys))
        }
        _ => None,
    };

    let mut counts = RunCounts::default();

    for (i, team_id) in team_ids.iter().enumerate() {
        if i > 0 {
            ctx.pause().await;
        }

        let payload = match ctx.client.team_roster(*team_id, ctx.season).await {
            Ok(payload) => payload,
            Err(err) => {
                eprintln!("⚠ team {team_id}: roster fetch failed: {err}");
                counts.failed += 1;
                continue;
            }
        };
        let (team, players) = roster_records(&payload, *team_id, ctx.season);
        let team_label = team.display_name.clone().unwrap_or_else(|| team_id.to_string());

        let stored = match &mut ctx.backend {
            Backend::Csv { .. } => {
                let Some((teams, team_keys, rosters, roster_keys)) = csv_tables.as_mut() else {
                    unreachable!("csv tables opened for csv backend");
                };
                teams.append_rows(team_keys, &[team_row(&team)])?;
                let rows: Vec<_> = players
                    .iter()
                    .map(|(player, roster)| roster_row(player, roster))
                    .collect();
                rosters.append_rows(roster_keys, &rows)?
            }
            Backend::Sqlite(db) => db.store_roster(&team, &players)?,
            Backend::Rest(store) => {
                store.upsert("teams", &[team.clone()], "team_id").await?;
                let player_rows: Vec<_> = players.iter().map(|(p, _)| p.clone()).collect();
                let roster_rows: Vec<_> = players.iter().map(|(_, r)| r.clone()).collect();
                store.upsert("players", &player_rows, "player_id").await?;
                store
                    .upsert("team_rosters", &roster_rows, "team_id,player_id,season")
                    .await?;
                players.len()
            }
        };

        counts.added += stored;
        println!("✓ {team_label}: {stored} roster rows");
    }

    ctx.log_run("roster", None, counts).await?;
    println!("Roster sync finished: {}", counts.summary());
    Ok(counts)
}

fn roster_team_ids(ctx: &RunContext) -> Result<Vec<TeamId>> {
    if let (Backend::Csv { out_dir }, false) = (&ctx.backend, ctx.explicit_teams) {
        let from_schedule = schedule_csv_team_ids(out_dir)?;
        if !from_schedule.is_empty() {
            return Ok(from_schedule);
        }
    }
    Ok(ctx.team_ids.clone())
}

/// Home and away team ids mentioned in the CSV schedule file, in
/// first-seen order.
fn schedule_csv_team_ids(out_dir: &Path) -> Result<Vec<TeamId>> {
    let path = out_dir.join(SCHEDULE_FILE);
    let file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(_) => return Ok(Vec::new()),
    };
    let cols: Vec<usize> = ["home_team_id", "away_team_id"]
        .iter()
        .filter_map(|name| SCHEDULE_HEADER.iter().position(|h| h == name))
        .collect();

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record?;
        for &col in &cols {
            if let Some(id) = record.get(col).and_then(|v| v.parse::<u32>().ok()) {
                if seen.insert(id) {
                    ids.push(TeamId::new(id));
                }
            }
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn schedule_file_yields_both_sides_deduped() {
        let dir = TempDir::new().unwrap();
        let header = SCHEDULE_HEADER.join(",");
        std::fs::write(
            dir.path().join(SCHEDULE_FILE),
            format!(
                "{header}\n\
                 1,2026-01-10,,2026,52,Florida Gators,2,Auburn Tigers,Final,false\n\
                 2,2026-01-13,,2026,2306,Houston Cougars,52,Florida Gators,Final,true\n"
            ),
        )
        .unwrap();

        let ids = schedule_csv_team_ids(dir.path()).unwrap();
        assert_eq!(
            ids,
            vec![TeamId::new(52), TeamId::new(2), TeamId::new(2306)]
        );
    }

    #[test]
    fn missing_schedule_file_yields_no_ids() {
        let dir = TempDir::new().unwrap();
        assert!(schedule_csv_team_ids(dir.path()).unwrap().is_empty());
    }
}
