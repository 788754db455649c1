//! Integration tests for the append-only CSV backend

use cbb_sync::storage::csv::{
    append_status_log, game_row, roster_row, team_stat_row, CsvTable, ROSTERS_FILE,
    ROSTERS_HEADER, SCHEDULE_FILE, SCHEDULE_HEADER, STATUS_LOG_FILE, TEAM_STATS_FILE,
    TEAM_STATS_HEADER,
};
use cbb_sync::storage::models::{GameRecord, PlayerRecord, RosterRecord, TeamGameRecord};
use cbb_sync::{GameId, PlayerId, TeamId};
use chrono::NaiveDate;
use tempfile::TempDir;

fn roster_pair(team_id: u32, player_id: u64) -> (PlayerRecord, RosterRecord) {
    let player = PlayerRecord {
        player_id: PlayerId::new(player_id),
        team_id: TeamId::new(team_id),
        first_name: Some("Test".to_string()),
        last_name: Some("Player".to_string()),
        short_name: None,
        short_name_abbr: None,
        jersey: None,
        position: Some("F".to_string()),
        height: None,
        display_height: None,
        weight: None,
        experience: None,
        headshot: None,
        is_active: Some(true),
    };
    let roster = RosterRecord {
        team_id: TeamId::new(team_id),
        player_id: PlayerId::new(player_id),
        season: 2026,
        is_active: Some(true),
    };
    (player, roster)
}

fn game(id: u64) -> GameRecord {
    GameRecord {
        game_id: GameId::new(id),
        game_date: NaiveDate::from_ymd_opt(2026, 1, 10),
        game_datetime: None,
        season: Some(2026),
        home_team_id: Some(TeamId::new(52)),
        home_team_name: Some("Florida Gators".to_string()),
        away_team_id: Some(TeamId::new(2)),
        away_team_name: Some("Auburn Tigers".to_string()),
        status: Some("Final".to_string()),
        neutral_site: None,
    }
}

fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn header_is_written_exactly_once() {
    let dir = TempDir::new().unwrap();
    CsvTable::open(dir.path(), SCHEDULE_FILE, SCHEDULE_HEADER, &[0]).unwrap();
    CsvTable::open(dir.path(), SCHEDULE_FILE, SCHEDULE_HEADER, &[0]).unwrap();

    let lines = read_lines(&dir.path().join(SCHEDULE_FILE));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("game_id,game_date"));
}

#[test]
fn rerun_appends_nothing_for_seen_keys() {
    let dir = TempDir::new().unwrap();
    let rows = vec![game_row(&game(1)), game_row(&game(2))];

    let table = CsvTable::open(dir.path(), SCHEDULE_FILE, SCHEDULE_HEADER, &[0]).unwrap();
    let mut keys = table.load_keys().unwrap();
    assert_eq!(table.append_rows(&mut keys, &rows).unwrap(), 2);

    // Fresh open simulates a second run: keys reload from disk.
    let table = CsvTable::open(dir.path(), SCHEDULE_FILE, SCHEDULE_HEADER, &[0]).unwrap();
    let mut keys = table.load_keys().unwrap();
    assert_eq!(keys.len(), 2);
    let mut rerun = rows.clone();
    rerun.push(game_row(&game(3)));
    assert_eq!(table.append_rows(&mut keys, &rerun).unwrap(), 1);

    // Header plus three data rows, never a duplicate.
    assert_eq!(read_lines(&dir.path().join(SCHEDULE_FILE)).len(), 4);
}

#[test]
fn load_keys_rejects_a_mismatched_header() {
    let dir = TempDir::new().unwrap();
    // A file from some other tool: non-empty, so open() leaves it alone.
    std::fs::write(
        dir.path().join(SCHEDULE_FILE),
        "event_id,when\n1,2026-01-10\n",
    )
    .unwrap();

    let table = CsvTable::open(dir.path(), SCHEDULE_FILE, SCHEDULE_HEADER, &[0]).unwrap();
    let err = table.load_keys().unwrap_err();
    assert!(err.to_string().contains("does not match expected"));
}

#[test]
fn composite_keys_distinguish_rows() {
    let dir = TempDir::new().unwrap();
    let table = CsvTable::open(dir.path(), ROSTERS_FILE, ROSTERS_HEADER, &[0, 1, 2]).unwrap();
    let mut keys = table.load_keys().unwrap();

    let (p1, r1) = roster_pair(52, 101);
    let (p2, mut r2) = roster_pair(52, 101);
    r2.season = 2025;

    let written = table
        .append_rows(&mut keys, &[roster_row(&p1, &r1), roster_row(&p2, &r2)])
        .unwrap();
    // Same player, different season: both rows survive the key check.
    assert_eq!(written, 2);
}

#[test]
fn team_stat_rows_match_header_width() {
    let dir = TempDir::new().unwrap();
    let table = CsvTable::open(dir.path(), TEAM_STATS_FILE, TEAM_STATS_HEADER, &[0, 1]).unwrap();
    let mut keys = table.load_keys().unwrap();

    let total = TeamGameRecord {
        game_id: GameId::new(7),
        team_id: TeamId::new(52),
        team_name: Some("Florida Gators".to_string()),
        game_date: NaiveDate::from_ymd_opt(2026, 1, 10),
        pts: 80,
        fgm: 30,
        fga: 60,
        tpm: 8,
        tpa: 22,
        ftm: 12,
        fta: 15,
        reb: 38,
        ast: 17,
        turnovers: 9,
        stl: 6,
        blk: 4,
        oreb: 11,
        dreb: 27,
        pf: 14,
        minutes: 200.0,
    };
    let row = team_stat_row(&total);
    assert_eq!(row.len(), TEAM_STATS_HEADER.len());
    assert_eq!(table.append_rows(&mut keys, &[row]).unwrap(), 1);
}

#[test]
fn status_log_appends_every_run() {
    let dir = TempDir::new().unwrap();
    append_status_log(dir.path(), "roster", "2 added, 0 skipped, 0 failed").unwrap();
    append_status_log(dir.path(), "roster", "0 added, 2 skipped, 0 failed").unwrap();

    let lines = read_lines(&dir.path().join(STATUS_LOG_FILE));
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("2 added"));
    assert!(lines[2].contains("2 skipped"));
}
