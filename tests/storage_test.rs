//! Integration tests for the SQLite backend

use chrono::NaiveDate;
use cbb_sync::storage::models::{
    FantasyTeamRecord, FantasyTeamSeasonRecord, GameRecord, PlayerGameRecord, PlayerRecord,
    RosterRecord, TeamRecord,
};
use cbb_sync::storage::SyncDatabase;
use cbb_sync::{GameId, PlayerId, TeamId};

fn team(id: u32, name: &str) -> TeamRecord {
    let mut record = TeamRecord::stub(TeamId::new(id), Some(name.to_string()));
    record.abbreviation = Some(name[..2.min(name.len())].to_uppercase());
    record
}

fn player(id: u64, team_id: u32, last_name: &str) -> PlayerRecord {
    PlayerRecord {
        player_id: PlayerId::new(id),
        team_id: TeamId::new(team_id),
        first_name: Some("Test".to_string()),
        last_name: Some(last_name.to_string()),
        short_name: None,
        short_name_abbr: None,
        jersey: Some("1".to_string()),
        position: Some("G".to_string()),
        height: Some(78.0),
        display_height: None,
        weight: None,
        experience: None,
        headshot: None,
        is_active: Some(true),
    }
}

fn roster(team_id: u32, player_id: u64, season: u16) -> RosterRecord {
    RosterRecord {
        team_id: TeamId::new(team_id),
        player_id: PlayerId::new(player_id),
        season,
        is_active: Some(true),
    }
}

fn game(id: u64, date: (i32, u32, u32)) -> GameRecord {
    GameRecord {
        game_id: GameId::new(id),
        game_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
        game_datetime: None,
        season: Some(2026),
        home_team_id: Some(TeamId::new(52)),
        home_team_name: Some("Florida Gators".to_string()),
        away_team_id: Some(TeamId::new(2)),
        away_team_name: Some("Auburn Tigers".to_string()),
        status: Some("Final".to_string()),
        neutral_site: Some(false),
    }
}

fn stat_line(game_id: u64, player_id: u64, pts: i64) -> PlayerGameRecord {
    PlayerGameRecord {
        game_id: GameId::new(game_id),
        player_id: PlayerId::new(player_id),
        game_date: NaiveDate::from_ymd_opt(2026, 1, 10),
        team_id: TeamId::new(52),
        pts,
        fgm: 5,
        fga: 11,
        tpm: 2,
        tpa: 5,
        ftm: 3,
        fta: 4,
        reb: 7,
        ast: 4,
        turnovers: 2,
        stl: 1,
        blk: 0,
        oreb: 2,
        dreb: 5,
        pf: 3,
        minutes: 31.5,
        season: Some(2026),
    }
}

#[test]
fn roster_upsert_is_idempotent() {
    let mut db = SyncDatabase::new_in_memory().unwrap();
    let team = team(52, "Florida Gators");
    let players = vec![
        (player(101, 52, "Clayton"), roster(52, 101, 2026)),
        (player(102, 52, "Condon"), roster(52, 102, 2026)),
    ];

    assert_eq!(db.store_roster(&team, &players).unwrap(), 2);
    assert_eq!(db.store_roster(&team, &players).unwrap(), 2);

    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM team_rosters", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn roster_upsert_overwrites_non_key_columns() {
    let mut db = SyncDatabase::new_in_memory().unwrap();
    let team = team(52, "Florida Gators");
    let mut entry = player(101, 52, "Clayton");
    db.store_roster(&team, &[(entry.clone(), roster(52, 101, 2026))])
        .unwrap();

    entry.jersey = Some("23".to_string());
    db.store_roster(&team, &[(entry, roster(52, 101, 2026))])
        .unwrap();

    let jersey: String = db
        .connection()
        .query_row(
            "SELECT jersey FROM players WHERE player_id = 101",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(jersey, "23");
}

#[test]
fn same_player_can_appear_on_multiple_season_rosters() {
    let mut db = SyncDatabase::new_in_memory().unwrap();
    let team = team(52, "Florida Gators");
    db.store_roster(&team, &[(player(101, 52, "Clayton"), roster(52, 101, 2025))])
        .unwrap();
    db.store_roster(&team, &[(player(101, 52, "Clayton"), roster(52, 101, 2026))])
        .unwrap();

    let count: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM team_rosters WHERE player_id = 101",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn game_window_query_orders_by_date() {
    let mut db = SyncDatabase::new_in_memory().unwrap();
    db.store_games(&[
        game(3, (2026, 2, 1)),
        game(1, (2026, 1, 5)),
        game(2, (2026, 1, 20)),
    ])
    .unwrap();

    let all = db
        .game_ids_between(None, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap())
        .unwrap();
    assert_eq!(all, vec![GameId::new(1), GameId::new(2), GameId::new(3)]);

    let windowed = db
        .game_ids_between(
            NaiveDate::from_ymd_opt(2026, 1, 10),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
        .unwrap();
    assert_eq!(windowed, vec![GameId::new(2)]);
}

#[test]
fn stat_lines_create_stubs_without_overwriting_rosters() {
    let mut db = SyncDatabase::new_in_memory().unwrap();
    let full = player(101, 52, "Clayton");
    db.store_roster(&team(52, "Florida Gators"), &[(full, roster(52, 101, 2026))])
        .unwrap();

    // Stub for a player already present keeps the roster columns.
    let mut stub = player(101, 52, "Clayton");
    stub.jersey = None;
    stub.position = None;
    let new_stub = player(999, 52, "Walk-on");

    db.store_stat_lines(
        &[TeamRecord::stub(TeamId::new(52), Some("Florida Gators".to_string()))],
        &[stub, new_stub],
        &[stat_line(7, 101, 27), stat_line(7, 999, 2)],
    )
    .unwrap();

    let jersey: Option<String> = db
        .connection()
        .query_row(
            "SELECT jersey FROM players WHERE player_id = 101",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(jersey.as_deref(), Some("1"));
    assert!(db.has_player_games(GameId::new(7)).unwrap());
    assert!(!db.has_player_games(GameId::new(8)).unwrap());
}

#[test]
fn stat_line_upsert_overwrites_on_rerun() {
    let mut db = SyncDatabase::new_in_memory().unwrap();
    let stubs = [player(101, 52, "Clayton")];
    let teams = [TeamRecord::stub(TeamId::new(52), None)];
    db.store_stat_lines(&teams, &stubs, &[stat_line(7, 101, 10)])
        .unwrap();
    db.store_stat_lines(&teams, &stubs, &[stat_line(7, 101, 27)])
        .unwrap();

    let (count, pts): (i64, i64) = db
        .connection()
        .query_row(
            "SELECT COUNT(*), MAX(pts) FROM player_games WHERE game_id = 7",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(pts, 27);
}

#[test]
fn stats_into_empty_database_satisfies_foreign_keys() {
    let mut db = SyncDatabase::new_in_memory().unwrap();

    // No roster or schedule sync has run: every referenced row must be
    // stubbed inside the same transaction, including the game itself.
    db.store_stat_lines(
        &[TeamRecord::stub(TeamId::new(52), Some("Florida Gators".to_string()))],
        &[player(101, 52, "Clayton")],
        &[stat_line(7, 101, 27)],
    )
    .unwrap();

    let (games, date): (i64, Option<String>) = db
        .connection()
        .query_row(
            "SELECT COUNT(*), MIN(game_date) FROM games WHERE game_id = 7",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(games, 1);
    assert_eq!(date.as_deref(), Some("2026-01-10"));
    assert!(db.has_player_games(GameId::new(7)).unwrap());
}

#[test]
fn sync_log_keeps_watermark_on_empty_runs() {
    let mut db = SyncDatabase::new_in_memory().unwrap();
    let mark = NaiveDate::from_ymd_opt(2026, 1, 10);

    db.update_sync_log("stats", mark, Some(r#"{"added":12}"#)).unwrap();
    let entry = db.get_last_run("stats").unwrap().unwrap();
    assert_eq!(entry.last_game_date, mark);

    // A run that found nothing must not clear the watermark.
    db.update_sync_log("stats", None, Some(r#"{"added":0}"#)).unwrap();
    let entry = db.get_last_run("stats").unwrap().unwrap();
    assert_eq!(entry.last_game_date, mark);
    assert_eq!(entry.details.as_deref(), Some(r#"{"added":0}"#));

    assert!(db.get_last_run("roster").unwrap().is_none());
}

#[test]
fn fantasy_seed_is_idempotent() {
    let mut db = SyncDatabase::new_in_memory().unwrap();
    let teams = vec![FantasyTeamRecord {
        fantasy_team_id: 1,
        name: "Moon Ballers".to_string(),
        short_code: "MB".to_string(),
        logo_url: None,
    }];
    let seasons = vec![FantasyTeamSeasonRecord {
        season: 2026,
        fantasy_team_id: 1,
        draft_order: 4,
    }];

    db.store_fantasy_teams(&teams, &seasons).unwrap();
    db.store_fantasy_teams(&teams, &seasons).unwrap();

    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM fantasy_team_seasons", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
}
