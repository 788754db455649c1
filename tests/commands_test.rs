//! Integration tests for command handlers that run offline

use cbb_sync::cli::types::{BackendKind, Season};
use cbb_sync::cli::CommonArgs;
use cbb_sync::commands::{seed_fantasy::run_seed_fantasy, Backend, RunContext};
use cbb_sync::config;
use tempfile::TempDir;

fn common(backend: BackendKind, dir: &TempDir) -> CommonArgs {
    CommonArgs {
        season: Season::new(2026),
        sleep: 0.0,
        timeout: 5,
        backend,
        team_ids: None,
        out_dir: Some(dir.path().join("out")),
        db_path: Some(dir.path().join("test.db")),
    }
}

#[test]
fn run_context_defaults_to_tracked_team_set() {
    let dir = TempDir::new().unwrap();
    let ctx = RunContext::from_common(&common(BackendKind::Csv, &dir)).unwrap();
    assert_eq!(ctx.team_ids.len(), config::AVAILABLE_TEAMS.len());
    assert_eq!(ctx.backend.name(), "csv");
}

#[test]
fn rest_backend_fails_fast_without_credentials() {
    std::env::remove_var(config::REST_URL_ENV_VAR);
    std::env::remove_var(config::REST_KEY_ENV_VAR);

    let dir = TempDir::new().unwrap();
    let result = RunContext::from_common(&common(BackendKind::Rest, &dir));
    assert!(result.is_err());
}

#[tokio::test]
async fn seed_fantasy_writes_all_teams_to_sqlite() {
    let dir = TempDir::new().unwrap();
    let mut ctx = RunContext::from_common(&common(BackendKind::Sqlite, &dir)).unwrap();

    let counts = run_seed_fantasy(&mut ctx, Some("MB=8,RR=1")).await.unwrap();
    assert_eq!(counts.added, config::FANTASY_TEAMS.len());

    let Backend::Sqlite(db) = &ctx.backend else {
        panic!("expected sqlite backend");
    };
    let (total, mb_slot): (i64, u32) = db
        .connection()
        .query_row(
            "SELECT COUNT(*),
                    (SELECT draft_order FROM fantasy_team_seasons s
                     JOIN fantasy_teams t ON t.fantasy_team_id = s.fantasy_team_id
                     WHERE t.short_code = 'MB')
             FROM fantasy_team_seasons",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(total as usize, config::FANTASY_TEAMS.len());
    assert_eq!(mb_slot, 8);
}

#[tokio::test]
async fn seed_fantasy_rejects_the_csv_backend() {
    let dir = TempDir::new().unwrap();
    let mut ctx = RunContext::from_common(&common(BackendKind::Csv, &dir)).unwrap();
    assert!(run_seed_fantasy(&mut ctx, None).await.is_err());
}
