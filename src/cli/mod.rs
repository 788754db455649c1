//! CLI argument definitions and parsing.

pub mod types;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use types::{BackendKind, Season, TeamId};

use crate::config;

/// Arguments shared by every run type.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Season year tag (e.g. 2026).
    #[clap(long, short, default_value_t = Season::default())]
    pub season: Season,

    /// Delay between API requests, in seconds.
    #[clap(long, default_value_t = config::DEFAULT_SLEEP_SECONDS)]
    pub sleep: f64,

    /// HTTP timeout in seconds.
    #[clap(long, default_value_t = config::DEFAULT_TIMEOUT_SECONDS)]
    pub timeout: u64,

    /// Persistence backend.
    #[clap(long, value_enum, default_value_t = BackendKind::Csv)]
    pub backend: BackendKind,

    /// Comma-separated ESPN team ids (defaults to the tracked team set).
    #[clap(long, value_delimiter = ',')]
    pub team_ids: Option<Vec<TeamId>>,

    /// Output directory for CSV files (defaults to ./<season>).
    #[clap(long)]
    pub out_dir: Option<PathBuf>,

    /// SQLite database path (or set `CBB_SYNC_DB`).
    #[clap(long)]
    pub db_path: Option<PathBuf>,
}

/// Arguments specific to schedule collection.
#[derive(Debug, Args)]
pub struct ScheduleArgs {
    /// Only keep games with a final status.
    #[clap(long)]
    pub finals_only: bool,

    /// Walk the opponent graph instead of the fixed team list (CSV backend).
    #[clap(long)]
    pub crawl: bool,

    /// Team to start the crawl from (defaults to the first selected team).
    #[clap(long)]
    pub crawl_start_team: Option<TeamId>,
}

/// Arguments specific to stats collection.
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Only sync games on/after this date (overrides the watermark).
    #[clap(long)]
    pub since: Option<NaiveDate>,

    /// Re-import games even if stats rows already exist.
    #[clap(long)]
    pub force: bool,
}

#[derive(Debug, Parser)]
#[clap(name = "cbb-sync", about = "College basketball data collector")]
pub struct CbbSync {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sync team rosters (one team record plus player/roster rows per team).
    Roster {
        #[clap(flatten)]
        common: CommonArgs,
    },

    /// Sync team schedules into game records, deduped by game id.
    Schedule {
        #[clap(flatten)]
        common: CommonArgs,

        #[clap(flatten)]
        schedule: ScheduleArgs,
    },

    /// Sync box-score stats for completed games.
    ///
    /// Resumes from the `stats` watermark in the sync log; games that
    /// already have stats rows are skipped unless `--force`.
    Stats {
        #[clap(flatten)]
        common: CommonArgs,

        #[clap(flatten)]
        stats: StatsArgs,
    },

    /// Seed the fantasy league tables (SQLite/REST backends).
    SeedFantasy {
        #[clap(flatten)]
        common: CommonArgs,

        /// Draft order mapping like `MB=1,AS=2`.
        #[clap(long)]
        draft_order: Option<String>,
    },

    /// Run roster, schedule, and stats in sequence.
    All {
        #[clap(flatten)]
        common: CommonArgs,

        #[clap(flatten)]
        schedule: ScheduleArgs,

        #[clap(flatten)]
        stats: StatsArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_roster_with_defaults() {
        let app = CbbSync::parse_from(["cbb-sync", "roster"]);
        match app.command {
            Commands::Roster { common } => {
                assert_eq!(common.backend, BackendKind::Csv);
                assert_eq!(common.timeout, config::DEFAULT_TIMEOUT_SECONDS);
                assert!(common.team_ids.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_comma_separated_team_ids() {
        let app = CbbSync::parse_from(["cbb-sync", "schedule", "--team-ids", "2,52,2306"]);
        match app.command {
            Commands::Schedule { common, .. } => {
                let ids = common.team_ids.unwrap();
                assert_eq!(ids, vec![TeamId::new(2), TeamId::new(52), TeamId::new(2306)]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_stats_since_date() {
        let app = CbbSync::parse_from([
            "cbb-sync",
            "stats",
            "--backend",
            "sqlite",
            "--since",
            "2026-01-15",
            "--force",
        ]);
        match app.command {
            Commands::Stats { common, stats } => {
                assert_eq!(common.backend, BackendKind::Sqlite);
                assert_eq!(
                    stats.since,
                    Some(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
                );
                assert!(stats.force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_backend() {
        let result = CbbSync::try_parse_from(["cbb-sync", "roster", "--backend", "postgres"]);
        assert!(result.is_err());
    }
}
