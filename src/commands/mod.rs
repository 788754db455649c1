//! Command handlers: one module per run type plus the shared run context.

pub mod roster;
pub mod schedule;
pub mod seed_fantasy;
pub mod stats;

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::types::{BackendKind, Season, TeamId};
use crate::cli::CommonArgs;
use crate::config::{self, RestConfig};
use crate::error::Result;
use crate::espn::EspnClient;
use crate::rest::RestStore;
use crate::storage::csv::append_status_log;
use crate::storage::SyncDatabase;
use crate::sync::RunCounts;

/// The selected persistence backend, opened and ready for writes.
pub enum Backend {
    Csv { out_dir: PathBuf },
    Sqlite(SyncDatabase),
    Rest(RestStore),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Csv { .. } => "csv",
            Backend::Sqlite(_) => "sqlite",
            Backend::Rest(_) => "rest",
        }
    }
}

/// Everything a run needs: the API client, the season, the team
/// selection, the pacing delay, and an open backend.
pub struct RunContext {
    pub client: EspnClient,
    pub season: Season,
    pub team_ids: Vec<TeamId>,
    pub backend: Backend,
    sleep: Duration,
    explicit_teams: bool,
}

impl RunContext {
    pub fn from_common(common: &CommonArgs) -> Result<Self> {
        let client = EspnClient::new(common.timeout)?;
        let explicit_teams = common.team_ids.is_some();
        let team_ids = common
            .team_ids
            .clone()
            .unwrap_or_else(config::default_team_ids);

        let backend = match common.backend {
            BackendKind::Csv => Backend::Csv {
                out_dir: common
                    .out_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(common.season.to_string())),
            },
            BackendKind::Sqlite => {
                Backend::Sqlite(SyncDatabase::new(common.db_path.as_deref())?)
            }
            BackendKind::Rest => {
                let rest_config = RestConfig::from_env()?;
                Backend::Rest(RestStore::new(&rest_config, common.timeout)?)
            }
        };

        Ok(Self {
            client,
            season: common.season,
            team_ids,
            backend,
            sleep: Duration::from_secs_f64(common.sleep.max(0.0)),
            explicit_teams,
        })
    }

    /// Courtesy delay between successive API calls.
    pub async fn pause(&self) {
        if !self.sleep.is_zero() {
            tokio::time::sleep(self.sleep).await;
        }
    }

    /// Record a finished run in the backend's log: the sync log for
    /// SQLite/REST, the status journal for CSV.
    pub async fn log_run(
        &mut self,
        run_type: &str,
        last_game_date: Option<chrono::NaiveDate>,
        counts: RunCounts,
    ) -> Result<()> {
        let details = serde_json::json!({
            "added": counts.added,
            "skipped": counts.skipped,
            "failed": counts.failed,
        })
        .to_string();

        match &mut self.backend {
            Backend::Csv { out_dir } => {
                append_status_log(out_dir, run_type, &counts.summary())?;
            }
            Backend::Sqlite(db) => {
                db.update_sync_log(run_type, last_game_date, Some(&details))?;
            }
            Backend::Rest(store) => {
                store
                    .update_sync_log(run_type, last_game_date, Some(&details))
                    .await?;
            }
        }
        Ok(())
    }
}
