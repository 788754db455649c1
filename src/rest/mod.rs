//! PostgREST-style remote backend.
//!
//! Writes go through `POST /rest/v1/{table}?on_conflict=...` with the
//! merge-duplicates preference, so semantics match the SQLite upserts.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::cli::types::GameId;
use crate::config::RestConfig;
use crate::error::{Result, SyncError};
use crate::storage::models::SyncLogEntry;

const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";
const INSERT_IGNORE_PREFER: &str = "resolution=ignore-duplicates,return=minimal";

pub struct RestStore {
    client: Client,
    base_url: String,
}

impl RestStore {
    pub fn new(config: &RestConfig, timeout_secs: u64) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&config.api_key).map_err(|_| SyncError::Storage {
            message: "REST api key contains invalid header characters".to_string(),
        })?;
        key.set_sensitive(true);
        headers.insert("apikey", key.clone());
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(
            |_| SyncError::Storage {
                message: "REST api key contains invalid header characters".to_string(),
            },
        )?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn check(method: &str, url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(SyncError::Rest {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            detail,
        })
    }

    async fn post_rows<T: Serialize>(
        &self,
        table: &str,
        rows: &[T],
        conflict_cols: &str,
        prefer: &str,
    ) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let url = format!("{}?on_conflict={}", self.table_url(table), conflict_cols);
        let response = self
            .client
            .post(&url)
            .header("Prefer", prefer)
            .json(rows)
            .send()
            .await?;
        Self::check("POST", &url, response).await?;
        Ok(())
    }

    /// Upsert rows, overwriting non-key columns on conflict.
    pub async fn upsert<T: Serialize>(
        &self,
        table: &str,
        rows: &[T],
        conflict_cols: &str,
    ) -> Result<()> {
        self.post_rows(table, rows, conflict_cols, UPSERT_PREFER).await
    }

    /// Insert rows, leaving existing ones untouched on conflict. Used for
    /// team and player stubs so stat rows never overwrite roster data.
    pub async fn insert_missing<T: Serialize>(
        &self,
        table: &str,
        rows: &[T],
        conflict_cols: &str,
    ) -> Result<()> {
        self.post_rows(table, rows, conflict_cols, INSERT_IGNORE_PREFER)
            .await
    }

    async fn select(&self, table: &str, query: &str) -> Result<Vec<Value>> {
        let url = format!("{}?{}", self.table_url(table), query);
        let response = self.client.get(&url).send().await?;
        let response = Self::check("GET", &url, response).await?;
        Ok(response.json().await?)
    }

    /// Whether any stat line exists for a game.
    pub async fn has_player_games(&self, game_id: GameId) -> Result<bool> {
        let rows = self
            .select(
                "player_games",
                &format!("select=player_id&game_id=eq.{}&limit=1", game_id),
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Final game ids inside a date window, oldest first.
    pub async fn game_ids_between(
        &self,
        start: Option<NaiveDate>,
        up_to: NaiveDate,
    ) -> Result<Vec<GameId>> {
        let mut query = format!(
            "select=game_id&game_date=lte.{}&order=game_date.asc,game_id.asc",
            up_to
        );
        if let Some(start) = start {
            query.push_str(&format!("&game_date=gte.{start}"));
        }
        let rows = self.select("games", &query).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("game_id").and_then(Value::as_u64))
            .map(GameId::new)
            .collect())
    }

    pub async fn get_last_run(&self, run_type: &str) -> Result<Option<SyncLogEntry>> {
        let rows = self
            .select("sync_log", &format!("select=*&run_type=eq.{run_type}&limit=1"))
            .await?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(row)?))
    }

    /// Record a run's watermark. A `None` game date keeps the previous
    /// watermark so an empty window never moves it backwards.
    pub async fn update_sync_log(
        &self,
        run_type: &str,
        last_game_date: Option<NaiveDate>,
        details: Option<&str>,
    ) -> Result<()> {
        let last_game_date = match last_game_date {
            Some(date) => Some(date),
            None => self
                .get_last_run(run_type)
                .await?
                .and_then(|entry| entry.last_game_date),
        };
        let entry = SyncLogEntry {
            run_type: run_type.to_string(),
            last_run_at: Utc::now(),
            last_game_date,
            details: details.map(|d| d.to_string()),
        };
        self.upsert("sync_log", &[entry], "run_type").await
    }
}
