//! HTTP client for the ESPN site API: shared `reqwest` client, bounded
//! retry with linear backoff, and the three endpoint helpers.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::cli::types::{GameId, Season, TeamId};
use crate::config;
use crate::error::Result;

/// Base path for men's college basketball on the ESPN site API.
pub const ESPN_BASE_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/basketball/mens-college-basketball";

use super::types::{GameSummary, RosterPayload, SchedulePayload};

pub struct EspnClient {
    client: Client,
    retries: u32,
}

impl EspnClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config::USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            retries: config::DEFAULT_RETRIES,
        })
    }

    /// GET a JSON document, retrying transient failures with linear
    /// backoff (1s, 2s, ...) before giving up on the last error.
    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = async {
                self.client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<T>()
                    .await
            }
            .await;

            match outcome {
                Ok(payload) => return Ok(payload),
                Err(err) if attempt >= self.retries => return Err(err.into()),
                Err(_) => {
                    let backoff = config::RETRY_BACKOFF_SECONDS * u64::from(attempt);
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                }
            }
        }
    }

    pub async fn team_roster(&self, team_id: TeamId, season: Season) -> Result<RosterPayload> {
        let url = format!("{ESPN_BASE_URL}/teams/{}/roster?season={}", team_id, season);
        self.fetch_json(&url).await
    }

    pub async fn team_schedule(&self, team_id: TeamId, season: Season) -> Result<SchedulePayload> {
        let url = format!(
            "{ESPN_BASE_URL}/teams/{}/schedule?season={}",
            team_id, season
        );
        self.fetch_json(&url).await
    }

    pub async fn game_summary(&self, game_id: GameId) -> Result<GameSummary> {
        let url = format!("{ESPN_BASE_URL}/summary?event={}", game_id);
        self.fetch_json(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_default_timeout() {
        let client = EspnClient::new(config::DEFAULT_TIMEOUT_SECONDS);
        assert!(client.is_ok());
    }

    #[test]
    fn endpoint_urls_are_well_formed() {
        let roster = format!(
            "{ESPN_BASE_URL}/teams/{}/roster?season={}",
            TeamId::new(52),
            Season::new(2026)
        );
        assert!(roster.ends_with("/teams/52/roster?season=2026"));

        let summary = format!("{ESPN_BASE_URL}/summary?event={}", GameId::new(401705432));
        assert!(summary.ends_with("/summary?event=401705432"));
    }
}
