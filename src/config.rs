//! Static configuration: the tracked team set, fantasy league seed data,
//! request defaults, and environment resolution.

use std::collections::HashSet;

use crate::cli::types::TeamId;
use crate::error::{Result, SyncError};

/// User agent sent on every ESPN request.
pub const USER_AGENT: &str = "cbb-sync/0.1";

/// Courtesy delay between successive API calls, in seconds.
pub const DEFAULT_SLEEP_SECONDS: f64 = 1.0;

/// Per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 20;

/// Attempts per request before an error propagates.
pub const DEFAULT_RETRIES: u32 = 3;

/// Linear backoff unit between retries, in seconds.
pub const RETRY_BACKOFF_SECONDS: u64 = 1;

/// REST proxy base URL, e.g. `https://xyz.supabase.co`.
pub const REST_URL_ENV_VAR: &str = "CBB_SYNC_REST_URL";

/// Service key for REST proxy writes.
pub const REST_KEY_ENV_VAR: &str = "CBB_SYNC_REST_KEY";

/// Optional override for the SQLite database path.
pub const DB_PATH_ENV_VAR: &str = "CBB_SYNC_DB";

/// ESPN team ids this collector tracks. Stats sync never emits rows for
/// teams outside this set.
pub const AVAILABLE_TEAMS: &[u32] = &[
    2, 5, 8, 9, 12, 24, 25, 26, 30, 38, 41, 46, 52, 57, 58, 59, 61, 66, 77, 84, 87, 96, 97, 99,
    103, 120, 127, 130, 135, 142, 145, 150, 151, 152, 153, 154, 156, 158, 164, 183, 194, 197, 201,
    202, 213, 218, 221, 222, 228, 235, 238, 239, 242, 245, 248, 249, 251, 252, 254, 258, 259, 264,
    269, 275, 277, 305, 333, 344, 356, 2086, 2116, 2132, 2226, 2294, 2305, 2306, 2390, 2429, 2483,
    2507, 2509, 2550, 2567, 2579, 2599, 2628, 2633, 2636, 2641, 2655, 2724, 2752,
];

/// Seed data for the fantasy league tables.
#[derive(Debug, Clone, Copy)]
pub struct FantasyTeamSeed {
    pub id: u32,
    pub name: &'static str,
    pub short_code: &'static str,
}

pub const FANTASY_TEAMS: &[FantasyTeamSeed] = &[
    FantasyTeamSeed {
        id: 1,
        name: "Moon Ballers",
        short_code: "MB",
    },
    FantasyTeamSeed {
        id: 2,
        name: "Alley Scoops",
        short_code: "AS",
    },
    FantasyTeamSeed {
        id: 3,
        name: "Pick Six",
        short_code: "PS",
    },
    FantasyTeamSeed {
        id: 4,
        name: "Glass Cleaners",
        short_code: "GC",
    },
    FantasyTeamSeed {
        id: 5,
        name: "Full Court Press",
        short_code: "FCP",
    },
    FantasyTeamSeed {
        id: 6,
        name: "Bench Mob",
        short_code: "BM",
    },
    FantasyTeamSeed {
        id: 7,
        name: "Downtown Daggers",
        short_code: "DD",
    },
    FantasyTeamSeed {
        id: 8,
        name: "The Rim Runners",
        short_code: "RR",
    },
];

/// Load `.env.local` then `.env`, without clobbering real environment vars.
pub fn load_env() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();
}

/// Default team selection as typed ids.
pub fn default_team_ids() -> Vec<TeamId> {
    AVAILABLE_TEAMS.iter().copied().map(TeamId::new).collect()
}

/// Allowed team set used to gate stats extraction.
pub fn allowed_team_set() -> HashSet<u32> {
    AVAILABLE_TEAMS.iter().copied().collect()
}

/// Credentials for the REST upsert proxy, resolved from the environment.
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: String,
}

impl RestConfig {
    /// Fails fast before any network call when either variable is missing.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(REST_URL_ENV_VAR).map_err(|_| SyncError::MissingEnv {
            var: REST_URL_ENV_VAR.to_string(),
        })?;
        let api_key = std::env::var(REST_KEY_ENV_VAR).map_err(|_| SyncError::MissingEnv {
            var: REST_KEY_ENV_VAR.to_string(),
        })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_set_matches_team_list() {
        let set = allowed_team_set();
        assert_eq!(set.len(), AVAILABLE_TEAMS.len());
        assert!(set.contains(&2));
        assert!(set.contains(&2752));
        assert!(!set.contains(&1));
    }

    #[test]
    fn fantasy_short_codes_are_unique() {
        let mut codes: Vec<_> = FANTASY_TEAMS.iter().map(|t| t.short_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), FANTASY_TEAMS.len());
    }

    #[test]
    fn rest_config_trims_trailing_slash() {
        std::env::set_var(REST_URL_ENV_VAR, "https://example.test/");
        std::env::set_var(REST_KEY_ENV_VAR, "key");
        let cfg = RestConfig::from_env().unwrap();
        assert_eq!(cfg.base_url, "https://example.test");
        std::env::remove_var(REST_URL_ENV_VAR);
        std::env::remove_var(REST_KEY_ENV_VAR);
    }
}
