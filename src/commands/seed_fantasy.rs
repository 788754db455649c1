//! Seed the fantasy league tables from the built-in team list.

use std::collections::HashMap;

use crate::config::FANTASY_TEAMS;
use crate::error::{Result, SyncError};
use crate::storage::models::{FantasyTeamRecord, FantasyTeamSeasonRecord};
use crate::sync::RunCounts;

use super::{Backend, RunContext};

pub async fn run_seed_fantasy(ctx: &mut RunContext, draft_order: Option<&str>) -> Result<RunCounts> {
    let teams: Vec<FantasyTeamRecord> = FANTASY_TEAMS
        .iter()
        .map(|seed| FantasyTeamRecord {
            fantasy_team_id: seed.id,
            name: seed.name.to_string(),
            short_code: seed.short_code.to_string(),
            logo_url: None,
        })
        .collect();

    let order = parse_draft_order(draft_order)?;
    let seasons: Vec<FantasyTeamSeasonRecord> = FANTASY_TEAMS
        .iter()
        .map(|seed| FantasyTeamSeasonRecord {
            season: ctx.season.as_u16(),
            fantasy_team_id: seed.id,
            draft_order: order.get(seed.short_code).copied().unwrap_or(seed.id),
        })
        .collect();

    let stored = match &mut ctx.backend {
        Backend::Csv { .. } => {
            return Err(SyncError::Storage {
                message: "seed-fantasy requires the sqlite or rest backend".to_string(),
            });
        }
        Backend::Sqlite(db) => db.store_fantasy_teams(&teams, &seasons)?,
        Backend::Rest(store) => {
            store
                .upsert("fantasy_teams", &teams, "fantasy_team_id")
                .await?;
            store
                .upsert("fantasy_team_seasons", &seasons, "season,fantasy_team_id")
                .await?;
            teams.len()
        }
    };

    let counts = RunCounts {
        added: stored,
        ..RunCounts::default()
    };
    println!("✓ seeded {stored} fantasy teams for season {}", ctx.season);
    Ok(counts)
}

/// Parse `MB=1,AS=2` into short-code to draft-slot assignments.
fn parse_draft_order(raw: Option<&str>) -> Result<HashMap<String, u32>> {
    let mut order = HashMap::new();
    let Some(raw) = raw else {
        return Ok(order);
    };
    for pair in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let Some((code, slot)) = pair.split_once('=') else {
            return Err(SyncError::Storage {
                message: format!("invalid draft order entry {pair:?}; expected CODE=N"),
            });
        };
        let code = code.trim().to_uppercase();
        if !FANTASY_TEAMS.iter().any(|t| t.short_code == code) {
            return Err(SyncError::Storage {
                message: format!("unknown fantasy team code {code:?}"),
            });
        }
        let slot: u32 = slot.trim().parse()?;
        order.insert(code, slot);
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_order_parses_pairs() {
        let order = parse_draft_order(Some("MB=3, as=1")).unwrap();
        assert_eq!(order.get("MB"), Some(&3));
        assert_eq!(order.get("AS"), Some(&1));
    }

    #[test]
    fn draft_order_rejects_unknown_codes() {
        assert!(parse_draft_order(Some("XX=1")).is_err());
        assert!(parse_draft_order(Some("MB")).is_err());
        assert!(parse_draft_order(None).unwrap().is_empty());
    }
}
