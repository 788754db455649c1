//! Pure mapping from ESPN payloads to flat records.
//!
//! No I/O here: every function takes a deserialized payload and returns
//! records (or nothing, when required ids are missing). Malformed stat
//! values fall back to zero rather than failing a whole game.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::cli::types::{GameId, PlayerId, Season, TeamId};
use crate::espn::types::{
    Athlete, Event, EventStatus, GameSummary, Play, RosterPayload, SchedulePayload, TeamInfo,
};
use crate::storage::models::{
    GameRecord, PlayRecord, PlayerGameRecord, PlayerRecord, RosterRecord, TeamGameRecord,
    TeamRecord,
};

/// Lenient integer parse: `""`, `"-"`, `"--"`, and garbage all become 0.
pub fn parse_stat_int(value: Option<&str>) -> i64 {
    let value = match value {
        Some(v) => v.trim(),
        None => return 0,
    };
    if value.is_empty() || value == "-" || value == "--" {
        return 0;
    }
    value.parse().unwrap_or(0)
}

/// Parse made-attempted strings: `"10-15"` -> `(10, 15)`, `"--"` -> `(0, 0)`,
/// a bare number parses as made with zero attempts.
pub fn parse_made_attempts(value: Option<&str>) -> (i64, i64) {
    let value = match value {
        Some(v) => v.trim(),
        None => return (0, 0),
    };
    if value.is_empty() || value == "-" || value == "--" {
        return (0, 0);
    }
    match value.split_once('-') {
        Some((made, attempts)) => (parse_stat_int(Some(made)), parse_stat_int(Some(attempts))),
        None => (parse_stat_int(Some(value)), 0),
    }
}

/// Parse minutes played: `"32:15"` -> 32.25, bare numbers as-is, else 0.0.
pub fn parse_minutes(value: Option<&str>) -> f64 {
    let value = match value {
        Some(v) => v.trim(),
        None => return 0.0,
    };
    if value.is_empty() || value == "-" || value == "--" {
        return 0.0;
    }
    if let Some((mins, secs)) = value.split_once(':') {
        match (mins.parse::<f64>(), secs.parse::<f64>()) {
            (Ok(m), Ok(s)) => return m + s / 60.0,
            _ => return 0.0,
        }
    }
    value.parse().unwrap_or(0.0)
}

/// ESPN timestamps come as RFC 3339 or the truncated `2026-01-10T00:00Z`.
pub fn parse_iso_datetime(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn parse_iso_date(value: Option<&str>) -> Option<NaiveDate> {
    parse_iso_datetime(value).map(|dt| dt.date_naive())
}

/// A game is final when the status says so in any of the ways ESPN does.
pub fn is_final_status(status: Option<&EventStatus>) -> bool {
    let Some(status_type) = status.and_then(|s| s.status_type.as_ref()) else {
        return false;
    };
    let description = status_type
        .description
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let name = status_type
        .name
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let state = status_type
        .state
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    description.contains("final")
        || name.contains("status_final")
        || (status_type.completed == Some(true) && state == "post")
}

fn status_text(status: Option<&EventStatus>) -> Option<String> {
    let status_type = status.and_then(|s| s.status_type.as_ref())?;
    if let Some(description) = &status_type.description {
        return Some(description.clone());
    }
    if let Some(name) = &status_type.name {
        return Some(name.clone());
    }
    if status_type.completed == Some(true) {
        return Some("Final".to_string());
    }
    status_type.state.as_ref().map(|s| titlecase(s))
}

/// Display status with the original's fallback chain: event status first,
/// then the first competition's status.
pub fn event_status_text(event: &Event) -> Option<String> {
    status_text(event.status.as_ref()).or_else(|| {
        event
            .competitions
            .first()
            .and_then(|c| status_text(c.status.as_ref()))
    })
}

fn titlecase(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn team_record(team: &TeamInfo, fallback_id: TeamId) -> TeamRecord {
    let team_id = team.id.map(|id| TeamId::new(id as u32)).unwrap_or(fallback_id);
    let conference = team.conference.as_ref();
    TeamRecord {
        team_id,
        slug: team.slug.clone(),
        location: team.location.clone(),
        name: team.name.clone(),
        nickname: team.nickname.clone(),
        abbreviation: team.abbreviation.clone(),
        display_name: team.display_name.clone(),
        short_display_name: team.short_display_name.clone(),
        color: team.color.clone(),
        alternate_color: team.alternate_color.clone(),
        logo_url: team.logo_url(),
        conference_id: conference.and_then(|c| c.id).map(|id| id.to_string()),
        conference_name: conference.and_then(|c| c.name.clone()),
    }
}

/// Returns `None` when the athlete has no id.
pub fn player_record(athlete: &Athlete, team_id: TeamId) -> Option<PlayerRecord> {
    let player_id = PlayerId::new(athlete.id?);
    Some(PlayerRecord {
        player_id,
        team_id,
        first_name: athlete.first_name.clone(),
        last_name: athlete.last_name.clone(),
        short_name: athlete
            .short_name
            .clone()
            .or_else(|| athlete.display_name.clone()),
        short_name_abbr: athlete
            .abbreviated_name
            .clone()
            .or_else(|| athlete.short_name.clone()),
        jersey: athlete.jersey.clone(),
        position: athlete.position.as_ref().and_then(|p| {
            p.abbreviation.clone().or_else(|| p.name.clone())
        }),
        height: athlete.height,
        display_height: athlete.display_height.clone(),
        weight: athlete.weight,
        experience: athlete.experience.as_ref().and_then(|e| {
            e.display_value.clone().or_else(|| e.class.clone())
        }),
        headshot: athlete.headshot.as_ref().and_then(|h| h.href.clone()),
        is_active: athlete.active,
    })
}

/// Minimal player stub for athletes first seen in a box score.
pub fn player_stub(athlete: &Athlete, team_id: TeamId) -> Option<PlayerRecord> {
    let mut record = player_record(athlete, team_id)?;
    record.jersey = None;
    record.position = None;
    record.height = None;
    record.display_height = None;
    record.weight = None;
    record.experience = None;
    record.headshot = None;
    record.is_active = None;
    Some(record)
}

/// Team + per-player records out of one roster payload.
pub fn roster_records(
    payload: &RosterPayload,
    fallback_id: TeamId,
    season: Season,
) -> (TeamRecord, Vec<(PlayerRecord, RosterRecord)>) {
    let team = payload
        .team_info()
        .map(|info| team_record(info, fallback_id))
        .unwrap_or_else(|| TeamRecord::stub(fallback_id, None));

    let mut players = Vec::new();
    for athlete in payload.athletes() {
        let Some(record) = player_record(athlete, team.team_id) else {
            continue;
        };
        let roster = RosterRecord {
            team_id: team.team_id,
            player_id: record.player_id,
            season: season.as_u16(),
            is_active: record.is_active,
        };
        players.push((record, roster));
    }
    (team, players)
}

/// Map one schedule event to a game record; `None` when the event has no id
/// or (with `finals_only`) has not gone final.
pub fn game_record(event: &Event, season: Season, finals_only: bool) -> Option<GameRecord> {
    if finals_only && !is_final_status(event.status.as_ref()) {
        return None;
    }
    let game_id = GameId::new(event.id?);
    let competition = event.competitions.first();

    let game_datetime = parse_iso_datetime(event.date.as_deref())
        .or_else(|| parse_iso_datetime(competition.and_then(|c| c.date.as_deref())));
    let game_date = game_datetime.map(|dt| dt.date_naive());

    let find_side = |side: &str| {
        competition.and_then(|c| {
            c.competitors
                .iter()
                .find(|comp| comp.home_away.as_deref() == Some(side))
        })
    };
    let home = find_side("home");
    let away = find_side("away");
    let side_id = |comp: Option<&crate::espn::types::Competitor>| {
        comp.and_then(|c| c.team.as_ref())
            .and_then(|t| t.id)
            .map(|id| TeamId::new(id as u32))
    };
    let side_name = |comp: Option<&crate::espn::types::Competitor>| {
        comp.and_then(|c| c.team.as_ref())
            .and_then(|t| t.display_name.clone())
    };

    Some(GameRecord {
        game_id,
        game_date,
        game_datetime,
        season: Some(season.as_u16()),
        home_team_id: side_id(home),
        home_team_name: side_name(home),
        away_team_id: side_id(away),
        away_team_name: side_name(away),
        status: event_status_text(event),
        neutral_site: competition.and_then(|c| c.neutral_site),
    })
}

pub fn game_records(payload: &SchedulePayload, season: Season, finals_only: bool) -> Vec<GameRecord> {
    payload
        .events
        .iter()
        .filter_map(|event| game_record(event, season, finals_only))
        .collect()
}

/// Opponent team ids mentioned in a schedule payload, for crawl mode.
pub fn schedule_team_ids(payload: &SchedulePayload) -> Vec<TeamId> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for event in &payload.events {
        for competition in &event.competitions {
            for competitor in &competition.competitors {
                if let Some(id) = competitor.team.as_ref().and_then(|t| t.id) {
                    let id = id as u32;
                    if seen.insert(id) {
                        out.push(TeamId::new(id));
                    }
                }
            }
        }
    }
    out
}

/// A stat line plus the context needed for stub creation.
#[derive(Debug, Clone)]
pub struct StatLine {
    pub record: PlayerGameRecord,
    pub athlete: Athlete,
    pub team_name: Option<String>,
}

/// Game date from a summary: header competition first, like the original
/// feed orders it.
pub fn summary_game_date(summary: &GameSummary) -> Option<NaiveDate> {
    summary
        .header
        .as_ref()
        .and_then(|h| h.competitions.first())
        .and_then(|c| parse_iso_date(c.date.as_deref()))
}

/// Box-score player rows for teams in the allowed set. Athletes without an
/// id and teams without an id (or outside the allowed set) are dropped.
pub fn stats_rows(
    summary: &GameSummary,
    season: Season,
    game_id: GameId,
    allowed_teams: &HashSet<u32>,
) -> Vec<StatLine> {
    let game_date = summary_game_date(summary);
    let mut rows = Vec::new();

    let Some(boxscore) = summary.boxscore.as_ref() else {
        return rows;
    };

    for team_entry in &boxscore.players {
        let Some(team_id) = team_entry.team.as_ref().and_then(|t| t.id) else {
            continue;
        };
        let team_id = team_id as u32;
        if !allowed_teams.contains(&team_id) {
            continue;
        }
        let team_name = team_entry
            .team
            .as_ref()
            .and_then(|t| t.display_name.clone());

        for group in &team_entry.statistics {
            if group.labels.is_empty() {
                continue;
            }
            for line in &group.athletes {
                let Some(athlete) = line.athlete.as_ref() else {
                    continue;
                };
                let Some(player_id) = athlete.id else {
                    continue;
                };

                let stat = |label: &str| -> Option<&str> {
                    group
                        .labels
                        .iter()
                        .position(|l| l == label)
                        .and_then(|idx| line.stats.get(idx))
                        .map(|s| s.as_str())
                };

                let (fgm, fga) = parse_made_attempts(stat("FG"));
                let (tpm, tpa) = parse_made_attempts(stat("3PT"));
                let (ftm, fta) = parse_made_attempts(stat("FT"));
                let oreb = parse_stat_int(stat("OREB"));
                let dreb = parse_stat_int(stat("DREB"));
                let mut reb = parse_stat_int(stat("REB"));
                if reb == 0 && (oreb > 0 || dreb > 0) {
                    reb = oreb + dreb;
                }

                rows.push(StatLine {
                    record: PlayerGameRecord {
                        game_id,
                        player_id: PlayerId::new(player_id),
                        game_date,
                        team_id: TeamId::new(team_id),
                        pts: parse_stat_int(stat("PTS")),
                        fgm,
                        fga,
                        tpm,
                        tpa,
                        ftm,
                        fta,
                        reb,
                        ast: parse_stat_int(stat("AST")),
                        turnovers: parse_stat_int(stat("TO")),
                        stl: parse_stat_int(stat("STL")),
                        blk: parse_stat_int(stat("BLK")),
                        oreb,
                        dreb,
                        pf: parse_stat_int(stat("PF")),
                        minutes: parse_minutes(stat("MIN")),
                        season: Some(season.as_u16()),
                    },
                    athlete: athlete.clone(),
                    team_name: team_name.clone(),
                });
            }
        }
    }

    rows
}

/// Sum player lines into per-team totals, preserving first-seen team order.
pub fn team_totals(rows: &[StatLine]) -> Vec<TeamGameRecord> {
    let mut totals: Vec<TeamGameRecord> = Vec::new();
    for line in rows {
        let record = &line.record;
        let position = totals
            .iter()
            .position(|t| t.team_id == record.team_id && t.game_id == record.game_id);
        let idx = match position {
            Some(idx) => idx,
            None => {
                totals.push(TeamGameRecord {
                    game_id: record.game_id,
                    team_id: record.team_id,
                    team_name: line.team_name.clone(),
                    game_date: record.game_date,
                    pts: 0,
                    fgm: 0,
                    fga: 0,
                    tpm: 0,
                    tpa: 0,
                    ftm: 0,
                    fta: 0,
                    reb: 0,
                    ast: 0,
                    turnovers: 0,
                    stl: 0,
                    blk: 0,
                    oreb: 0,
                    dreb: 0,
                    pf: 0,
                    minutes: 0.0,
                });
                totals.len() - 1
            }
        };
        let entry = &mut totals[idx];
        entry.pts += record.pts;
        entry.fgm += record.fgm;
        entry.fga += record.fga;
        entry.tpm += record.tpm;
        entry.tpa += record.tpa;
        entry.ftm += record.ftm;
        entry.fta += record.fta;
        entry.reb += record.reb;
        entry.ast += record.ast;
        entry.turnovers += record.turnovers;
        entry.stl += record.stl;
        entry.blk += record.blk;
        entry.oreb += record.oreb;
        entry.dreb += record.dreb;
        entry.pf += record.pf;
        entry.minutes += record.minutes;
    }
    totals
}

/// Play-by-play rows keyed by `(game_id, play_index)`.
pub fn play_records(summary: &GameSummary, game_id: GameId) -> Vec<PlayRecord> {
    summary
        .plays
        .iter()
        .enumerate()
        .map(|(idx, play)| play_record(play, game_id, idx as u32))
        .collect()
}

fn play_record(play: &Play, game_id: GameId, play_index: u32) -> PlayRecord {
    let player_ids = play
        .participants
        .iter()
        .filter_map(|p| p.athlete.as_ref().and_then(|a| a.id))
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    PlayRecord {
        game_id,
        play_index,
        play_id: play
            .id
            .clone()
            .or_else(|| play.sequence_number.clone())
            .unwrap_or_default(),
        type_id: play
            .play_type
            .as_ref()
            .and_then(|t| t.id)
            .map(|id| id.to_string())
            .unwrap_or_default(),
        type_text: play
            .play_type
            .as_ref()
            .and_then(|t| t.text.clone())
            .unwrap_or_default(),
        play_text: play.text.clone().unwrap_or_default(),
        away_score: play.away_score,
        home_score: play.home_score,
        period: play.period.as_ref().and_then(|p| p.number),
        period_display: play
            .period
            .as_ref()
            .and_then(|p| p.display_value.clone())
            .unwrap_or_default(),
        clock: play
            .clock
            .as_ref()
            .and_then(|c| c.display_value.clone())
            .unwrap_or_default(),
        team_id: play
            .team
            .as_ref()
            .and_then(|t| t.id)
            .map(|id| TeamId::new(id as u32)),
        player_ids,
        coord_x: play.coordinate.as_ref().and_then(|c| c.x),
        coord_y: play.coordinate.as_ref().and_then(|c| c.y),
    }
}
