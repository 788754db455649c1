//! Serde models for the ESPN site API payloads.
//!
//! ESPN is loose with types: ids arrive as strings or numbers depending on
//! the endpoint, and most fields can be absent. Everything here defaults
//! instead of failing so one malformed entity never sinks a whole payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept an id as either a JSON number or a numeric string.
fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Deserialize::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Accept a numeric field that may arrive as a string.
fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Deserialize::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logo {
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub short_display_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub alternate_color: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub logos: Vec<Logo>,
    #[serde(default)]
    pub conference: Option<Conference>,
}

impl TeamInfo {
    /// First logo href, falling back to the flat `logo` field.
    pub fn logo_url(&self) -> Option<String> {
        self.logos
            .first()
            .and_then(|l| l.href.clone())
            .or_else(|| self.logo.clone())
    }
}

/// The roster endpoint sometimes wraps the team a second time
/// (`{"team": {"team": {...}}}`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamNode {
    #[serde(flatten)]
    pub info: TeamInfo,
    #[serde(default)]
    pub team: Option<Box<TeamInfo>>,
}

impl TeamNode {
    pub fn resolve(&self) -> &TeamInfo {
        self.team.as_deref().unwrap_or(&self.info)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default)]
    pub display_value: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headshot {
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Athlete {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub abbreviated_name: Option<String>,
    #[serde(default)]
    pub jersey: Option<String>,
    #[serde(default)]
    pub position: Option<PositionInfo>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub height: Option<f64>,
    #[serde(default)]
    pub display_height: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub experience: Option<Experience>,
    #[serde(default)]
    pub headshot: Option<Headshot>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Roster payloads list athletes either flat or grouped into
/// `{"items": [...]}` buckets, depending on the sport and season.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AthleteEntry {
    // `items` must stay required so flat athlete objects fall through
    // to `Single` instead of matching here with an empty group.
    Group { items: Vec<Athlete> },
    Single(Athlete),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterPayload {
    #[serde(default)]
    pub team: Option<TeamNode>,
    #[serde(default)]
    pub athletes: Vec<AthleteEntry>,
}

impl RosterPayload {
    pub fn team_info(&self) -> Option<&TeamInfo> {
        self.team.as_ref().map(|node| node.resolve())
    }

    /// Flatten grouped and flat athlete entries into one iterator.
    pub fn athletes(&self) -> impl Iterator<Item = &Athlete> {
        self.athletes.iter().flat_map(|entry| match entry {
            AthleteEntry::Group { items } => items.iter().collect::<Vec<_>>(),
            AthleteEntry::Single(athlete) => vec![athlete],
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusType {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventStatus {
    #[serde(rename = "type", default)]
    pub status_type: Option<StatusType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    #[serde(default)]
    pub home_away: Option<String>,
    #[serde(default)]
    pub team: Option<TeamInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub neutral_site: Option<bool>,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Event {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub competitions: Vec<Competition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulePayload {
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AthleteLine {
    #[serde(default)]
    pub athlete: Option<Athlete>,
    #[serde(default)]
    pub stats: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatGroup {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub athletes: Vec<AthleteLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamBoxscore {
    #[serde(default)]
    pub team: Option<TeamInfo>,
    #[serde(default)]
    pub statistics: Vec<StatGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Boxscore {
    #[serde(default)]
    pub players: Vec<TeamBoxscore>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryHeader {
    #[serde(default)]
    pub competitions: Vec<Competition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayType {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayPeriod {
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub display_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayClock {
    #[serde(default)]
    pub display_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamRef {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub athlete: Option<Athlete>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Play {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sequence_number: Option<String>,
    #[serde(rename = "type", default)]
    pub play_type: Option<PlayType>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub away_score: Option<i64>,
    #[serde(default)]
    pub home_score: Option<i64>,
    #[serde(default)]
    pub period: Option<PlayPeriod>,
    #[serde(default)]
    pub clock: Option<PlayClock>,
    #[serde(default)]
    pub team: Option<TeamRef>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    #[serde(default)]
    pub header: Option<SummaryHeader>,
    #[serde(default)]
    pub boxscore: Option<Boxscore>,
    #[serde(default)]
    pub plays: Vec<Play>,
}

impl GameSummary {
    /// The completed flag lives on the header competition's status.
    pub fn is_completed(&self) -> bool {
        self.header
            .as_ref()
            .and_then(|h| h.competitions.first())
            .and_then(|c| c.status.as_ref())
            .and_then(|s| s.status_type.as_ref())
            .and_then(|t| t.completed)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_deserialize_from_strings_and_numbers() {
        let as_string: TeamInfo = serde_json::from_str(r#"{"id": "52"}"#).unwrap();
        let as_number: TeamInfo = serde_json::from_str(r#"{"id": 52}"#).unwrap();
        assert_eq!(as_string.id, Some(52));
        assert_eq!(as_number.id, Some(52));

        let junk: TeamInfo = serde_json::from_str(r#"{"id": "n/a"}"#).unwrap();
        assert_eq!(junk.id, None);
    }

    #[test]
    fn roster_payload_unwraps_nested_team() {
        let payload: RosterPayload = serde_json::from_str(
            r#"{"team": {"team": {"id": 52, "displayName": "Florida Gators"}}}"#,
        )
        .unwrap();
        let team = payload.team_info().unwrap();
        assert_eq!(team.id, Some(52));
        assert_eq!(team.display_name.as_deref(), Some("Florida Gators"));
    }

    #[test]
    fn roster_payload_flattens_grouped_athletes() {
        let payload: RosterPayload = serde_json::from_str(
            r#"{"athletes": [
                {"items": [{"id": 1}, {"id": 2}]},
                {"id": 3, "firstName": "Walter"}
            ]}"#,
        )
        .unwrap();
        let ids: Vec<_> = payload.athletes().filter_map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn summary_completion_requires_header_flag() {
        let done: GameSummary = serde_json::from_str(
            r#"{"header": {"competitions": [{"status": {"type": {"completed": true}}}]}}"#,
        )
        .unwrap();
        assert!(done.is_completed());

        let pending: GameSummary = serde_json::from_str(r#"{"boxscore": {"players": []}}"#).unwrap();
        assert!(!pending.is_completed());
    }

    #[test]
    fn missing_fields_default_instead_of_failing() {
        let event: Event = serde_json::from_str(r#"{}"#).unwrap();
        assert!(event.id.is_none());
        assert!(event.competitions.is_empty());

        let play: Play = serde_json::from_str(r#"{"text": "Jumper made"}"#).unwrap();
        assert_eq!(play.text.as_deref(), Some("Jumper made"));
        assert!(play.participants.is_empty());
    }
}
