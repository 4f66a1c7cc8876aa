/// ESPN API raw wire types: serde shapes for deserializing ESPN responses.
/// These map to the normalized `GameState` via the adapters in feed.rs.
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;

/// Deserialize an optional field, turning a malformed value into `None`
/// instead of failing the whole document.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ---------------------------------------------------------------------------
// Game status
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnStatus {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub status_type: Option<EspnStatusType>,
    #[serde(default, deserialize_with = "lenient")]
    pub period: Option<i64>,
    #[serde(rename = "displayClock", default, deserialize_with = "lenient")]
    pub display_clock: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnStatusType {
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>, // "pre" | "in" | "post"
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>, // "STATUS_SCHEDULED", "STATUS_IN_PROGRESS", "STATUS_FINAL"
    #[serde(default, deserialize_with = "lenient")]
    pub completed: Option<bool>,
}

// ---------------------------------------------------------------------------
// Drives  (summary API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnDrives {
    #[serde(default, deserialize_with = "lenient")]
    pub previous: Option<Vec<EspnDrive>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnDrive {
    #[serde(default, deserialize_with = "lenient")]
    pub end: Option<EspnDriveEnd>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnDriveEnd {
    #[serde(default, deserialize_with = "lenient")]
    pub period: Option<EspnPeriod>,
    #[serde(default, deserialize_with = "lenient")]
    pub clock: Option<EspnClock>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnPeriod {
    #[serde(default, deserialize_with = "lenient")]
    pub number: Option<i64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnClock {
    #[serde(rename = "displayValue", default, deserialize_with = "lenient")]
    pub display_value: Option<String>,
}

// ---------------------------------------------------------------------------
// Competitions and competitors
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnCompetition {
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<EspnStatus>,
    #[serde(default, deserialize_with = "lenient")]
    pub competitors: Option<Vec<EspnCompetitor>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnCompetitor {
    #[serde(rename = "homeAway", default, deserialize_with = "lenient")]
    pub home_away: Option<String>, // "home" | "away"
    #[serde(default, deserialize_with = "lenient")]
    pub team: Option<EspnTeam>,
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<String>, // ESPN sends scores as strings
    #[serde(default, deserialize_with = "lenient")]
    pub linescores: Option<Vec<EspnLinescore>>,
}

impl EspnCompetitor {
    pub fn is_home(&self) -> bool {
        self.home_away.as_deref() == Some("home")
    }

    pub fn is_away(&self) -> bool {
        self.home_away.as_deref() == Some("away")
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnTeam {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(rename = "displayName", default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
    #[serde(rename = "shortDisplayName", default, deserialize_with = "lenient")]
    pub short_display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub abbreviation: Option<String>,
}

/// Points scored in one period. The scoreboard sends `value` as a number,
/// the summary header sends `displayValue` as a string.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnLinescore {
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<f64>,
    #[serde(rename = "displayValue", default, deserialize_with = "lenient")]
    pub display_value: Option<String>,
}

impl EspnLinescore {
    pub fn points(&self) -> Option<u32> {
        match self.value {
            Some(v) if v.is_finite() && v >= 0.0 => Some(v as u32),
            _ => self.display_value.as_deref()?.trim().parse().ok(),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses  (site v2 API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SummaryResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub header: Option<EspnHeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub drives: Option<EspnDrives>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnHeader {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub competitions: Option<Vec<EspnCompetition>>,
}

// ---------------------------------------------------------------------------
// Game-state documents: the shapes a score feed hands us for one game
// ---------------------------------------------------------------------------

/// A single game's state in whichever shape the provider sent it.
/// Variants are tried in order; each requires the field that identifies it
/// to be present, but a malformed value there only blanks that field so
/// `drives` still comes through.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum EspnGameFeed {
    /// Raw summary response: `header.competitions[0].status` plus `drives`.
    Summary(SummaryFeed),
    /// Nested shape: `competitions[0].status` plus `drives`.
    Competition(CompetitionFeed),
    /// Flat shape: top-level `status` plus `drives`.
    Flat(FlatFeed),
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummaryFeed {
    pub header: EspnHeader,
    #[serde(default, deserialize_with = "lenient")]
    pub drives: Option<EspnDrives>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CompetitionFeed {
    // present-but-malformed is None; absent moves on to the flat shape
    #[serde(deserialize_with = "lenient")]
    pub competitions: Option<Vec<EspnCompetition>>,
    /// Event-level status, used when the competition carries none.
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<EspnStatus>,
    #[serde(default, deserialize_with = "lenient")]
    pub drives: Option<EspnDrives>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FlatFeed {
    #[serde(deserialize_with = "lenient")]
    pub status: Option<EspnStatus>,
    #[serde(default, deserialize_with = "lenient")]
    pub competitors: Option<Vec<EspnCompetitor>>,
    #[serde(default, deserialize_with = "lenient")]
    pub drives: Option<EspnDrives>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScoreboardResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub events: Option<Vec<EspnEvent>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(rename = "shortName", default, deserialize_with = "lenient")]
    pub short_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>, // ISO 8601
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<EspnStatus>,
    #[serde(default, deserialize_with = "lenient")]
    pub competitions: Option<Vec<EspnCompetition>>,
}
