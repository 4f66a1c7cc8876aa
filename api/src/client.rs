use crate::espn::{ScoreboardResponse, SummaryResponse};
use crate::feed::{GameState, from_event_parts};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const ESPN_SITE_V2: &str = "https://site.api.espn.com/apis/site/v2/sports/football";
pub const DEFAULT_LEAGUE: &str = "nfl";

/// Score feed client backed by ESPN's public site API.
#[derive(Debug, Clone)]
pub struct EspnClient {
    client: Client,
    base_url: String,
    league: String,
    timeout: Duration,
}

impl Default for EspnClient {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("squares/0.1 (squares pool scorer)")
                .build()
                .unwrap_or_default(),
            base_url: ESPN_SITE_V2.to_owned(),
            league: DEFAULT_LEAGUE.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// One scoreboard entry, for picking the event a pool is played on.
#[derive(Debug, Clone, Default)]
pub struct ScoreboardGame {
    pub id: String,
    pub name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub state: GameState,
}

impl EspnClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at another host, e.g. a mock server or a mirror.
    /// `base_url` is everything before the league segment.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// ESPN league slug under football: "nfl", "college-football", ...
    pub fn with_league(mut self, league: impl Into<String>) -> Self {
        self.league = league.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch one game's state (status, drives, linescores) from the summary
    /// endpoint.
    pub async fn fetch_game_state(&self, event_id: &str) -> ApiResult<GameState> {
        let url = format!("{}/{}/summary?event={event_id}", self.base_url, self.league);
        let raw: SummaryResponse = self.get(&url).await?;
        let Some(header) = raw.header else {
            return Err(ApiError::NotFound(format!("no game found for event {event_id}")));
        };
        Ok(crate::espn::SummaryFeed { header, drives: raw.drives }.into())
    }

    /// Fetch today's scoreboard for the configured league.
    pub async fn fetch_scoreboard(&self) -> ApiResult<Vec<ScoreboardGame>> {
        let url = format!("{}/{}/scoreboard", self.base_url, self.league);
        let raw: ScoreboardResponse = self.get(&url).await?;
        let games = raw
            .events
            .unwrap_or_default()
            .iter()
            .map(|event| ScoreboardGame {
                id: event.id.clone().unwrap_or_default(),
                name: event
                    .short_name
                    .clone()
                    .or_else(|| event.name.clone())
                    .unwrap_or_default(),
                start_time: event
                    .date
                    .as_deref()
                    .and_then(parse_event_date)
                    .map(|dt| dt.with_timezone(&Utc)),
                state: from_event_parts(
                    event.status.as_ref(),
                    event.competitions.as_deref().and_then(|c| c.first()),
                ),
            })
            .collect();
        Ok(games)
    }

    async fn get<T: Default + serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => {
                if e.status().map(|s| s.is_client_error()).unwrap_or(false) {
                    Ok(T::default())
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }
}

/// ESPN event dates are RFC 3339 but usually drop the seconds ("2025-02-09T23:30Z").
fn parse_event_date(s: &str) -> Option<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%#z"))
        .ok()
}
