use log::LevelFilter;
use squares_api::client::{DEFAULT_LEAGUE, ESPN_SITE_V2};
use std::time::Duration;

const DEFAULT_REFRESH_SECS: u64 = 30;
/// ESPN rate-limits aggressive pollers; never refresh faster than this.
const MIN_REFRESH_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub espn_url: String,
    pub league: String,
    pub refresh_interval: Duration,
    pub log_level: Option<LevelFilter>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            espn_url: ESPN_SITE_V2.to_owned(),
            league: DEFAULT_LEAGUE.to_owned(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            log_level: None,
        }
    }
}

impl AppSettings {
    /// Defaults overridden by `SQUARES_ESPN_URL`, `SQUARES_LEAGUE` and
    /// `SQUARES_REFRESH_SECS`. Command-line flags are applied on top.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        if let Some(url) = get("SQUARES_ESPN_URL") {
            settings.espn_url = url;
        }
        if let Some(league) = get("SQUARES_LEAGUE") {
            settings.league = league;
        }
        if let Some(secs) = get("SQUARES_REFRESH_SECS").and_then(|s| s.parse::<u64>().ok()) {
            settings.set_refresh_secs(secs);
        }
        settings
    }

    pub fn set_refresh_secs(&mut self, secs: u64) {
        self.refresh_interval = Duration::from_secs(secs.max(MIN_REFRESH_SECS));
    }

    /// `-v` count → log level; no flag leaves the default filter alone.
    pub fn set_verbosity(&mut self, verbose: u8) {
        self.log_level = match verbose {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            _ => Some(LevelFilter::Trace),
        };
    }
}
