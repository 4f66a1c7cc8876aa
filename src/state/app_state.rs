use chrono::{DateTime, Local};
use squares_api::QuarterScore;
use squares_api::QuarterWinner;
use squares_api::feed::GameState;
use squares_api::payouts::PoolBreakdown;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Live game state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    /// Latest state from the feed; `None` when scoring from stored scores only.
    pub game: Option<GameState>,
    pub last_updated: Option<DateTime<Local>>,
    pub last_error: Option<String>,
    /// Orientation forced from the command line, wins over everything else.
    pub team1_home_override: Option<bool>,
}

// ---------------------------------------------------------------------------
// Board: one full pass of the scoring pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Board {
    pub phase: String,
    pub active_quarter: Option<u32>,
    pub completed_quarters: Option<u32>,
    pub team1_home: bool,
    /// Scores fed to winner determination, one per reported quarter.
    pub scores: Vec<QuarterScore>,
    pub winners: Vec<QuarterWinner>,
    pub payouts: BTreeMap<String, f64>,
    pub breakdown: PoolBreakdown,
}
