use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, Board};
use chrono::Local;
use log::warn;
use squares_api::QuarterScore;
use squares_api::feed::{GameState, active_quarter, completed_quarters, visible_scores};
use squares_api::payouts::{PoolBreakdown, calculate_payouts};
use squares_api::store::PoolRow;

/// Quarters always shown on the board, whether or not they've been played.
const REGULATION_QUARTERS: usize = 4;

pub struct App {
    pub settings: AppSettings,
    pub pool: PoolRow,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings, pool: PoolRow) -> Self {
        Self { settings, pool, state: AppState::default() }
    }

    // -----------------------------------------------------------------------
    // Network response handlers: called from the watch loop
    // -----------------------------------------------------------------------

    pub fn on_game_state_loaded(&mut self, game: GameState) {
        self.state.last_error = None;
        self.state.last_updated = Some(Local::now());
        self.state.game = Some(game);
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    pub fn is_final(&self) -> bool {
        self.state.game.as_ref().is_some_and(GameState::is_final)
    }

    /// Whether team 1 (the Y axis) is the home side: command-line override,
    /// then the pool's stored flag, then the feed's competitors. Defaults to
    /// home when nothing says otherwise.
    pub fn is_team1_home(&self) -> bool {
        if let Some(home) = self.state.team1_home_override.or(self.pool.team1_home) {
            return home;
        }
        let from_feed = self
            .pool
            .team1
            .as_deref()
            .zip(self.state.game.as_ref())
            .and_then(|(team, game)| game.is_team_home(team));
        match from_feed {
            Some(home) => home,
            None => {
                if let (Some(team), Some(_)) = (&self.pool.team1, &self.state.game) {
                    warn!("team1 {team:?} matches neither competitor, assuming home");
                }
                true
            }
        }
    }

    /// Run the whole pipeline on the current inputs.
    ///
    /// With a feed, scores come from the feed's linescores (or the pool's
    /// stored scores when the feed has none) and only officially finished
    /// quarters are revealed. Without one, the stored scores are used as-is.
    /// Regulation quarters not yet reached are listed as pending so the pool
    /// is always split four ways or more.
    pub fn board(&self) -> Board {
        let (phase, active, completed, mut scores) = match &self.state.game {
            Some(game) => {
                let completed = completed_quarters(game);
                let feed_scores = game.quarter_scores();
                let source = if feed_scores.is_empty() { &self.pool.quarter_scores } else { &feed_scores };
                (
                    game.phase.label().to_owned(),
                    active_quarter(game),
                    Some(completed),
                    visible_scores(source, completed).to_vec(),
                )
            }
            None => ("stored".to_owned(), None, None, self.pool.quarter_scores.clone()),
        };
        if scores.len() < REGULATION_QUARTERS {
            scores.resize(REGULATION_QUARTERS, QuarterScore::pending());
        }

        let team1_home = self.is_team1_home();
        let winners = self.pool.winners_for(&scores, team1_home);
        let price = self.pool.price_per_square();
        let squares = self.pool.total_squares();
        let payouts = calculate_payouts(&winners, &self.pool.roster(), price, squares);
        let breakdown = PoolBreakdown::new(&winners, &payouts, price, squares);

        Board {
            phase,
            active_quarter: active,
            completed_quarters: completed,
            team1_home,
            scores,
            winners,
            payouts,
            breakdown,
        }
    }
}
