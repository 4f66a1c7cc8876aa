//! Normalized game state and the quarter progress rules built on it.
//!
//! Each provider shape in [`EspnGameFeed`] has its own adapter into
//! [`GameState`]; everything downstream reads only the normalized form.
use crate::QuarterScore;
use crate::espn::{
    CompetitionFeed, EspnCompetition, EspnCompetitor, EspnDrives, EspnGameFeed, EspnStatus,
    FlatFeed, SummaryFeed,
};
use log::debug;
use serde::Deserialize;

/// Clock reading ESPN reports on a drive that ran out the period.
const END_OF_PERIOD_CLOCK: &str = "0:00";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GamePhase {
    Pre,
    In,
    Post,
    /// Any state string we don't recognize.
    Other(String),
    /// No state reported at all.
    #[default]
    Unknown,
}

impl GamePhase {
    fn parse(state: Option<&str>) -> Self {
        match state {
            Some("pre") => GamePhase::Pre,
            Some("in") => GamePhase::In,
            Some("post") => GamePhase::Post,
            Some(other) => GamePhase::Other(other.to_owned()),
            None => GamePhase::Unknown,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            GamePhase::Pre => "scheduled",
            GamePhase::In => "in progress",
            GamePhase::Post => "final",
            GamePhase::Other(s) => s,
            GamePhase::Unknown => "unknown",
        }
    }
}

/// Where a drive ended, as far as the feed tells us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveEnd {
    pub period: Option<i64>,
    pub clock: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamLine {
    pub name: String,
    pub short_name: String,
    pub abbrev: String,
    pub score: Option<u32>,
    /// Points per period; `None` where the feed had no usable value.
    pub linescores: Vec<Option<u32>>,
}

impl TeamLine {
    fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        !name.is_empty()
            && [&self.name, &self.short_name, &self.abbrev]
                .iter()
                .any(|candidate| candidate.trim().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    pub phase: GamePhase,
    pub period: Option<i64>,
    pub drives: Vec<DriveEnd>,
    pub home: Option<TeamLine>,
    pub away: Option<TeamLine>,
}

impl GameState {
    /// Normalize any known provider shape. Unrecognized documents yield the
    /// default state (unknown phase, no period, no drives).
    pub fn from_value(value: &serde_json::Value) -> Self {
        match EspnGameFeed::deserialize(value) {
            Ok(feed) => feed.into(),
            Err(e) => {
                debug!("unrecognized game state document: {e}");
                Self::default()
            }
        }
    }

    pub fn from_json_str(s: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(s) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                debug!("game state is not valid json: {e}");
                Self::default()
            }
        }
    }

    pub fn is_final(&self) -> bool {
        self.phase == GamePhase::Post
    }

    /// Whether `team` (display name, short name or abbreviation) is the home
    /// side. `None` when it matches neither competitor.
    pub fn is_team_home(&self, team: &str) -> Option<bool> {
        if self.home.as_ref().is_some_and(|t| t.matches(team)) {
            Some(true)
        } else if self.away.as_ref().is_some_and(|t| t.matches(team)) {
            Some(false)
        } else {
            None
        }
    }

    /// Running score at the end of every period the linescores cover.
    /// Once either side is missing a period, that period and every later
    /// one is reported as pending.
    pub fn quarter_scores(&self) -> Vec<QuarterScore> {
        let empty = Vec::new();
        let home = self.home.as_ref().map_or(&empty, |t| &t.linescores);
        let away = self.away.as_ref().map_or(&empty, |t| &t.linescores);

        let mut totals = Some((0u32, 0u32));
        (0..home.len().max(away.len()))
            .map(|i| {
                totals = totals.and_then(|(h, a)| {
                    let hp = home.get(i).copied().flatten()?;
                    let ap = away.get(i).copied().flatten()?;
                    Some((h.saturating_add(hp), a.saturating_add(ap)))
                });
                match totals {
                    Some((h, a)) => QuarterScore::final_score(h, a),
                    None => QuarterScore::pending(),
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Quarter progress
// ---------------------------------------------------------------------------

/// The period being played, or `None` before kickoff and after the final
/// whistle.
pub fn active_quarter(game: &GameState) -> Option<u32> {
    match game.phase {
        GamePhase::Pre | GamePhase::Post => None,
        _ => game.period.and_then(|p| u32::try_from(p).ok()).filter(|&p| p > 0),
    }
}

/// Number of periods that are officially over.
///
/// A period counts once some drive ended in it with the clock at `0:00`.
/// Drives arrive in no particular order, so the highest such period wins.
/// Without any such drive, every period before the active one is assumed
/// finished.
pub fn completed_quarters(game: &GameState) -> u32 {
    let from_drives = game
        .drives
        .iter()
        .filter(|d| d.clock.as_deref() == Some(END_OF_PERIOD_CLOCK))
        .filter_map(|d| d.period.and_then(|p| u32::try_from(p).ok()))
        .filter(|&p| p > 0)
        .max();

    match from_drives {
        Some(period) => period,
        None => active_quarter(game).map_or(0, |q| q - 1),
    }
}

/// The scores that are safe to show: only periods that are officially over.
pub fn visible_scores(scores: &[QuarterScore], completed: u32) -> &[QuarterScore] {
    let n = usize::try_from(completed).unwrap_or(usize::MAX).min(scores.len());
    &scores[..n]
}

// ---------------------------------------------------------------------------
// Adapters: ESPN wire shapes → GameState
// ---------------------------------------------------------------------------

impl From<EspnGameFeed> for GameState {
    fn from(feed: EspnGameFeed) -> Self {
        match feed {
            EspnGameFeed::Summary(f) => f.into(),
            EspnGameFeed::Competition(f) => f.into(),
            EspnGameFeed::Flat(f) => f.into(),
        }
    }
}

impl From<SummaryFeed> for GameState {
    fn from(feed: SummaryFeed) -> Self {
        CompetitionFeed {
            competitions: feed.header.competitions,
            status: None,
            drives: feed.drives,
        }
        .into()
    }
}

impl From<CompetitionFeed> for GameState {
    fn from(feed: CompetitionFeed) -> Self {
        let competition = feed.competitions.unwrap_or_default().into_iter().next();
        let mut state = from_event_parts(feed.status.as_ref(), competition.as_ref());
        state.drives = drive_ends(feed.drives);
        state
    }
}

impl From<FlatFeed> for GameState {
    fn from(feed: FlatFeed) -> Self {
        from_parts(feed.status.as_ref(), feed.competitors.as_deref(), feed.drives)
    }
}

/// Scoreboard events carry both a flat `status` and `competitions`; prefer
/// the competition's status and fall back to the event's.
pub(crate) fn from_event_parts(
    event_status: Option<&EspnStatus>,
    competition: Option<&EspnCompetition>,
) -> GameState {
    let status = competition.and_then(|c| c.status.as_ref()).or(event_status);
    let competitors = competition.and_then(|c| c.competitors.as_deref());
    from_parts(status, competitors, None)
}

fn from_parts(
    status: Option<&EspnStatus>,
    competitors: Option<&[EspnCompetitor]>,
    drives: Option<EspnDrives>,
) -> GameState {
    let state = status
        .and_then(|s| s.status_type.as_ref())
        .and_then(|t| t.state.as_deref());

    let competitors = competitors.unwrap_or_default();
    let (home, away) = split_competitors(competitors);

    GameState {
        phase: GamePhase::parse(state),
        period: status.and_then(|s| s.period),
        drives: drive_ends(drives),
        home: home.map(map_competitor),
        away: away.map(map_competitor),
    }
}

fn drive_ends(drives: Option<EspnDrives>) -> Vec<DriveEnd> {
    drives
        .and_then(|d| d.previous)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|drive| drive.end)
        .map(|end| DriveEnd {
            period: end.period.and_then(|p| p.number),
            clock: end.clock.and_then(|c| c.display_value),
        })
        .collect()
}

fn split_competitors(
    competitors: &[EspnCompetitor],
) -> (Option<&EspnCompetitor>, Option<&EspnCompetitor>) {
    // "home"/"away" when tagged, otherwise index order
    let home = competitors
        .iter()
        .find(|c| c.is_home())
        .or_else(|| competitors.first());
    let away = competitors
        .iter()
        .find(|c| c.is_away())
        .or_else(|| competitors.get(1));
    (home, away)
}

fn map_competitor(c: &EspnCompetitor) -> TeamLine {
    let team = c.team.clone().unwrap_or_default();
    let name = team.display_name.unwrap_or_default();
    TeamLine {
        short_name: team.short_display_name.unwrap_or_else(|| name.clone()),
        name,
        abbrev: team.abbreviation.unwrap_or_default(),
        score: c.score.as_deref().and_then(|s| s.trim().parse().ok()),
        linescores: c
            .linescores
            .iter()
            .flatten()
            .map(|l| l.points())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drive(period: i64, clock: &str) -> serde_json::Value {
        json!({"end": {"period": {"number": period}, "clock": {"displayValue": clock}}})
    }

    fn nested(state: &str, period: i64, drives: Vec<serde_json::Value>) -> GameState {
        GameState::from_value(&json!({
            "competitions": [{"status": {"type": {"state": state}, "period": period}}],
            "drives": {"previous": drives},
        }))
    }

    #[test]
    fn pregame_has_no_active_or_completed_quarters() {
        let game = GameState::from_value(&json!({"status": {"type": {"state": "pre"}, "period": 0}}));
        assert_eq!(game.phase, GamePhase::Pre);
        assert_eq!(active_quarter(&game), None);
        assert_eq!(completed_quarters(&game), 0);
    }

    #[test]
    fn completed_quarters_takes_max_period_regardless_of_order() {
        let game = nested("in", 3, vec![drive(2, "0:00"), drive(1, "0:00"), drive(3, "4:12")]);
        assert_eq!(active_quarter(&game), Some(3));
        assert_eq!(completed_quarters(&game), 2);
    }

    #[test]
    fn falls_back_to_active_quarter_without_qualifying_drives() {
        let game = nested("in", 3, vec![drive(2, "1:15")]);
        assert_eq!(completed_quarters(&game), 2);

        let malformed = GameState::from_value(&json!({
            "status": {"type": {"state": "in"}, "period": 4},
            "drives": "not a drive list",
        }));
        assert_eq!(completed_quarters(&malformed), 3);
    }

    #[test]
    fn post_game_without_drives_reveals_nothing() {
        let game = GameState::from_value(&json!({"status": {"type": {"state": "post"}, "period": 4}}));
        assert_eq!(active_quarter(&game), None);
        assert_eq!(completed_quarters(&game), 0);

        let with_drives = nested("post", 4, vec![drive(4, "0:00")]);
        assert_eq!(completed_quarters(&with_drives), 4);
    }

    #[test]
    fn unknown_state_still_reports_positive_period() {
        let game = GameState::from_value(&json!({"status": {"period": 2}}));
        assert_eq!(game.phase, GamePhase::Unknown);
        assert_eq!(active_quarter(&game), Some(2));

        let halftime = GameState::from_value(&json!({"status": {"type": {"state": "half"}, "period": -1}}));
        assert_eq!(halftime.phase, GamePhase::Other("half".into()));
        assert_eq!(active_quarter(&halftime), None);
    }

    #[test]
    fn garbage_documents_degrade_to_defaults() {
        for doc in [json!(null), json!(42), json!({}), json!({"competitions": "x"}), json!([])] {
            let game = GameState::from_value(&doc);
            assert_eq!(game, GameState::default());
            assert_eq!(active_quarter(&game), None);
            assert_eq!(completed_quarters(&game), 0);
        }
        assert_eq!(GameState::from_json_str("{not json"), GameState::default());
    }

    #[test]
    fn malformed_status_or_competitions_keep_the_drives() {
        let bad_competitions = GameState::from_value(&json!({
            "competitions": [null],
            "drives": {"previous": [drive(1, "0:00"), drive(2, "0:00")]},
        }));
        assert_eq!(bad_competitions.drives.len(), 2);
        assert_eq!(bad_competitions.phase, GamePhase::Unknown);
        assert_eq!(completed_quarters(&bad_competitions), 2);

        let bad_status = GameState::from_value(&json!({
            "status": "final",
            "drives": {"previous": [drive(1, "0:00"), drive(3, "0:00"), drive(2, "0:00")]},
        }));
        assert_eq!(bad_status.period, None);
        assert_eq!(completed_quarters(&bad_status), 3);
    }

    #[test]
    fn competition_without_status_falls_back_to_event_status() {
        let game = GameState::from_value(&json!({
            "status": {"type": {"state": "in"}, "period": 3},
            "competitions": [{"competitors": []}],
        }));
        assert_eq!(game.phase, GamePhase::In);
        assert_eq!(active_quarter(&game), Some(3));
        assert_eq!(completed_quarters(&game), 2);

        let both = GameState::from_value(&json!({
            "status": {"type": {"state": "pre"}, "period": 0},
            "competitions": [{"status": {"type": {"state": "post"}, "period": 4}}],
            "drives": {"previous": [drive(4, "0:00")]},
        }));
        assert_eq!(both.phase, GamePhase::Post);
        assert_eq!(completed_quarters(&both), 4);
    }

    #[test]
    fn completed_quarters_never_decreases_as_later_drives_arrive() {
        let mut drives = Vec::new();
        let mut last = 0;
        for period in [1, 1, 2, 2, 3, 4] {
            drives.push(drive(period, "0:00"));
            let now = completed_quarters(&nested("in", 4, drives.clone()));
            assert!(now >= last, "dropped from {last} to {now}");
            last = now;
        }
        assert_eq!(last, 4);
    }

    #[test]
    fn visible_scores_is_a_prefix() {
        let scores = vec![
            QuarterScore::final_score(7, 0),
            QuarterScore::final_score(14, 3),
            QuarterScore::final_score(17, 10),
        ];
        assert_eq!(visible_scores(&scores, 0).len(), 0);
        assert_eq!(visible_scores(&scores, 2), &scores[..2]);
        assert_eq!(visible_scores(&scores, 9).len(), 3);
    }

    #[test]
    fn summary_document_uses_header_competition() {
        let game = GameState::from_value(&json!({
            "header": {"id": "401", "competitions": [{
                "status": {"type": {"state": "in"}, "period": 2},
                "competitors": [
                    {"homeAway": "away", "team": {"displayName": "Kansas City Chiefs", "abbreviation": "KC"},
                     "linescores": [{"displayValue": "3"}, {"displayValue": "14"}]},
                    {"homeAway": "home", "team": {"displayName": "Philadelphia Eagles", "abbreviation": "PHI"},
                     "linescores": [{"displayValue": "7"}, {"displayValue": "10"}]}
                ]
            }]},
            "drives": {"previous": [drive(1, "0:00")]}
        }));
        assert_eq!(game.phase, GamePhase::In);
        assert_eq!(completed_quarters(&game), 1);
        assert_eq!(game.is_team_home("phi"), Some(true));
        assert_eq!(game.is_team_home("Kansas City Chiefs"), Some(false));
        assert_eq!(game.is_team_home("DAL"), None);
        assert_eq!(
            game.quarter_scores(),
            vec![QuarterScore::final_score(7, 3), QuarterScore::final_score(17, 17)]
        );
    }

    #[test]
    fn quarter_scores_stop_at_first_gap() {
        let game = GameState::from_value(&json!({
            "status": {"type": {"state": "in"}, "period": 3},
            "competitors": [
                {"homeAway": "home", "linescores": [{"value": 7.0}, {"value": 3.0}, {"value": 0.0}]},
                {"homeAway": "away", "linescores": [{"value": 0.0}, {"displayValue": "-"}]}
            ]
        }));
        assert_eq!(
            game.quarter_scores(),
            vec![QuarterScore::final_score(7, 0), QuarterScore::pending(), QuarterScore::pending()]
        );
    }
}
