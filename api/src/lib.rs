pub mod client;
pub mod espn;
pub mod feed;
pub mod payouts;
pub mod store;
pub mod winners;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reported in place of a player name when a quarter has no claimed square.
pub const NO_WINNER: &str = "No Winner";
/// Reported when a claimed square belongs to an id missing from the roster.
pub const UNKNOWN_PLAYER: &str = "Unknown";

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of ESPN wire format
// ---------------------------------------------------------------------------

/// Digit assigned to each grid line, indexed by line position (0..10).
/// Rows (Y) belong to team 1, columns (X) to team 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridAxis(pub Vec<u8>);

impl GridAxis {
    /// Identity axis used when number randomization is turned off.
    pub fn sequential() -> Self {
        Self((0..10).collect())
    }

    /// Grid line holding `digit`, if the axis contains it.
    pub fn position(&self, digit: u8) -> Option<usize> {
        self.0.iter().position(|&d| d == digit)
    }

    /// True when the axis is exactly ten distinct digits 0–9.
    pub fn is_permutation(&self) -> bool {
        let mut seen = [false; 10];
        self.0.len() == 10
            && self.0.iter().all(|&d| {
                let idx = usize::from(d);
                idx < 10 && !std::mem::replace(&mut seen[idx], true)
            })
    }
}

impl Default for GridAxis {
    fn default() -> Self {
        Self::sequential()
    }
}

/// A claim on one grid cell. Uniqueness per (x, y) is owned by whoever
/// mutates the grid, not checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub x: u8,
    pub y: u8,
    #[serde(rename = "userId", alias = "ownerId")]
    pub owner_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub username: String,
}

/// Read-only id → display name lookup over the pool's players.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: Vec<Player>,
    names: HashMap<String, usize>,
}

impl Roster {
    pub fn new(players: Vec<Player>) -> Self {
        let mut names = HashMap::with_capacity(players.len());
        for (idx, p) in players.iter().enumerate() {
            // First entry wins if the roster repeats an id.
            names.entry(p.user_id.clone()).or_insert(idx);
        }
        Self { players, names }
    }

    pub fn name_of(&self, user_id: &str) -> Option<&str> {
        self.names
            .get(user_id)
            .map(|&idx| self.players[idx].username.as_str())
    }

    /// Reverse lookup by display name. Both sides are trimmed before the
    /// exact comparison; the first player in roster order wins.
    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.players
            .iter()
            .find(|p| p.username.trim() == name)
            .map(|p| p.user_id.as_str())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl FromIterator<Player> for Roster {
    fn from_iter<I: IntoIterator<Item = Player>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Running score at the end of one quarter (or overtime period).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterScore {
    pub home: Option<u32>,
    pub away: Option<u32>,
    /// Only manually entered scores are ever `false`; feed scores are final.
    #[serde(rename = "completed", default = "default_completed")]
    pub is_completed: bool,
}

fn default_completed() -> bool {
    true
}

impl QuarterScore {
    pub fn final_score(home: u32, away: u32) -> Self {
        Self { home: Some(home), away: Some(away), is_completed: true }
    }

    pub fn pending() -> Self {
        Self { home: None, away: None, is_completed: false }
    }
}

impl Default for QuarterScore {
    fn default() -> Self {
        Self::pending()
    }
}

/// One coordinate of a reported square: a score digit, or a label such as
/// the `"-"` placeholder used for quarters that are not decided yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Digit(u8),
    Label(String),
}

impl Cell {
    pub fn placeholder() -> Self {
        Cell::Label("-".to_owned())
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Digit(d) => write!(f, "{d}"),
            Cell::Label(s) => f.write_str(s),
        }
    }
}

/// Derived per-quarter result. Recomputed on demand; any stored copy is a cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterWinner {
    pub quarter: String,
    pub username: String,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    /// `[x digit, y digit]`
    pub square: [Cell; 2],
}

impl QuarterWinner {
    pub fn has_winner(&self) -> bool {
        self.username != NO_WINNER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, name: &str) -> Player {
        Player { user_id: id.into(), username: name.into() }
    }

    #[test]
    fn sequential_axis_is_a_permutation() {
        let axis = GridAxis::sequential();
        assert!(axis.is_permutation());
        assert_eq!(axis.position(7), Some(7));
    }

    #[test]
    fn malformed_axes_are_not_permutations() {
        assert!(!GridAxis(vec![0, 1, 2]).is_permutation());
        assert!(!GridAxis(vec![0, 0, 2, 3, 4, 5, 6, 7, 8, 9]).is_permutation());
        assert!(!GridAxis(vec![10, 1, 2, 3, 4, 5, 6, 7, 8, 9]).is_permutation());
        assert_eq!(GridAxis(vec![0, 1, 2]).position(9), None);
    }

    #[test]
    fn roster_lookups_trim_and_prefer_first_match() {
        let roster = Roster::new(vec![
            player("u1", "Alice "),
            player("u2", "Bob"),
            player("u3", "Alice"),
        ]);
        assert_eq!(roster.name_of("u2"), Some("Bob"));
        assert_eq!(roster.name_of("missing"), None);
        assert_eq!(roster.id_for_name(" Alice"), Some("u1"));
        assert_eq!(roster.id_for_name("Carol"), None);
    }

    #[test]
    fn quarter_score_completed_defaults_to_true() {
        let score: QuarterScore = serde_json::from_str(r#"{"home":7,"away":3}"#).unwrap();
        assert_eq!(score, QuarterScore::final_score(7, 3));

        let open: QuarterScore =
            serde_json::from_str(r#"{"home":7,"away":3,"completed":false}"#).unwrap();
        assert!(!open.is_completed);

        let empty: QuarterScore = serde_json::from_str(r#"{"home":null,"away":null}"#).unwrap();
        assert_eq!(empty.home, None);
    }

    #[test]
    fn selection_accepts_owner_id_alias() {
        let sel: Selection = serde_json::from_str(r#"{"x":1,"y":2,"ownerId":"u9"}"#).unwrap();
        assert_eq!(sel.owner_id, "u9");
        let json = serde_json::to_value(&sel).unwrap();
        assert_eq!(json["userId"], "u9");
    }

    #[test]
    fn quarter_winner_uses_persisted_shape() {
        let winner = QuarterWinner {
            quarter: "Q2".into(),
            username: NO_WINNER.into(),
            user_id: None,
            square: [Cell::placeholder(), Cell::placeholder()],
        };
        let json = serde_json::to_value(&winner).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"quarter": "Q2", "username": "No Winner", "userId": null, "square": ["-", "-"]})
        );
        assert!(!winner.has_winner());

        let back: QuarterWinner = serde_json::from_str(
            r#"{"quarter":"Q1","username":"Alice","userId":"u1","square":[7,4]}"#,
        )
        .unwrap();
        assert_eq!(back.square, [Cell::Digit(7), Cell::Digit(4)]);
    }
}
