//! Persisted pool rows and the backfill batch job that refreshes their
//! cached `quarter_winners`.
//!
//! A row mirrors the hosted table (`quarter_scores`, `quarter_winners`,
//! `selections`, `x_axis`, `y_axis`, `players`). The same shape, plus the
//! optional pool configuration fields, doubles as the CLI's pool file.
use crate::winners::determine_winners;
use crate::{GridAxis, Player, QuarterScore, QuarterWinner, Roster, Selection};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Squares on a full 10×10 grid.
pub const FULL_GRID_SQUARES: u32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub quarter_scores: Vec<QuarterScore>,
    #[serde(default)]
    pub quarter_winners: Vec<QuarterWinner>,
    #[serde(default)]
    pub selections: Vec<Selection>,
    #[serde(default)]
    pub x_axis: GridAxis,
    #[serde(default)]
    pub y_axis: GridAxis,
    #[serde(default)]
    pub players: Vec<Player>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_square: Option<f64>,
    /// 100 for a full grid, 25 in block mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_squares: Option<u32>,
    /// Team on the Y axis, matched against the feed's competitors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1_home: Option<bool>,
    /// ESPN event id of the game this pool is played on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl PoolRow {
    pub fn roster(&self) -> Roster {
        Roster::new(self.players.clone())
    }

    pub fn total_squares(&self) -> u32 {
        self.total_squares.unwrap_or(FULL_GRID_SQUARES)
    }

    pub fn price_per_square(&self) -> f64 {
        self.price_per_square.unwrap_or_default()
    }

    /// Winners for `scores` on this row's grid.
    pub fn winners_for(&self, scores: &[QuarterScore], is_team1_home: bool) -> Vec<QuarterWinner> {
        determine_winners(
            scores,
            &self.selections,
            &self.x_axis,
            &self.y_axis,
            is_team1_home,
            &self.roster(),
        )
    }

    /// Winners for the row's own stored scores.
    pub fn recompute_winners(&self, is_team1_home: bool) -> Vec<QuarterWinner> {
        self.winners_for(&self.quarter_scores, is_team1_home)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub scanned: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Rows that did not parse as a pool row and were passed through as-is.
    pub skipped: usize,
}

/// Recompute every row's cached winners from its stored inputs, replacing
/// the cache wherever it differs.
pub fn backfill(rows: &mut [PoolRow]) -> BackfillReport {
    let mut report = BackfillReport { scanned: rows.len(), ..Default::default() };

    for row in rows.iter_mut() {
        if refresh_winners(row) {
            report.updated += 1;
        } else {
            report.unchanged += 1;
        }
    }
    report
}

/// Backfill over raw exported rows. A row that does not parse is logged,
/// counted as skipped and left untouched; the others only have their
/// `quarter_winners` column rewritten, so columns this crate does not model
/// survive the round trip.
pub fn backfill_documents(rows: &mut [serde_json::Value]) -> BackfillReport {
    let mut report = BackfillReport { scanned: rows.len(), ..Default::default() };

    for (idx, value) in rows.iter_mut().enumerate() {
        let Some(fields) = value.as_object_mut() else {
            warn!("row {idx}: not an object, skipped");
            report.skipped += 1;
            continue;
        };
        let mut row = match PoolRow::deserialize(&serde_json::Value::Object(fields.clone())) {
            Ok(row) => row,
            Err(e) => {
                warn!("row {idx}: skipped, {e}");
                report.skipped += 1;
                continue;
            }
        };
        if !refresh_winners(&mut row) {
            report.unchanged += 1;
            continue;
        }
        match serde_json::to_value(&row.quarter_winners) {
            Ok(winners) => {
                fields.insert("quarter_winners".to_owned(), winners);
                report.updated += 1;
            }
            Err(e) => {
                warn!("pool {}: could not encode winners, skipped: {e}", row.id);
                report.skipped += 1;
            }
        }
    }
    report
}

/// Replace the row's cached winners when they are stale. Rows without a
/// stored orientation are treated as team 1 = home.
fn refresh_winners(row: &mut PoolRow) -> bool {
    let winners = row.recompute_winners(row.team1_home.unwrap_or(true));
    if winners == row.quarter_winners {
        debug!("pool {}: winners unchanged", row.id);
        return false;
    }
    info!(
        "pool {}: {} cached winner(s) replaced with {}",
        row.id,
        row.quarter_winners.len(),
        winners.len()
    );
    row.quarter_winners = winners;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, NO_WINNER};
    use serde_json::json;

    fn row_json() -> serde_json::Value {
        json!({
            "id": "pool-1",
            "quarter_scores": [
                {"home": 7, "away": 3},
                {"home": 14, "away": 3},
                {"home": null, "away": null}
            ],
            "quarter_winners": [],
            "selections": [{"x": 3, "y": 7, "userId": "u1"}],
            "x_axis": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
            "y_axis": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
            "players": [{"userId": "u1", "username": "Alice"}]
        })
    }

    #[test]
    fn backfill_fills_empty_cache_and_is_idempotent() {
        let row: PoolRow = serde_json::from_value(row_json()).unwrap();
        let mut rows = vec![row];

        let first = backfill(&mut rows);
        assert_eq!(first, BackfillReport { scanned: 1, updated: 1, unchanged: 0, skipped: 0 });

        let winners = &rows[0].quarter_winners;
        assert_eq!(winners.len(), 3);
        assert_eq!(winners[0].username, "Alice");
        assert_eq!(winners[0].square, [Cell::Digit(3), Cell::Digit(7)]);
        assert_eq!(winners[1].username, NO_WINNER);
        assert_eq!(winners[2].square, [Cell::placeholder(), Cell::placeholder()]);

        let second = backfill(&mut rows);
        assert_eq!(second, BackfillReport { scanned: 1, updated: 0, unchanged: 1, skipped: 0 });
    }

    #[test]
    fn stored_orientation_overrides_home_default() {
        let mut value = row_json();
        value["team1_home"] = json!(false);
        let mut rows = vec![serde_json::from_value::<PoolRow>(value).unwrap()];
        backfill(&mut rows);
        // team 1 away: y digit from away score 3, x digit from home score 7
        assert_eq!(rows[0].quarter_winners[0].square, [Cell::Digit(7), Cell::Digit(3)]);
        assert_eq!(rows[0].quarter_winners[0].username, NO_WINNER);
    }

    #[test]
    fn malformed_row_is_skipped_and_the_rest_still_update() {
        let mut good = row_json();
        good["notes"] = json!("kept as-is");
        let bad = json!({"id": "pool-2", "quarter_scores": [{"home": 7.0, "away": 3}]});
        let mut rows = vec![good, bad.clone(), json!("not a row")];

        let report = backfill_documents(&mut rows);
        assert_eq!(report, BackfillReport { scanned: 3, updated: 1, unchanged: 0, skipped: 2 });

        assert_eq!(rows[0]["notes"], "kept as-is");
        assert_eq!(rows[0]["quarter_winners"][0]["username"], "Alice");
        assert_eq!(rows[0]["quarter_winners"][0]["square"], json!([3, 7]));
        assert_eq!(rows[1], bad);

        let again = backfill_documents(&mut rows);
        assert_eq!(again, BackfillReport { scanned: 3, updated: 0, unchanged: 1, skipped: 2 });
    }

    #[test]
    fn sparse_rows_deserialize_with_defaults() {
        let row: PoolRow = serde_json::from_str(r#"{"id": "empty"}"#).unwrap();
        assert_eq!(row.x_axis, GridAxis::sequential());
        assert_eq!(row.total_squares(), FULL_GRID_SQUARES);
        assert_eq!(row.price_per_square(), 0.0);
        assert!(row.recompute_winners(true).is_empty());
    }

    #[test]
    fn config_fields_are_omitted_when_unset() {
        let row = PoolRow { id: "p".into(), ..Default::default() };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("price_per_square").is_none());
        assert!(json.get("quarter_winners").is_some());
    }
}
