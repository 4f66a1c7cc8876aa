use crate::{QuarterWinner, Roster};
use std::collections::BTreeMap;

/// Total winnings per player id.
///
/// The pool (`price_per_square * total_squares`) is split evenly across every
/// quarter record, including quarters nobody won; those shares are simply
/// not paid out. Winners are matched back to player ids by display name.
///
/// Returns an empty map when there are no records, the price is not a
/// positive number, or there are no squares.
pub fn calculate_payouts(
    winners: &[QuarterWinner],
    roster: &Roster,
    price_per_square: f64,
    total_squares: u32,
) -> BTreeMap<String, f64> {
    let mut payouts = BTreeMap::new();
    let Some(per_quarter) = per_quarter_share(winners.len(), price_per_square, total_squares) else {
        return payouts;
    };

    for winner in winners.iter().filter(|w| w.has_winner()) {
        if let Some(user_id) = roster.id_for_name(&winner.username) {
            *payouts.entry(user_id.to_owned()).or_insert(0.0) += per_quarter;
        }
    }
    payouts
}

fn per_quarter_share(quarters: usize, price_per_square: f64, total_squares: u32) -> Option<f64> {
    if quarters == 0 || total_squares == 0 || !(price_per_square.is_finite() && price_per_square > 0.0) {
        return None;
    }
    Some(price_per_square * f64::from(total_squares) / quarters as f64)
}

/// Where the pool went, for display alongside the per-player totals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoolBreakdown {
    pub total_pool: f64,
    pub per_quarter: f64,
    pub paid: f64,
    /// Shares of quarters with no winner, or whose winner could not be
    /// matched to a player.
    pub unpaid: f64,
}

impl PoolBreakdown {
    pub fn new(
        winners: &[QuarterWinner],
        payouts: &BTreeMap<String, f64>,
        price_per_square: f64,
        total_squares: u32,
    ) -> Self {
        let Some(per_quarter) = per_quarter_share(winners.len(), price_per_square, total_squares) else {
            return Self::default();
        };
        let total_pool = price_per_square * f64::from(total_squares);
        let paid: f64 = payouts.values().sum();
        Self { total_pool, per_quarter, paid, unpaid: total_pool - paid }
    }
}
