use crate::app::App;
use crate::state::app_state::Board;
use squares_api::QuarterScore;
use squares_api::client::ScoreboardGame;
use squares_api::feed::{GameState, TeamLine};
use squares_api::store::BackfillReport;
use std::io::{self, Write};

/// Plain-text board: header, one line per quarter, then payouts.
pub fn render_board(out: &mut dyn Write, app: &App, board: &Board) -> io::Result<()> {
    let pool_id = if app.pool.id.is_empty() { "pool" } else { app.pool.id.as_str() };
    write!(out, "{pool_id}")?;
    if let Some(game) = &app.state.game {
        write!(out, "  {}", matchup(game))?;
    }
    write!(out, "  [{}", board.phase)?;
    if let Some(q) = board.active_quarter {
        write!(out, ", Q{q}")?;
    }
    if let Some(done) = board.completed_quarters {
        write!(out, ", {done} complete")?;
    }
    write!(out, "]")?;
    if let Some(at) = app.state.last_updated {
        write!(out, "  updated {}", at.format("%H:%M:%S"))?;
    }
    writeln!(out)?;

    let team1 = app.pool.team1.as_deref().unwrap_or("team 1");
    let side = if board.team1_home { "home" } else { "away" };
    writeln!(out, "rows (y): {team1} ({side})")?;
    writeln!(out)?;

    writeln!(out, "{:<8}{:<10}{:<9}{}", "Quarter", "Score", "Square", "Winner")?;
    for (winner, score) in board.winners.iter().zip(&board.scores) {
        let square = format!("[{},{}]", winner.square[0], winner.square[1]);
        writeln!(
            out,
            "{:<8}{:<10}{:<9}{}",
            winner.quarter,
            score_label(score),
            square,
            winner.username
        )?;
    }
    writeln!(out)?;

    if board.breakdown.total_pool > 0.0 {
        writeln!(
            out,
            "Pool ${:.2}, ${:.2} per quarter",
            board.breakdown.total_pool, board.breakdown.per_quarter
        )?;
        let roster = app.pool.roster();
        for (user_id, amount) in &board.payouts {
            let name = roster.name_of(user_id).unwrap_or(user_id.as_str());
            writeln!(out, "  {name:<20} ${amount:.2}")?;
        }
        if board.breakdown.unpaid > 0.005 {
            writeln!(out, "  {:<20} ${:.2}", "(unpaid)", board.breakdown.unpaid)?;
        }
    } else {
        writeln!(out, "No payouts: set price_per_square and total_squares in the pool file.")?;
    }

    if let Some(err) = &app.state.last_error {
        writeln!(out, "\n! {err}")?;
    }
    Ok(())
}

pub fn render_scoreboard(out: &mut dyn Write, games: &[ScoreboardGame]) -> io::Result<()> {
    if games.is_empty() {
        return writeln!(out, "No games on the scoreboard.");
    }
    for game in games {
        let kickoff = game
            .start_time
            .map(|t| t.with_timezone(&chrono::Local).format("%a %H:%M").to_string())
            .unwrap_or_default();
        let period = game.state.period.filter(|&p| p > 0).map(|p| format!(" Q{p}")).unwrap_or_default();
        writeln!(
            out,
            "{:<12}{:<16}{:<11}{}{}",
            game.id,
            game.name,
            kickoff,
            game.state.phase.label(),
            period
        )?;
    }
    Ok(())
}

pub fn render_backfill(out: &mut dyn Write, report: &BackfillReport, dry_run: bool) -> io::Result<()> {
    let verb = if dry_run { "would update" } else { "updated" };
    write!(
        out,
        "scanned {} pool(s): {verb} {}, unchanged {}",
        report.scanned, report.updated, report.unchanged
    )?;
    if report.skipped > 0 {
        write!(out, ", skipped {} malformed", report.skipped)?;
    }
    writeln!(out)
}

fn matchup(game: &GameState) -> String {
    let label = |t: &Option<TeamLine>| {
        t.as_ref()
            .map(|t| {
                let name = if t.abbrev.is_empty() { &t.short_name } else { &t.abbrev };
                match t.score {
                    Some(score) => format!("{name} {score}"),
                    None => name.clone(),
                }
            })
            .unwrap_or_else(|| "TBD".to_owned())
    };
    format!("{} @ {}", label(&game.away), label(&game.home))
}

fn score_label(score: &QuarterScore) -> String {
    match (score.home, score.away) {
        (Some(h), Some(a)) => format!("{h}-{a}"),
        _ => "-".to_owned(),
    }
}
