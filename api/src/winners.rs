use crate::{Cell, GridAxis, NO_WINNER, QuarterScore, QuarterWinner, Roster, Selection, UNKNOWN_PLAYER};
use log::warn;

/// Resolve the owner of the winning square for every quarter in `scores`.
///
/// Quarters are labelled `Q1`, `Q2`, ... by position. Team 1 sits on the Y
/// axis and team 2 on the X axis, so `is_team1_home` picks which of the
/// home/away scores feeds which axis. Only the last digit of each score
/// matters.
///
/// Never fails: undecided quarters, unclaimed squares, digits missing from
/// an axis and players missing from the roster all produce a record.
pub fn determine_winners(
    scores: &[QuarterScore],
    selections: &[Selection],
    x_axis: &GridAxis,
    y_axis: &GridAxis,
    is_team1_home: bool,
    roster: &Roster,
) -> Vec<QuarterWinner> {
    scores
        .iter()
        .enumerate()
        .map(|(idx, score)| {
            quarter_winner(
                format!("Q{}", idx + 1),
                score,
                selections,
                x_axis,
                y_axis,
                is_team1_home,
                roster,
            )
        })
        .collect()
}

fn quarter_winner(
    quarter: String,
    score: &QuarterScore,
    selections: &[Selection],
    x_axis: &GridAxis,
    y_axis: &GridAxis,
    is_team1_home: bool,
    roster: &Roster,
) -> QuarterWinner {
    let (Some(home), Some(away)) = (score.home, score.away) else {
        return no_winner(quarter, [Cell::placeholder(), Cell::placeholder()]);
    };
    if !score.is_completed {
        return no_winner(quarter, [Cell::placeholder(), Cell::placeholder()]);
    }

    let (team1_score, team2_score) = if is_team1_home { (home, away) } else { (away, home) };
    let x_digit = (team2_score % 10) as u8;
    let y_digit = (team1_score % 10) as u8;
    let square = [Cell::Digit(x_digit), Cell::Digit(y_digit)];

    let (Some(x_idx), Some(y_idx)) = (x_axis.position(x_digit), y_axis.position(y_digit)) else {
        warn!(
            "{quarter}: score digits ({x_digit}, {y_digit}) not found on axes x={:?} y={:?}",
            x_axis.0, y_axis.0
        );
        return no_winner(quarter, square);
    };

    let owner = selections
        .iter()
        .find(|s| usize::from(s.x) == x_idx && usize::from(s.y) == y_idx);

    match owner {
        Some(selection) => QuarterWinner {
            quarter,
            username: roster
                .name_of(&selection.owner_id)
                .unwrap_or(UNKNOWN_PLAYER)
                .to_owned(),
            user_id: Some(selection.owner_id.clone()),
            square,
        },
        None => no_winner(quarter, square),
    }
}

fn no_winner(quarter: String, square: [Cell; 2]) -> QuarterWinner {
    QuarterWinner { quarter, username: NO_WINNER.to_owned(), user_id: None, square }
}
