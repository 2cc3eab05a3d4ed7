//! Pure helpers over the ball history: over accumulation and the
//! derived figures the scoreboard renders. Nothing here owns state;
//! everything is recomputable from the overs alone.

use super::entities::{Ball, BattingFigures, BowlingFigures, Over, PlayerId, WicketKind};

/// True when a fresh delivery would open a new over: either no over has
/// been bowled yet, or the latest one holds its six legal deliveries.
#[must_use]
pub fn last_over_complete(overs: &[Over]) -> bool {
    overs.last().is_none_or(Over::is_complete)
}

/// Append a delivery to the over list, opening a new over (seeded with
/// the delivery's bowler) when the previous one is complete.
pub fn append_ball(overs: &mut Vec<Over>, ball: Ball) {
    match overs.last_mut() {
        Some(over) if !over.is_complete() => over.push(ball),
        _ => {
            let number = overs.len() as u32;
            overs.push(Over::open(number, ball));
        }
    }
}

/// Remove the newest delivery, dropping its over if that empties it.
/// Returns `None` when no ball has been recorded at all.
pub fn pop_last_ball(overs: &mut Vec<Over>) -> Option<Ball> {
    let ball = overs.last_mut()?.pop()?;
    if overs.last().is_some_and(|over| over.balls.is_empty()) {
        overs.pop();
    }
    Some(ball)
}

#[must_use]
pub fn legal_ball_count(overs: &[Over]) -> u32 {
    overs.iter().map(|over| u32::from(over.legal_balls())).sum()
}

/// Overs bowled in the usual `O.B` notation ("12.4").
#[must_use]
pub fn overs_display(overs: &[Over]) -> String {
    let complete = overs.iter().filter(|over| over.is_complete()).count();
    let balls = overs
        .last()
        .filter(|over| !over.is_complete())
        .map_or(0, Over::legal_balls);
    format!("{complete}.{balls}")
}

/// The over-strip symbol for a delivery: "W" for a wicket, "Wd"/"Nb"
/// (with any runs taken on top) for extras, otherwise the run value.
#[must_use]
pub fn ball_symbol(ball: &Ball) -> String {
    if ball.is_wicket {
        return "W".to_string();
    }
    let extra = ball.runs.saturating_sub(1);
    if ball.is_wide {
        return if extra > 0 {
            format!("Wd{extra}")
        } else {
            "Wd".to_string()
        };
    }
    if ball.is_no_ball {
        return if extra > 0 {
            format!("Nb{extra}")
        } else {
            "Nb".to_string()
        };
    }
    ball.runs.to_string()
}

/// A batsman's figures from the ball history. Runs off the bat only;
/// wides are not balls faced, no-balls are.
#[must_use]
pub fn batting_figures(overs: &[Over], player: PlayerId) -> BattingFigures {
    let mut figures = BattingFigures::default();
    for ball in faced_by(overs, player) {
        if ball.is_wide {
            continue;
        }
        figures.balls_faced += 1;
        if ball.is_legal() {
            figures.runs += ball.runs;
            match ball.runs {
                4 => figures.fours += 1,
                6 => figures.sixes += 1,
                _ => {}
            }
        }
    }
    figures
}

/// A bowler's figures from the ball history. Maidens count complete
/// overs conceding nothing; run-outs are not the bowler's wickets.
#[must_use]
pub fn bowling_figures(overs: &[Over], player: PlayerId) -> BowlingFigures {
    let mut figures = BowlingFigures::default();
    for over in overs.iter().filter(|over| over.bowler.id == player) {
        figures.balls += u32::from(over.legal_balls());
        figures.runs_conceded += over.runs;
        if over.is_complete() && over.runs == 0 {
            figures.maidens += 1;
        }
        figures.wickets += over
            .balls
            .iter()
            .filter_map(|ball| ball.wicket.as_ref())
            .filter(|wicket| wicket.kind != WicketKind::RunOut)
            .count() as u8;
    }
    figures
}

fn faced_by(overs: &[Over], player: PlayerId) -> impl Iterator<Item = &Ball> {
    overs
        .iter()
        .flat_map(|over| over.balls.iter())
        .filter(move |ball| ball.striker.id == player)
}
