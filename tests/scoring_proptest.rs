//! Property-based tests for the scoring engine using proptest
//!
//! These tests verify over accumulation, strike rotation, and the undo
//! inverse across randomly generated event sequences.

use proptest::prelude::*;
use std::sync::Arc;

use cricket_scoring::{
    CompletionReason, InningsError, InningsProjection, InningsState, functional,
    entities::{ExtraKind, Runs, Team, WicketKind},
};

const BATTERS: [&str; 11] = [
    "Asha", "Bea", "Chandra", "Devika", "Esha", "Farah", "Gita", "Hari", "Indu", "Jaya", "Kiran",
];
const BOWLERS: [&str; 11] = [
    "Lila", "Mohan", "Nina", "Omar", "Priya", "Qadir", "Rhea", "Sunil", "Tara", "Uma", "Vikram",
];

#[derive(Clone, Debug)]
enum BallEvent {
    Runs(Runs),
    Extra(ExtraKind, Runs),
}

// Strategy for a run value from the scoring panel
fn run_value() -> impl Strategy<Value = Runs> {
    prop::sample::select(vec![0u16, 1, 2, 3, 4, 6])
}

// Strategy for a run or extra delivery (no wickets, so sequences never
// hit the out-threshold)
fn ball_event() -> impl Strategy<Value = BallEvent> {
    prop_oneof![
        run_value().prop_map(BallEvent::Runs),
        (any::<bool>(), 0u16..=4).prop_map(|(wide, additional)| {
            let kind = if wide { ExtraKind::Wide } else { ExtraKind::NoBall };
            BallEvent::Extra(kind, additional)
        }),
    ]
}

fn open_innings(
    over_limit: u32,
    players: usize,
) -> (InningsState, Arc<Team>, Arc<Team>) {
    let bat = Arc::new(Team::with_players("Falcons", &BATTERS[..players]));
    let bowl = Arc::new(Team::with_players("Kites", &BOWLERS[..players]));
    let innings = InningsState::open(
        Arc::clone(&bat),
        Arc::clone(&bowl),
        Arc::clone(&bat.players[0]),
        Arc::clone(&bat.players[1]),
        Arc::clone(&bowl.players[0]),
        over_limit,
        players as u8 - 1,
        None,
    )
    .unwrap();
    (innings, bat, bowl)
}

fn ok(step: (InningsState, Result<(), InningsError>)) -> InningsState {
    let (innings, outcome) = step;
    outcome.unwrap();
    innings
}

/// Clear a pending bowler selection so the next delivery is accepted.
fn ensure_ready(innings: InningsState, bowling: &Team) -> InningsState {
    if matches!(innings, InningsState::AwaitingBowler(_)) {
        let last_bowler = innings.data().overs.last().map(|over| over.bowler.id);
        let next = bowling
            .players
            .iter()
            .find(|p| Some(p.id) != last_bowler)
            .cloned()
            .unwrap();
        ok(innings.select_new_bowler(next))
    } else {
        innings
    }
}

fn apply(innings: InningsState, event: &BallEvent, bowling: &Team) -> InningsState {
    let innings = ensure_ready(innings, bowling);
    match event {
        BallEvent::Runs(runs) => ok(innings.record_runs(*runs)),
        BallEvent::Extra(kind, additional) => ok(innings.record_extra(*kind, *additional)),
    }
}

proptest! {
    #[test]
    fn prop_six_run_events_complete_exactly_one_over(runs in prop::collection::vec(run_value(), 6)) {
        let (mut innings, _, _) = open_innings(4, 11);
        for &value in &runs {
            innings = ok(innings.record_runs(value));
        }

        let data = innings.data();
        prop_assert_eq!(data.overs.len(), 1);
        let over = &data.overs[0];
        prop_assert_eq!(over.balls.len(), 6);
        prop_assert!(over.balls.iter().all(|ball| ball.is_legal()));
        prop_assert!(over.is_complete());
        prop_assert_eq!(over.runs, runs.iter().sum::<Runs>());
        prop_assert_eq!(data.total_runs, over.runs);
        prop_assert!(matches!(innings, InningsState::AwaitingBowler(_)));
    }

    #[test]
    fn prop_strike_follows_run_parity(runs in prop::collection::vec(run_value(), 1..=5)) {
        let (mut innings, _, _) = open_innings(4, 11);
        let opener = innings.data().striker.id;
        let partner = innings.data().non_striker.id;

        let mut swaps = 0u32;
        for &value in &runs {
            if value % 2 == 1 {
                swaps += 1;
            }
            innings = ok(innings.record_runs(value));
        }

        let expected = if swaps % 2 == 0 { opener } else { partner };
        prop_assert_eq!(innings.data().striker.id, expected);
    }

    #[test]
    fn prop_undo_is_an_exact_inverse(
        prefix in prop::collection::vec(ball_event(), 0..24),
        runs in run_value(),
    ) {
        let (mut innings, _, bowl) = open_innings(50, 11);
        for event in &prefix {
            innings = apply(innings, event, &bowl);
        }
        innings = ensure_ready(innings, &bowl);

        let before = serde_json::to_string(&innings.view()).unwrap();
        innings = ok(innings.record_runs(runs));
        innings = ok(innings.undo_last_ball());
        let after = serde_json::to_string(&innings.view()).unwrap();

        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_extras_never_advance_the_over(extras in prop::collection::vec((any::<bool>(), 0u16..=4), 1..20)) {
        let (mut innings, _, _) = open_innings(4, 11);
        let mut expected: Runs = 0;
        for &(wide, additional) in &extras {
            let kind = if wide { ExtraKind::Wide } else { ExtraKind::NoBall };
            expected += 1 + additional;
            innings = ok(innings.record_extra(kind, additional));
        }

        let data = innings.data();
        prop_assert_eq!(data.overs.len(), 1);
        prop_assert_eq!(functional::legal_ball_count(&data.overs), 0);
        prop_assert_eq!(data.extras, expected);
        prop_assert_eq!(data.total_runs, expected);
        prop_assert!(matches!(innings, InningsState::Ready(_)));
    }

    #[test]
    fn prop_wickets_cap_at_the_out_threshold(players in 3usize..=6) {
        let (mut innings, bat, _) = open_innings(4, players);

        loop {
            innings = ok(innings.record_wicket(WicketKind::Bowled, None));
            if innings.is_completed() {
                break;
            }
            let replacement = {
                let data = innings.data();
                bat.players
                    .iter()
                    .find(|p| p.id != data.striker.id && p.id != data.non_striker.id)
                    .cloned()
                    .unwrap()
            };
            innings = ok(innings.select_new_batsman(replacement));
        }

        prop_assert_eq!(innings.data().wickets, players as u8 - 1);
        prop_assert_eq!(
            innings.completion_reason(),
            Some(CompletionReason::AllOut)
        );
        let (_, outcome) = innings.record_wicket(WicketKind::Bowled, None);
        prop_assert_eq!(outcome, Err(InningsError::InningsCompleted));
    }

    #[test]
    fn prop_totals_always_equal_the_sum_of_over_totals(events in prop::collection::vec(ball_event(), 0..60)) {
        let (mut innings, _, bowl) = open_innings(50, 11);
        for event in &events {
            innings = apply(innings, event, &bowl);
        }

        let data = innings.data();
        let summed: Runs = data.overs.iter().map(|over| over.runs).sum();
        prop_assert_eq!(data.total_runs, summed);
    }
}
