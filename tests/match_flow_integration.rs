//! Full match flows through the controller: innings sequencing, the
//! live target check, result derivation, and the record hand-back.

use anyhow::Result;

use cricket_scoring::{
    CompletionReason, InningsError, Match, MatchConfig, MatchError, MatchOutcome, MatchStatus,
    entities::{ExtraKind, PlayerId, Team, WicketKind},
};

fn squads() -> (Team, Team) {
    (
        Team::with_players("Falcons", &["Asha", "Bea", "Chandra"]),
        Team::with_players("Kites", &["Dev", "Esha", "Farid"]),
    )
}

fn roster(team: &Team) -> Vec<PlayerId> {
    team.players.iter().map(|p| p.id).collect()
}

/// A live match with team1 batting first under the given config.
fn live_match(config: MatchConfig) -> Match {
    let (team1, team2) = squads();
    let mut game = Match::new(team1, team2, config).unwrap();
    let batting = game.team1().id;
    let batters = roster(game.team1());
    let bowler = game.team2().players[0].id;
    game.start_first_innings(batting, batters[0], batters[1], bowler)
        .unwrap();
    game
}

/// Score out the first innings of a one-over match with six singles.
fn finish_first_innings(game: &mut Match) {
    for _ in 0..6 {
        game.record_runs(1).unwrap();
    }
    assert!(game.current_innings().unwrap().is_completed());
    assert_eq!(game.status(), MatchStatus::Live);
}

fn start_chase(game: &mut Match) {
    let chasers = roster(game.team2());
    let bowler = game.team1().players[0].id;
    game.start_second_innings(chasers[0], chasers[1], bowler)
        .unwrap();
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_status_moves_upcoming_live_completed() {
    let mut game = live_match(MatchConfig::new(1, 2));
    assert_eq!(game.status(), MatchStatus::Live);

    finish_first_innings(&mut game);
    start_chase(&mut game);
    game.record_runs(4).unwrap();
    game.record_runs(4).unwrap();

    assert_eq!(game.status(), MatchStatus::Completed);
}

#[test]
fn test_second_innings_requires_a_completed_first() {
    let mut game = live_match(MatchConfig::new(1, 2));
    let chasers = roster(game.team2());
    let bowler = game.team1().players[0].id;

    let err = game
        .start_second_innings(chasers[0], chasers[1], bowler)
        .unwrap_err();
    assert_eq!(err, MatchError::FirstInningsNotCompleted);
}

#[test]
fn test_no_third_innings() {
    let mut game = live_match(MatchConfig::new(1, 2));
    finish_first_innings(&mut game);
    start_chase(&mut game);

    let chasers = roster(game.team2());
    let bowler = game.team1().players[0].id;
    let err = game
        .start_second_innings(chasers[0], chasers[1], bowler)
        .unwrap_err();
    assert_eq!(err, MatchError::InningsAlreadyStarted);
}

#[test]
fn test_restarting_the_first_innings_is_rejected() {
    let mut game = live_match(MatchConfig::new(1, 2));
    let batting = game.team1().id;
    let batters = roster(game.team1());
    let bowler = game.team2().players[0].id;
    let err = game
        .start_first_innings(batting, batters[0], batters[1], bowler)
        .unwrap_err();
    assert_eq!(err, MatchError::InningsAlreadyStarted);
}

#[test]
fn test_lineup_errors_pass_through() {
    let (team1, team2) = squads();
    let mut game = Match::new(team1, team2, MatchConfig::new(1, 2)).unwrap();
    let batting = game.team1().id;
    let batters = roster(game.team1());
    // Opening bowler picked from the batting side.
    let err = game
        .start_first_innings(batting, batters[0], batters[1], batters[2])
        .unwrap_err();
    assert!(matches!(
        err,
        MatchError::Innings(InningsError::InvalidLineup(_))
    ));
    assert_eq!(game.status(), MatchStatus::Upcoming);
}

// ============================================================================
// Target and Result
// ============================================================================

#[test]
fn test_target_is_first_innings_total_plus_one() {
    let mut game = live_match(MatchConfig::new(1, 2));
    assert_eq!(game.target(), None);

    finish_first_innings(&mut game);
    start_chase(&mut game);
    assert_eq!(game.target(), Some(7));
}

#[test]
fn test_chasing_side_wins_the_moment_the_target_falls() {
    let mut game = live_match(MatchConfig::new(1, 2));
    finish_first_innings(&mut game);
    start_chase(&mut game);

    game.record_runs(4).unwrap();
    assert_eq!(game.status(), MatchStatus::Live);
    // 8 runs passes the target of 7 on the second ball of the over.
    game.record_runs(4).unwrap();

    assert_eq!(game.status(), MatchStatus::Completed);
    assert_eq!(
        game.current_innings().unwrap().completion_reason(),
        Some(CompletionReason::TargetReached)
    );
    let result = game.result().unwrap();
    match &result.outcome {
        MatchOutcome::Won { winner, margin } => {
            assert_eq!(winner.id, game.team2().id);
            assert_eq!(margin, "by 1 wicket");
        }
        MatchOutcome::Tied => panic!("expected a winner"),
    }

    assert_eq!(game.record_runs(1), Err(MatchError::MatchAlreadyCompleted));
    assert_eq!(
        game.record_extra(ExtraKind::Wide, 0),
        Err(MatchError::MatchAlreadyCompleted)
    );
    assert_eq!(game.undo_last_ball(), Err(MatchError::MatchAlreadyCompleted));
}

#[test]
fn test_defending_side_wins_by_runs() {
    let mut game = live_match(MatchConfig::new(1, 3));
    finish_first_innings(&mut game);
    start_chase(&mut game);

    game.record_runs(1).unwrap();
    game.record_wicket(WicketKind::Bowled, None).unwrap();
    let replacement = game.team2().players[2].id;
    game.select_new_batsman(replacement).unwrap();
    // Second wicket is all out for a three-player squad.
    game.record_wicket(WicketKind::Caught, None).unwrap();

    assert_eq!(game.status(), MatchStatus::Completed);
    let result = game.result().unwrap();
    match &result.outcome {
        MatchOutcome::Won { winner, margin } => {
            assert_eq!(winner.id, game.team1().id);
            assert_eq!(margin, "by 5 runs");
        }
        MatchOutcome::Tied => panic!("expected a winner"),
    }
}

#[test]
fn test_equal_totals_tie_the_match() {
    let mut game = live_match(MatchConfig::new(1, 2));
    finish_first_innings(&mut game);
    start_chase(&mut game);

    // Six singles use up the over with the scores level at six apiece.
    for _ in 0..6 {
        game.record_runs(1).unwrap();
    }

    assert_eq!(game.status(), MatchStatus::Completed);
    assert!(matches!(
        game.result().unwrap().outcome,
        MatchOutcome::Tied
    ));
}

#[test]
fn test_man_of_the_match_requires_completion() {
    let mut game = live_match(MatchConfig::new(1, 2));
    let star = game.team1().players[0].id;
    assert_eq!(game.set_man_of_the_match(star), Err(MatchError::NotCompleted));

    finish_first_innings(&mut game);
    start_chase(&mut game);
    game.record_runs(4).unwrap();
    game.record_runs(4).unwrap();

    game.set_man_of_the_match(star).unwrap();
    assert_eq!(
        game.result().unwrap().man_of_the_match.as_ref().unwrap().id,
        star
    );
}

// ============================================================================
// Routing
// ============================================================================

#[test]
fn test_undo_routes_to_the_active_innings() {
    let mut game = live_match(MatchConfig::new(2, 2));
    game.record_runs(4).unwrap();
    assert_eq!(game.innings_view().unwrap().total_runs, 4);

    game.undo_last_ball().unwrap();
    let view = game.innings_view().unwrap();
    assert_eq!(view.total_runs, 0);
    assert_eq!(view.overs, "0.0");
}

#[test]
fn test_guard_state_rejections_pass_through() {
    let mut game = live_match(MatchConfig::new(2, 3));
    game.record_wicket(WicketKind::Stumped, None).unwrap();

    let err = game.record_runs(1).unwrap_err();
    assert!(matches!(
        err,
        MatchError::Innings(InningsError::InvalidTransition { .. })
    ));

    let outsider = game.team2().players[0].id;
    let err = game.select_new_batsman(outsider).unwrap_err();
    assert!(matches!(
        err,
        MatchError::Innings(InningsError::PlayerNotEligible(_))
    ));

    let replacement = game.team1().players[2].id;
    game.select_new_batsman(replacement).unwrap();
    game.record_runs(1).unwrap();
}

#[test]
fn test_swap_and_declare_route_through_the_controller() {
    let mut game = live_match(MatchConfig::new(2, 2));
    let opener = game.innings_view().unwrap().striker.player.id;

    game.swap_batsmen().unwrap();
    assert_ne!(game.innings_view().unwrap().striker.player.id, opener);

    game.declare_innings().unwrap();
    assert_eq!(
        game.current_innings().unwrap().completion_reason(),
        Some(CompletionReason::Declared)
    );
}

#[test]
fn test_controller_drains_innings_events() {
    let mut game = live_match(MatchConfig::new(2, 2));
    game.record_runs(6).unwrap();

    let events = game.drain_events();
    assert!(!events.is_empty());
    assert!(game.drain_events().is_empty());
}

// ============================================================================
// Record Hand-Back
// ============================================================================

#[test]
fn test_completed_match_record_serializes() -> Result<()> {
    let mut game = live_match(MatchConfig::new(1, 2));
    finish_first_innings(&mut game);
    start_chase(&mut game);
    game.record_runs(6).unwrap();
    game.record_runs(1).unwrap();

    let record = game.record();
    let json = serde_json::to_string(&record)?;
    let value: serde_json::Value = serde_json::from_str(&json)?;

    assert_eq!(value["status"], "completed");
    assert_eq!(value["innings"].as_array().unwrap().len(), 2);
    assert_eq!(value["innings"][0]["total_runs"], 6);
    assert_eq!(value["innings"][1]["target"], 7);
    assert_eq!(value["innings"][1]["completion"], "target_reached");
    assert!(value["result"]["outcome"]["Won"]["margin"]
        .as_str()
        .unwrap()
        .contains("wicket"));
    Ok(())
}

#[test]
fn test_record_is_a_live_snapshot_before_completion() {
    let mut game = live_match(MatchConfig::new(2, 2));
    game.record_runs(4).unwrap();

    let record = game.record();
    assert_eq!(record.status, MatchStatus::Live);
    assert_eq!(record.innings.len(), 1);
    assert_eq!(record.innings[0].total_runs, 4);
    assert!(record.result.is_none());
    assert!(record.innings[0].completion.is_none());
}
