//! Innings scoring state machine.
//!
//! The innings moves through four phases (ready, awaiting a new
//! batsman, awaiting a new bowler, completed) modeled as typestates
//! wrapped by [`InningsState`]. Every scoring operation is a total
//! function over the current phase: calls made from the wrong phase are
//! rejected and leave the innings untouched.

use enum_dispatch::enum_dispatch;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt, sync::Arc};
use thiserror::Error;

use super::constants::{BALLS_PER_OVER, EXTRA_PENALTY, VALID_RUN_VALUES};
use super::entities::{
    Ball, BatsmanView, BowlerView, ExtraKind, InningsView, Over, Player, Runs, Team,
    WicketDetails, WicketKind,
};
use super::functional;
use super::states::{AwaitingBatsman, AwaitingBowler, Completed, CompletionReason, Ready};

/// Errors that can occur while scoring an innings. Every error is a
/// local rejection; the innings state is unchanged.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum InningsError {
    #[error("invalid lineup: {0}")]
    InvalidLineup(String),
    #[error("innings is already completed")]
    InningsCompleted,
    #[error("can't {action} while {phase}")]
    InvalidTransition { action: String, phase: String },
    #[error("{0}")]
    PlayerNotEligible(String),
    #[error("no ball has been recorded yet")]
    NothingToUndo,
    #[error("illegal run value {0}")]
    InvalidRunValue(Runs),
}

/// Notable happenings pushed onto the innings event queue as play
/// progresses. Consumers drain these for commentary and UI prompts.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum InningsEvent {
    InningsOpened(String),
    BoundaryScored(String, Runs),
    WicketFallen(String, WicketKind),
    NewBatsmanRequired,
    BatsmanArrived(String),
    OverCompleted(u32, String),
    NewBowlerRequired,
    BowlerChanged(String),
    InningsClosed(CompletionReason),
}

impl fmt::Display for InningsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::InningsOpened(team) => format!("{team} innings under way"),
            Self::BoundaryScored(batsman, runs) => {
                format!("{batsman} finds the boundary for {runs}")
            }
            Self::WicketFallen(batsman, kind) => format!("{batsman} is out, {kind}"),
            Self::NewBatsmanRequired => "a new batsman must come in".to_string(),
            Self::BatsmanArrived(batsman) => format!("{batsman} comes to the crease"),
            Self::OverCompleted(number, bowler) => {
                format!("over {number} complete, bowled by {bowler}")
            }
            Self::NewBowlerRequired => "a new bowler must be chosen".to_string(),
            Self::BowlerChanged(bowler) => format!("{bowler} takes over the bowling"),
            Self::InningsClosed(reason) => format!("innings closed: {reason}"),
        };
        write!(f, "{repr}")
    }
}

/// Mutable innings data shared across all phases.
#[derive(Clone, Debug)]
pub struct InningsData {
    pub batting_team: Arc<Team>,
    pub bowling_team: Arc<Team>,
    pub overs: Vec<Over>,
    pub total_runs: Runs,
    pub wickets: u8,
    pub extras: Runs,
    pub striker: Arc<Player>,
    pub non_striker: Arc<Player>,
    pub bowler: Arc<Player>,
    pub over_limit: u32,
    /// Wickets that end the innings: players per team minus one.
    pub out_threshold: u8,
    /// Runs that win the chase, for a second innings.
    pub target: Option<Runs>,
    /// Queue of innings events drained by consumers.
    pub(super) events: VecDeque<InningsEvent>,
}

impl InningsData {
    fn swap_strike(&mut self) {
        std::mem::swap(&mut self.striker, &mut self.non_striker);
    }

    fn take_events(&mut self) -> VecDeque<InningsEvent> {
        std::mem::take(&mut self.events)
    }

    /// Skeleton for the next delivery: current striker and bowler, all
    /// flags clear.
    fn blank_ball(&self) -> Ball {
        let number_in_over = self
            .overs
            .last()
            .filter(|over| !over.is_complete())
            .map_or(1, |over| over.balls.len() as u8 + 1);
        Ball {
            number_in_over,
            runs: 0,
            is_wide: false,
            is_no_ball: false,
            is_wicket: false,
            wicket: None,
            striker: Arc::clone(&self.striker),
            bowler: Arc::clone(&self.bowler),
        }
    }

    fn target_reached(&self) -> bool {
        self.target.is_some_and(|target| self.total_runs >= target)
    }

    fn overs_exhausted(&self) -> bool {
        functional::legal_ball_count(&self.overs) >= self.over_limit * u32::from(BALLS_PER_OVER)
    }

    fn note_over_completed(&mut self) {
        if let Some(over) = self.overs.last() {
            debug!("over {} complete ({} runs)", over.number + 1, over.runs);
            self.events
                .push_back(InningsEvent::OverCompleted(over.number + 1, over.bowler.name.clone()));
        }
    }

    fn view_as(&self, phase: &'static str, completed: bool) -> InningsView {
        let this_over = self
            .overs
            .last()
            .map(|over| over.balls.iter().map(functional::ball_symbol).collect())
            .unwrap_or_default();
        InningsView {
            batting_team: Arc::clone(&self.batting_team),
            bowling_team: Arc::clone(&self.bowling_team),
            total_runs: self.total_runs,
            wickets: self.wickets,
            extras: self.extras,
            overs: functional::overs_display(&self.overs),
            striker: BatsmanView {
                player: Arc::clone(&self.striker),
                figures: functional::batting_figures(&self.overs, self.striker.id),
                on_strike: true,
            },
            non_striker: BatsmanView {
                player: Arc::clone(&self.non_striker),
                figures: functional::batting_figures(&self.overs, self.non_striker.id),
                on_strike: false,
            },
            bowler: BowlerView {
                player: Arc::clone(&self.bowler),
                figures: functional::bowling_figures(&self.overs, self.bowler.id),
            },
            this_over,
            target: self.target,
            phase: phase.to_string(),
            completed,
        }
    }
}

/// Phase marker metadata used by the shared projection impl.
pub(crate) trait Phase {
    const NAME: &'static str;
    const COMPLETED: bool = false;
}

impl Phase for Ready {
    const NAME: &'static str = "ready";
}

impl Phase for AwaitingBatsman {
    const NAME: &'static str = "awaiting a new batsman";
}

impl Phase for AwaitingBowler {
    const NAME: &'static str = "awaiting a new bowler";
}

impl Phase for Completed {
    const NAME: &'static str = "completed";
    const COMPLETED: bool = true;
}

/// An innings in a specific phase, pairing the scoring data with the
/// phase marker.
#[derive(Clone, Debug)]
pub struct Innings<T> {
    pub data: InningsData,
    pub state: T,
}

/// Phase-independent read surface of an innings.
#[enum_dispatch]
pub trait InningsProjection {
    /// Drain queued innings events.
    fn drain_events(&mut self) -> VecDeque<InningsEvent>;

    /// The raw scoring data.
    #[must_use]
    fn data(&self) -> &InningsData;

    /// Projection for the display layer.
    ///
    /// # Important
    /// This function's return value should be used - ignoring it wastes computation
    #[must_use]
    fn view(&self) -> InningsView;
}

impl<T: Phase> InningsProjection for Innings<T> {
    fn drain_events(&mut self) -> VecDeque<InningsEvent> {
        self.data.take_events()
    }

    fn data(&self) -> &InningsData {
        &self.data
    }

    fn view(&self) -> InningsView {
        self.data.view_as(T::NAME, T::COMPLETED)
    }
}

impl Innings<Ready> {
    /// Open an innings with the given lineup.
    ///
    /// Fails with [`InningsError::InvalidLineup`] when the opening pair
    /// are the same player, an opener is not on the batting side, or
    /// the opening bowler is not on the bowling side.
    pub fn open(
        batting_team: Arc<Team>,
        bowling_team: Arc<Team>,
        striker: Arc<Player>,
        non_striker: Arc<Player>,
        bowler: Arc<Player>,
        over_limit: u32,
        out_threshold: u8,
        target: Option<Runs>,
    ) -> Result<Self, InningsError> {
        if striker.id == non_striker.id {
            return Err(InningsError::InvalidLineup(
                "striker and non-striker are the same player".to_string(),
            ));
        }
        for opener in [&striker, &non_striker] {
            if !batting_team.contains(opener.id) {
                return Err(InningsError::InvalidLineup(format!(
                    "{} is not on the batting side",
                    opener.name
                )));
            }
        }
        if !bowling_team.contains(bowler.id) {
            return Err(InningsError::InvalidLineup(format!(
                "{} is not on the bowling side",
                bowler.name
            )));
        }

        info!(
            "innings opened: {} batting against {}",
            batting_team.name, bowling_team.name
        );
        let mut events = VecDeque::new();
        events.push_back(InningsEvent::InningsOpened(batting_team.name.clone()));
        Ok(Self {
            data: InningsData {
                batting_team,
                bowling_team,
                overs: Vec::new(),
                total_runs: 0,
                wickets: 0,
                extras: 0,
                striker,
                non_striker,
                bowler,
                over_limit,
                out_threshold,
                target,
                events,
            },
            state: Ready,
        })
    }

    fn apply_runs(mut self, runs: Runs) -> InningsState {
        let mut ball = self.data.blank_ball();
        ball.runs = runs;
        functional::append_ball(&mut self.data.overs, ball);
        self.data.total_runs += runs;
        if matches!(runs, 4 | 6) {
            let batsman = self.data.striker.name.clone();
            self.data
                .events
                .push_back(InningsEvent::BoundaryScored(batsman, runs));
        }
        if runs % 2 == 1 {
            self.data.swap_strike();
        }
        self.advance_after_delivery()
    }

    fn apply_extra(mut self, kind: ExtraKind, additional_runs: Runs) -> InningsState {
        let runs = EXTRA_PENALTY + additional_runs;
        let mut ball = self.data.blank_ball();
        ball.runs = runs;
        match kind {
            ExtraKind::Wide => ball.is_wide = true,
            ExtraKind::NoBall => ball.is_no_ball = true,
        }
        functional::append_ball(&mut self.data.overs, ball);
        self.data.total_runs += runs;
        self.data.extras += runs;
        // Running between the wickets is possible off a wide or
        // no-ball; only the runs actually run change ends.
        if additional_runs % 2 == 1 {
            self.data.swap_strike();
        }
        self.advance_after_delivery()
    }

    fn apply_wicket(mut self, kind: WicketKind, fielder: Option<Arc<Player>>) -> InningsState {
        let mut ball = self.data.blank_ball();
        ball.is_wicket = true;
        ball.wicket = Some(WicketDetails {
            kind,
            dismissed: Arc::clone(&self.data.striker),
            fielder,
            bowler: (kind != WicketKind::RunOut).then(|| Arc::clone(&self.data.bowler)),
        });
        functional::append_ball(&mut self.data.overs, ball);
        self.data.wickets += 1;
        let batsman = self.data.striker.name.clone();
        debug!("wicket: {batsman} {kind}");
        self.data
            .events
            .push_back(InningsEvent::WicketFallen(batsman, kind));

        if self.data.wickets >= self.data.out_threshold {
            return self.close(CompletionReason::AllOut);
        }
        if self.data.overs_exhausted() {
            return self.close(CompletionReason::OversExhausted);
        }
        let over_closed = functional::last_over_complete(&self.data.overs);
        if over_closed {
            self.data.note_over_completed();
        }
        self.data.events.push_back(InningsEvent::NewBatsmanRequired);
        InningsState::AwaitingBatsman(Innings {
            data: self.data,
            state: AwaitingBatsman { over_closed },
        })
    }

    /// Phase bookkeeping after a run or extra delivery: target first,
    /// then the over limit, then the over boundary.
    fn advance_after_delivery(mut self) -> InningsState {
        if self.data.target_reached() {
            return self.close(CompletionReason::TargetReached);
        }
        if self.data.overs_exhausted() {
            return self.close(CompletionReason::OversExhausted);
        }
        if functional::last_over_complete(&self.data.overs) {
            self.data.note_over_completed();
            self.data.events.push_back(InningsEvent::NewBowlerRequired);
            return InningsState::AwaitingBowler(Innings {
                data: self.data,
                state: AwaitingBowler,
            });
        }
        InningsState::Ready(self)
    }
}

impl Innings<AwaitingBatsman> {
    fn seat_batsman(mut self, player: Arc<Player>) -> InningsState {
        self.data
            .events
            .push_back(InningsEvent::BatsmanArrived(player.name.clone()));
        // Convention here: the incoming batsman takes strike.
        self.data.striker = player;
        if self.state.over_closed {
            self.data.events.push_back(InningsEvent::NewBowlerRequired);
            InningsState::AwaitingBowler(Innings {
                data: self.data,
                state: AwaitingBowler,
            })
        } else {
            InningsState::Ready(Innings {
                data: self.data,
                state: Ready,
            })
        }
    }
}

impl Innings<AwaitingBowler> {
    fn change_bowler(mut self, player: Arc<Player>) -> InningsState {
        self.data
            .events
            .push_back(InningsEvent::BowlerChanged(player.name.clone()));
        self.data.bowler = player;
        // End-of-over rotation: the pair change ends for the new over.
        self.data.swap_strike();
        InningsState::Ready(Innings {
            data: self.data,
            state: Ready,
        })
    }
}

impl<T> Innings<T> {
    fn close(mut self, reason: CompletionReason) -> InningsState {
        info!(
            "innings closed for {}: {reason}",
            self.data.batting_team.name
        );
        self.data
            .events
            .push_back(InningsEvent::InningsClosed(reason));
        InningsState::Completed(Innings {
            data: self.data,
            state: Completed { reason },
        })
    }
}

/// An innings in one of its four phases.
///
/// Phase-changing operations consume the state and return the next one
/// together with the outcome; a rejected call returns the state
/// unchanged. Phase-preserving operations take `&mut self`.
#[enum_dispatch(InningsProjection)]
#[derive(Debug)]
pub enum InningsState {
    Ready(Innings<Ready>),
    AwaitingBatsman(Innings<AwaitingBatsman>),
    AwaitingBowler(Innings<AwaitingBowler>),
    Completed(Innings<Completed>),
}

impl InningsState {
    /// Open an innings in the ready phase. See [`Innings::open`].
    pub fn open(
        batting_team: Arc<Team>,
        bowling_team: Arc<Team>,
        striker: Arc<Player>,
        non_striker: Arc<Player>,
        bowler: Arc<Player>,
        over_limit: u32,
        out_threshold: u8,
        target: Option<Runs>,
    ) -> Result<Self, InningsError> {
        Innings::open(
            batting_team,
            bowling_team,
            striker,
            non_striker,
            bowler,
            over_limit,
            out_threshold,
            target,
        )
        .map(Self::Ready)
    }

    /// Record a delivery scored off the bat, `runs` in {0,1,2,3,4,6}.
    /// Odd runs rotate strike; the sixth legal ball of the over hands
    /// the innings to bowler selection or closes it at the over limit.
    #[must_use]
    pub fn record_runs(self, runs: Runs) -> (Self, Result<(), InningsError>) {
        match self {
            Self::Ready(innings) => {
                if !VALID_RUN_VALUES.contains(&runs) {
                    let err = InningsError::InvalidRunValue(runs);
                    return (Self::Ready(innings), Err(err));
                }
                (innings.apply_runs(runs), Ok(()))
            }
            other => {
                let err = other.rejection("record runs");
                (other, Err(err))
            }
        }
    }

    /// Record the fall of the current striker. Strike never rotates on
    /// a wicket; play stays blocked until the replacement is chosen.
    #[must_use]
    pub fn record_wicket(
        self,
        kind: WicketKind,
        fielder: Option<Arc<Player>>,
    ) -> (Self, Result<(), InningsError>) {
        match self {
            Self::Ready(innings) => (innings.apply_wicket(kind, fielder), Ok(())),
            other => {
                let err = other.rejection("record a wicket");
                (other, Err(err))
            }
        }
    }

    /// Record a wide or no-ball worth `1 + additional_runs`, none of it
    /// counting toward the six-ball over.
    #[must_use]
    pub fn record_extra(
        self,
        kind: ExtraKind,
        additional_runs: Runs,
    ) -> (Self, Result<(), InningsError>) {
        match self {
            Self::Ready(innings) => (innings.apply_extra(kind, additional_runs), Ok(())),
            other => {
                let err = other.rejection("record an extra");
                (other, Err(err))
            }
        }
    }

    /// Seat the incoming batsman after a wicket; they take strike.
    #[must_use]
    pub fn select_new_batsman(self, player: Arc<Player>) -> (Self, Result<(), InningsError>) {
        match self {
            Self::AwaitingBatsman(innings) => {
                if !innings.data.batting_team.contains(player.id) {
                    let err = InningsError::PlayerNotEligible(format!(
                        "{} is not on the batting side",
                        player.name
                    ));
                    return (Self::AwaitingBatsman(innings), Err(err));
                }
                if player.id == innings.data.striker.id || player.id == innings.data.non_striker.id
                {
                    let err = InningsError::PlayerNotEligible(format!(
                        "{} is already at the crease",
                        player.name
                    ));
                    return (Self::AwaitingBatsman(innings), Err(err));
                }
                (innings.seat_batsman(player), Ok(()))
            }
            other => {
                let err = other.rejection("select a new batsman");
                (other, Err(err))
            }
        }
    }

    /// Hand the next over to a new bowler. The previous over's bowler
    /// is barred from bowling consecutive overs; selection performs the
    /// end-of-over strike swap.
    #[must_use]
    pub fn select_new_bowler(self, player: Arc<Player>) -> (Self, Result<(), InningsError>) {
        match self {
            Self::AwaitingBowler(innings) => {
                if !innings.data.bowling_team.contains(player.id) {
                    let err = InningsError::PlayerNotEligible(format!(
                        "{} is not on the bowling side",
                        player.name
                    ));
                    return (Self::AwaitingBowler(innings), Err(err));
                }
                if innings
                    .data
                    .overs
                    .last()
                    .is_some_and(|over| over.bowler.id == player.id)
                {
                    let err = InningsError::PlayerNotEligible(format!(
                        "{} bowled the previous over",
                        player.name
                    ));
                    return (Self::AwaitingBowler(innings), Err(err));
                }
                (innings.change_bowler(player), Ok(()))
            }
            other => {
                let err = other.rejection("select a new bowler");
                (other, Err(err))
            }
        }
    }

    /// Manual correction of a misrecorded change of ends. No ball event
    /// is created.
    pub fn swap_batsmen(&mut self) -> Result<(), InningsError> {
        match self {
            Self::Ready(innings) => {
                innings.data.swap_strike();
                Ok(())
            }
            Self::AwaitingBowler(innings) => {
                innings.data.swap_strike();
                Ok(())
            }
            other => Err(other.rejection("swap the batsmen")),
        }
    }

    /// Withdraw the most recent delivery and reverse everything it
    /// caused: totals, extras, wickets, strike rotation, and any stale
    /// follow-up selections. Always lands back in the ready phase.
    #[must_use]
    pub fn undo_last_ball(self) -> (Self, Result<(), InningsError>) {
        match self {
            Self::Completed(innings) => {
                (Self::Completed(innings), Err(InningsError::InningsCompleted))
            }
            other => {
                let was_ready = matches!(other, Self::Ready(_));
                let mut data = other.into_data();
                let closed_over =
                    !data.overs.is_empty() && functional::last_over_complete(&data.overs);
                let Some(ball) = functional::pop_last_ball(&mut data.overs) else {
                    // An empty history can only occur in the ready phase.
                    let innings = Innings { data, state: Ready };
                    return (Self::Ready(innings), Err(InningsError::NothingToUndo));
                };

                // Withdrawing an over-closing ball while play had
                // already moved on discards the stale bowler selection,
                // so its end-of-over rotation reverses first.
                if closed_over && was_ready {
                    data.swap_strike();
                }

                data.total_runs -= ball.runs;
                if ball.is_wicket {
                    data.wickets -= 1;
                    data.striker = Arc::clone(&ball.striker);
                } else if !ball.is_legal() {
                    data.extras -= ball.runs;
                    if (ball.runs - EXTRA_PENALTY) % 2 == 1 {
                        data.swap_strike();
                    }
                } else if ball.runs % 2 == 1 {
                    data.swap_strike();
                }

                // A reopened over belongs to its original bowler.
                if let Some(over) = data.overs.last() {
                    if !over.is_complete() {
                        data.bowler = Arc::clone(&over.bowler);
                    }
                }

                debug!("withdrew last ball ({})", functional::ball_symbol(&ball));
                (Self::Ready(Innings { data, state: Ready }), Ok(()))
            }
        }
    }

    /// Close the innings by declaration.
    #[must_use]
    pub fn declare(self) -> (Self, Result<(), InningsError>) {
        match self {
            Self::Completed(innings) => {
                (Self::Completed(innings), Err(InningsError::InningsCompleted))
            }
            Self::Ready(innings) => (innings.close(CompletionReason::Declared), Ok(())),
            Self::AwaitingBatsman(innings) => (innings.close(CompletionReason::Declared), Ok(())),
            Self::AwaitingBowler(innings) => (innings.close(CompletionReason::Declared), Ok(())),
        }
    }

    #[must_use]
    pub fn phase_name(&self) -> &'static str {
        match self {
            Self::Ready(_) => Ready::NAME,
            Self::AwaitingBatsman(_) => AwaitingBatsman::NAME,
            Self::AwaitingBowler(_) => AwaitingBowler::NAME,
            Self::Completed(_) => Completed::NAME,
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    #[must_use]
    pub fn completion_reason(&self) -> Option<CompletionReason> {
        match self {
            Self::Completed(innings) => Some(innings.state.reason),
            _ => None,
        }
    }

    fn rejection(&self, action: &str) -> InningsError {
        match self {
            Self::Completed(_) => InningsError::InningsCompleted,
            _ => InningsError::InvalidTransition {
                action: action.to_string(),
                phase: self.phase_name().to_string(),
            },
        }
    }

    fn into_data(self) -> InningsData {
        match self {
            Self::Ready(innings) => innings.data,
            Self::AwaitingBatsman(innings) => innings.data,
            Self::AwaitingBowler(innings) => innings.data,
            Self::Completed(innings) => innings.data,
        }
    }
}
