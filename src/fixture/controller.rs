//! The match controller: innings sequencing, lifecycle, and result
//! derivation. This is the single externally-visible mutation surface;
//! every scoring action is routed to the active innings and every call
//! made after the match completes is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt, sync::Arc};
use thiserror::Error;
use uuid::Uuid;

use crate::scoring::entities::{
    arc_opt_serde, arc_serde, ExtraKind, InningsView, Over, Player, PlayerId, Runs, Team, TeamId,
    WicketKind,
};
use crate::scoring::state_machine::{
    InningsError, InningsEvent, InningsProjection, InningsState,
};
use crate::scoring::states::CompletionReason;

use super::config::MatchConfig;

pub type MatchId = Uuid;

/// Errors raised by the match controller. Innings-level rejections pass
/// through unchanged.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum MatchError {
    #[error("match is already completed")]
    MatchAlreadyCompleted,
    #[error("match has not started")]
    NotStarted,
    #[error("an innings is already under way")]
    InningsAlreadyStarted,
    #[error("first innings is not completed")]
    FirstInningsNotCompleted,
    #[error("match is not completed")]
    NotCompleted,
    #[error("{0} is not a team in this match")]
    UnknownTeam(TeamId),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Innings(#[from] InningsError),
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Upcoming,
    Live,
    Completed,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Upcoming => "upcoming",
            Self::Live => "live",
            Self::Completed => "completed",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum MatchOutcome {
    Won {
        #[serde(with = "arc_serde")]
        winner: Arc<Team>,
        margin: String,
    },
    Tied,
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Won { winner, margin } => write!(f, "{winner} won {margin}"),
            Self::Tied => write!(f, "match tied"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    #[serde(with = "arc_opt_serde")]
    pub man_of_the_match: Option<Arc<Player>>,
}

/// Per-innings slice of the completed-match record.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InningsRecord {
    #[serde(with = "arc_serde")]
    pub batting_team: Arc<Team>,
    #[serde(with = "arc_serde")]
    pub bowling_team: Arc<Team>,
    pub overs: Vec<Over>,
    pub total_runs: Runs,
    pub wickets: u8,
    pub extras: Runs,
    pub target: Option<Runs>,
    pub completion: Option<CompletionReason>,
}

/// The record handed back to the tournament aggregate once the match is
/// over (and a faithful snapshot at any earlier point).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MatchRecord {
    pub match_id: MatchId,
    #[serde(with = "arc_serde")]
    pub team1: Arc<Team>,
    #[serde(with = "arc_serde")]
    pub team2: Arc<Team>,
    pub status: MatchStatus,
    pub innings: Vec<InningsRecord>,
    pub result: Option<MatchResult>,
    pub venue: Option<String>,
    pub date: DateTime<Utc>,
}

/// A match between two squads: one or two innings plus lifecycle and
/// result bookkeeping. Owns its innings exclusively; teams are shared
/// references from tournament setup.
#[derive(Debug)]
pub struct Match {
    pub id: MatchId,
    team1: Arc<Team>,
    team2: Arc<Team>,
    config: MatchConfig,
    status: MatchStatus,
    innings: Vec<InningsState>,
    result: Option<MatchResult>,
    pub venue: Option<String>,
    pub date: DateTime<Utc>,
}

impl Match {
    /// Create a match between two squads. Fails when the configuration
    /// is out of range, the squads are too small for it, or both sides
    /// are the same team.
    pub fn new(team1: Team, team2: Team, config: MatchConfig) -> Result<Self, MatchError> {
        config.validate().map_err(MatchError::InvalidConfig)?;
        if team1.id == team2.id {
            return Err(MatchError::InvalidConfig(
                "a team can't play itself".to_string(),
            ));
        }
        for team in [&team1, &team2] {
            if team.players.len() < usize::from(config.players_per_team) {
                return Err(MatchError::InvalidConfig(format!(
                    "{} has {} players, needs {}",
                    team.name,
                    team.players.len(),
                    config.players_per_team
                )));
            }
        }
        Ok(Self {
            id: Uuid::new_v4(),
            team1: Arc::new(team1),
            team2: Arc::new(team2),
            config,
            status: MatchStatus::Upcoming,
            innings: Vec::with_capacity(2),
            result: None,
            venue: None,
            date: Utc::now(),
        })
    }

    #[must_use]
    pub fn with_venue(mut self, venue: &str) -> Self {
        self.venue = Some(venue.to_string());
        self
    }

    #[must_use]
    pub fn scheduled_at(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    #[must_use]
    pub fn team1(&self) -> &Arc<Team> {
        &self.team1
    }

    #[must_use]
    pub fn team2(&self) -> &Arc<Team> {
        &self.team2
    }

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    #[must_use]
    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn innings(&self) -> &[InningsState] {
        &self.innings
    }

    #[must_use]
    pub fn current_innings(&self) -> Option<&InningsState> {
        self.innings.last()
    }

    /// The chase target, once a second innings exists.
    #[must_use]
    pub fn target(&self) -> Option<Runs> {
        self.innings.get(1).and_then(|innings| innings.data().target)
    }

    /// Live projection of the active innings for the display layer.
    #[must_use]
    pub fn innings_view(&self) -> Option<InningsView> {
        self.innings.last().map(InningsProjection::view)
    }

    /// Drain queued events from the active innings.
    pub fn drain_events(&mut self) -> VecDeque<InningsEvent> {
        self.innings
            .last_mut()
            .map(|innings| innings.drain_events())
            .unwrap_or_default()
    }

    /// Snapshot for external consumers; once the match is completed
    /// this is the record the tournament's points table ingests.
    #[must_use]
    pub fn record(&self) -> MatchRecord {
        MatchRecord {
            match_id: self.id,
            team1: Arc::clone(&self.team1),
            team2: Arc::clone(&self.team2),
            status: self.status,
            innings: self
                .innings
                .iter()
                .map(|innings| {
                    let data = innings.data();
                    InningsRecord {
                        batting_team: Arc::clone(&data.batting_team),
                        bowling_team: Arc::clone(&data.bowling_team),
                        overs: data.overs.clone(),
                        total_runs: data.total_runs,
                        wickets: data.wickets,
                        extras: data.extras,
                        target: data.target,
                        completion: innings.completion_reason(),
                    }
                })
                .collect(),
            result: self.result.clone(),
            venue: self.venue.clone(),
            date: self.date,
        }
    }

    /// Start the first innings with the chosen batting side and lineup.
    pub fn start_first_innings(
        &mut self,
        batting_team: TeamId,
        striker: PlayerId,
        non_striker: PlayerId,
        bowler: PlayerId,
    ) -> Result<(), MatchError> {
        if self.status == MatchStatus::Completed {
            return Err(MatchError::MatchAlreadyCompleted);
        }
        if !self.innings.is_empty() {
            return Err(MatchError::InningsAlreadyStarted);
        }
        let (batting, bowling) = if batting_team == self.team1.id {
            (Arc::clone(&self.team1), Arc::clone(&self.team2))
        } else if batting_team == self.team2.id {
            (Arc::clone(&self.team2), Arc::clone(&self.team1))
        } else {
            return Err(MatchError::UnknownTeam(batting_team));
        };
        let (striker, non_striker, bowler) =
            Self::lineup(&batting, &bowling, striker, non_striker, bowler)?;
        let innings = InningsState::open(
            Arc::clone(&batting),
            bowling,
            striker,
            non_striker,
            bowler,
            self.config.over_limit,
            self.config.out_threshold(),
            None,
        )?;
        self.innings.push(innings);
        self.status = MatchStatus::Live;
        log::info!("match {} live: {} batting first", self.id, batting.name);
        Ok(())
    }

    /// Start the chase. Only valid once the first innings is completed;
    /// the batting side is implied and the target is the first-innings
    /// total plus one.
    pub fn start_second_innings(
        &mut self,
        striker: PlayerId,
        non_striker: PlayerId,
        bowler: PlayerId,
    ) -> Result<(), MatchError> {
        if self.status == MatchStatus::Completed {
            return Err(MatchError::MatchAlreadyCompleted);
        }
        let (target, batting, bowling) = match self.innings.as_slice() {
            [] => return Err(MatchError::NotStarted),
            [_, _, ..] => return Err(MatchError::InningsAlreadyStarted),
            [first] if !first.is_completed() => {
                return Err(MatchError::FirstInningsNotCompleted);
            }
            [first] => {
                let data = first.data();
                (
                    data.total_runs + 1,
                    Arc::clone(&data.bowling_team),
                    Arc::clone(&data.batting_team),
                )
            }
        };
        let (striker, non_striker, bowler) =
            Self::lineup(&batting, &bowling, striker, non_striker, bowler)?;
        let innings = InningsState::open(
            Arc::clone(&batting),
            bowling,
            striker,
            non_striker,
            bowler,
            self.config.over_limit,
            self.config.out_threshold(),
            Some(target),
        )?;
        self.innings.push(innings);
        log::info!(
            "second innings: {} need {target} to win",
            batting.name
        );
        Ok(())
    }

    /// Record a delivery scored off the bat.
    pub fn record_runs(&mut self, runs: Runs) -> Result<(), MatchError> {
        self.with_active(|innings| innings.record_runs(runs))
    }

    /// Record the fall of the current striker.
    pub fn record_wicket(
        &mut self,
        kind: WicketKind,
        fielder: Option<PlayerId>,
    ) -> Result<(), MatchError> {
        let fielder = match fielder {
            Some(id) => {
                let bowling = Arc::clone(&self.active()?.data().bowling_team);
                Some(bowling.player(id).cloned().ok_or_else(|| {
                    InningsError::PlayerNotEligible(
                        "the fielder is not on the bowling side".to_string(),
                    )
                })?)
            }
            None => None,
        };
        self.with_active(|innings| innings.record_wicket(kind, fielder))
    }

    /// Record a wide or no-ball plus any runs taken off it.
    pub fn record_extra(
        &mut self,
        kind: ExtraKind,
        additional_runs: Runs,
    ) -> Result<(), MatchError> {
        self.with_active(|innings| innings.record_extra(kind, additional_runs))
    }

    /// Seat the incoming batsman after a wicket.
    pub fn select_new_batsman(&mut self, player: PlayerId) -> Result<(), MatchError> {
        let chosen = {
            let batting = &self.active()?.data().batting_team;
            batting.player(player).cloned().ok_or_else(|| {
                InningsError::PlayerNotEligible(
                    "the chosen batsman is not on the batting side".to_string(),
                )
            })?
        };
        self.with_active(|innings| innings.select_new_batsman(chosen))
    }

    /// Hand the next over to a new bowler.
    pub fn select_new_bowler(&mut self, player: PlayerId) -> Result<(), MatchError> {
        let chosen = {
            let bowling = &self.active()?.data().bowling_team;
            bowling.player(player).cloned().ok_or_else(|| {
                InningsError::PlayerNotEligible(
                    "the chosen bowler is not on the bowling side".to_string(),
                )
            })?
        };
        self.with_active(|innings| innings.select_new_bowler(chosen))
    }

    /// Manual change of ends, for correcting a misrecorded call.
    pub fn swap_batsmen(&mut self) -> Result<(), MatchError> {
        if self.status == MatchStatus::Completed {
            return Err(MatchError::MatchAlreadyCompleted);
        }
        let innings = self.innings.last_mut().ok_or(MatchError::NotStarted)?;
        innings.swap_batsmen().map_err(MatchError::from)
    }

    /// Withdraw the most recent delivery of the active innings.
    pub fn undo_last_ball(&mut self) -> Result<(), MatchError> {
        self.with_active(InningsState::undo_last_ball)
    }

    /// Close the active innings by declaration.
    pub fn declare_innings(&mut self) -> Result<(), MatchError> {
        self.with_active(InningsState::declare)
    }

    /// Attach the man-of-the-match award to a completed match.
    pub fn set_man_of_the_match(&mut self, player: PlayerId) -> Result<(), MatchError> {
        if self.status != MatchStatus::Completed {
            return Err(MatchError::NotCompleted);
        }
        let chosen = self
            .team1
            .player(player)
            .or_else(|| self.team2.player(player))
            .cloned()
            .ok_or_else(|| {
                InningsError::PlayerNotEligible(
                    "man of the match must come from one of the squads".to_string(),
                )
            })?;
        match &mut self.result {
            Some(result) => {
                result.man_of_the_match = Some(chosen);
                Ok(())
            }
            None => {
                log::error!("match {} is completed but carries no result", self.id);
                Err(MatchError::NotCompleted)
            }
        }
    }

    fn active(&self) -> Result<&InningsState, MatchError> {
        if self.status == MatchStatus::Completed {
            return Err(MatchError::MatchAlreadyCompleted);
        }
        self.innings.last().ok_or(MatchError::NotStarted)
    }

    /// Route a phase-changing operation to the active innings, then
    /// settle the match if that closed the chase.
    fn with_active<F>(&mut self, op: F) -> Result<(), MatchError>
    where
        F: FnOnce(InningsState) -> (InningsState, Result<(), InningsError>),
    {
        if self.status == MatchStatus::Completed {
            return Err(MatchError::MatchAlreadyCompleted);
        }
        let active = self.innings.pop().ok_or(MatchError::NotStarted)?;
        let (next, outcome) = op(active);
        self.innings.push(next);
        outcome?;
        self.settle();
        Ok(())
    }

    /// Derive the result once the second innings is over.
    fn settle(&mut self) {
        let outcome = {
            let [first, second] = self.innings.as_slice() else {
                return;
            };
            if !second.is_completed() {
                return;
            }
            let first_total = first.data().total_runs;
            let chase = second.data();
            if chase.total_runs > first_total {
                let wickets_in_hand = chase.out_threshold - chase.wickets;
                MatchOutcome::Won {
                    winner: Arc::clone(&chase.batting_team),
                    margin: format!(
                        "by {wickets_in_hand} wicket{}",
                        plural(u32::from(wickets_in_hand))
                    ),
                }
            } else if chase.total_runs == first_total {
                MatchOutcome::Tied
            } else {
                let runs = first_total - chase.total_runs;
                MatchOutcome::Won {
                    winner: Arc::clone(&chase.bowling_team),
                    margin: format!("by {runs} run{}", plural(u32::from(runs))),
                }
            }
        };
        log::info!("match {} completed: {outcome}", self.id);
        self.result = Some(MatchResult {
            outcome,
            man_of_the_match: None,
        });
        self.status = MatchStatus::Completed;
    }

    fn lineup(
        batting: &Team,
        bowling: &Team,
        striker: PlayerId,
        non_striker: PlayerId,
        bowler: PlayerId,
    ) -> Result<(Arc<Player>, Arc<Player>, Arc<Player>), MatchError> {
        let striker = batting.player(striker).cloned().ok_or_else(|| {
            InningsError::InvalidLineup("the chosen striker is not on the batting side".to_string())
        })?;
        let non_striker = batting.player(non_striker).cloned().ok_or_else(|| {
            InningsError::InvalidLineup(
                "the chosen non-striker is not on the batting side".to_string(),
            )
        })?;
        let bowler = bowling.player(bowler).cloned().ok_or_else(|| {
            InningsError::InvalidLineup(
                "the chosen opening bowler is not on the bowling side".to_string(),
            )
        })?;
        Ok((striker, non_striker, bowler))
    }
}

fn plural(count: u32) -> &'static str {
    if count == 1 { "" } else { "s" }
}
