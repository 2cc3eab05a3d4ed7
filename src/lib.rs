//! # Cricket Scoring
//!
//! A ball-by-ball cricket scoring engine built around a type-safe finite
//! state machine (FSM) design.
//!
//! This library records discrete scoring events - runs, extras, wickets,
//! batsman and bowler changes - and derives the consistent live state of
//! an innings from the ball history. The innings FSM uses `enum_dispatch`
//! for zero-cost trait dispatch across its phases.
//!
//! ## Architecture
//!
//! An innings moves through four phases:
//!
//! - **Ready**: accepting the next delivery
//! - **AwaitingBatsman**: a wicket fell; a replacement must be chosen
//! - **AwaitingBowler**: the over is complete; a different bowler must
//!   take the next one
//! - **Completed**: terminal - all out, over limit reached, target
//!   reached, or declared
//!
//! A [`Match`] sequences one or two innings, derives the chase target
//! (first-innings total plus one), completes the match the moment the
//! target falls mid-over, and hands the finished record back to the
//! tournament layer.
//!
//! ## Core Modules
//!
//! - [`scoring`]: Innings state machine, entities, and over accumulation
//! - [`fixture`]: Match controller, configuration, and result derivation
//!
//! ## Example
//!
//! ```
//! use cricket_scoring::{Match, MatchConfig, entities::Team};
//!
//! let team_a = Team::with_players("Falcons", &["Asha", "Bea", "Chandra"]);
//! let team_b = Team::with_players("Kites", &["Dev", "Esha", "Farid"]);
//!
//! let mut game = Match::new(team_a, team_b, MatchConfig::new(2, 3)).unwrap();
//! let batting = game.team1().id;
//! let openers: Vec<_> = game.team1().players.iter().map(|p| p.id).collect();
//! let opening_bowler = game.team2().players[0].id;
//!
//! game.start_first_innings(batting, openers[0], openers[1], opening_bowler)
//!     .unwrap();
//! game.record_runs(4).unwrap();
//!
//! let view = game.innings_view().unwrap();
//! assert_eq!(view.total_runs, 4);
//! assert_eq!(view.overs, "0.1");
//! ```

/// Core scoring engine: innings FSM, entities, and over accumulation.
pub mod scoring;
pub use scoring::{
    CompletionReason, Innings, InningsData, InningsError, InningsEvent, InningsProjection,
    InningsState,
    constants,
    entities::{
        self, Ball, BatsmanView, BattingFigures, BowlerView, BowlingFigures, ExtraKind,
        InningsView, Over, Player, PlayerId, Runs, Team, TeamId, WicketDetails, WicketKind,
    },
    functional,
};

/// Match control: lifecycle, innings sequencing, result derivation.
pub mod fixture;
pub use fixture::{
    InningsRecord, Match, MatchConfig, MatchError, MatchId, MatchOutcome, MatchRecord, MatchResult,
    MatchStatus,
};
