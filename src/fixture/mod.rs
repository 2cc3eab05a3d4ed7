//! Match control: lifecycle, innings sequencing, and result derivation.

pub mod config;
pub mod controller;

pub use config::MatchConfig;
pub use controller::{
    InningsRecord, Match, MatchError, MatchId, MatchOutcome, MatchRecord, MatchResult, MatchStatus,
};
