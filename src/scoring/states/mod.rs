//! Innings phase definitions for the scoring FSM.
//!
//! Each phase is a marker struct carried by `Innings<T>`; a phase holds
//! payload only where the resumption path needs it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ready to accept the next delivery.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ready;

/// A wicket has fallen; no delivery can be recorded until the incoming
/// batsman is chosen.
#[derive(Clone, Copy, Debug)]
pub struct AwaitingBatsman {
    /// The dismissal also closed the over, so a new bowler is owed
    /// once the replacement arrives.
    pub(crate) over_closed: bool,
}

/// The over is complete; a different bowler must be chosen before play
/// resumes.
#[derive(Clone, Copy, Debug)]
pub struct AwaitingBowler;

/// Terminal phase: the innings is closed and rejects all mutation.
#[derive(Clone, Copy, Debug)]
pub struct Completed {
    pub(crate) reason: CompletionReason,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    AllOut,
    OversExhausted,
    TargetReached,
    Declared,
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::AllOut => "all out",
            Self::OversExhausted => "over limit reached",
            Self::TargetReached => "target reached",
            Self::Declared => "declared",
        };
        write!(f, "{repr}")
    }
}
