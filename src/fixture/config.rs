//! Match configuration handed over from tournament setup.

use serde::{Deserialize, Serialize};

use crate::scoring::constants::{
    BALLS_PER_OVER, DEFAULT_OVER_LIMIT, DEFAULT_PLAYERS_PER_TEAM, MAX_OVER_LIMIT,
    MAX_PLAYERS_PER_TEAM, MIN_PLAYERS_PER_TEAM,
};

/// Match configuration
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MatchConfig {
    /// Overs available to each innings.
    pub over_limit: u32,

    /// Squad size; the out-threshold is one fewer.
    pub players_per_team: u8,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            over_limit: DEFAULT_OVER_LIMIT,
            players_per_team: DEFAULT_PLAYERS_PER_TEAM,
        }
    }
}

impl MatchConfig {
    #[must_use]
    pub const fn new(over_limit: u32, players_per_team: u8) -> Self {
        Self {
            over_limit,
            players_per_team,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.over_limit == 0 || self.over_limit > MAX_OVER_LIMIT {
            return Err(format!(
                "Over limit must be between 1 and {MAX_OVER_LIMIT}"
            ));
        }

        if self.players_per_team < MIN_PLAYERS_PER_TEAM
            || self.players_per_team > MAX_PLAYERS_PER_TEAM
        {
            return Err(format!(
                "Players per team must be between {MIN_PLAYERS_PER_TEAM} and {MAX_PLAYERS_PER_TEAM}"
            ));
        }

        Ok(())
    }

    /// Wickets that close an innings.
    #[must_use]
    pub const fn out_threshold(&self) -> u8 {
        self.players_per_team - 1
    }

    /// Legal deliveries available to each innings.
    #[must_use]
    pub const fn balls_per_innings(&self) -> u32 {
        self.over_limit * BALLS_PER_OVER as u32
    }
}
