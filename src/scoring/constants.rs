//! Engine-wide scoring constants.

/// Legal deliveries that make up a complete over.
pub const BALLS_PER_OVER: u8 = 6;

/// Run values a batsman can score off the bat in a single delivery.
/// Fives exist in theory (overthrows) but the scoring surface follows
/// the standard panel: dot, singles through three, and boundaries.
pub const VALID_RUN_VALUES: [u16; 6] = [0, 1, 2, 3, 4, 6];

/// Mandatory penalty runs awarded for a wide or a no-ball.
pub const EXTRA_PENALTY: u16 = 1;

pub const DEFAULT_OVER_LIMIT: u32 = 20;
pub const MAX_OVER_LIMIT: u32 = 50;

pub const DEFAULT_PLAYERS_PER_TEAM: u8 = 11;
pub const MAX_PLAYERS_PER_TEAM: u8 = 11;
/// Two batsmen must be able to open, so a side needs at least two players.
pub const MIN_PLAYERS_PER_TEAM: u8 = 2;

/// Cap applied to player and team names on creation.
pub const MAX_NAME_LENGTH: usize = 64;
