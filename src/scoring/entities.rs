use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, sync::Arc};
use uuid::Uuid;

use super::constants;

/// Type alias for runs. All totals and per-ball values are whole runs.
///
/// If a single innings ever surpasses 65,535 runs, the bowling side has
/// bigger problems than integer width.
pub type Runs = u16;

pub type PlayerId = Uuid;
pub type TeamId = Uuid;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team_id: TeamId,
}

impl Player {
    #[must_use]
    pub fn new(name: &str, team_id: TeamId) -> Self {
        let mut name = name.trim().to_string();
        name.truncate(constants::MAX_NAME_LENGTH);
        Self {
            id: Uuid::new_v4(),
            name,
            team_id,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

/// A squad. The roster order is the batting/bowling lineup hint coming
/// from tournament setup; it is not enforced during scoring. Rosters
/// are immutable once the tournament hands them over.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(with = "arc_vec_serde")]
    pub players: Vec<Arc<Player>>,
}

impl Team {
    /// Build a team and its roster in one go, wiring each player's
    /// back-reference to the fresh team id.
    #[must_use]
    pub fn with_players(name: &str, player_names: &[&str]) -> Self {
        let id = Uuid::new_v4();
        let mut name = name.trim().to_string();
        name.truncate(constants::MAX_NAME_LENGTH);
        let players = player_names
            .iter()
            .map(|n| Arc::new(Player::new(n, id)))
            .collect();
        Self { id, name, players }
    }

    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player)
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Arc<Player>> {
        self.players.iter().find(|p| p.id == id)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WicketKind {
    Bowled,
    Caught,
    RunOut,
    Stumped,
    Lbw,
    HitWicket,
}

impl fmt::Display for WicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Bowled => "bowled",
            Self::Caught => "caught",
            Self::RunOut => "run out",
            Self::Stumped => "stumped",
            Self::Lbw => "lbw",
            Self::HitWicket => "hit wicket",
        };
        write!(f, "{repr}")
    }
}

/// How a wicket fell. The dismissed player is always the striker at the
/// time of the dismissal; the bowler credit is absent for a run-out.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WicketDetails {
    pub kind: WicketKind,
    #[serde(with = "arc_serde")]
    pub dismissed: Arc<Player>,
    #[serde(with = "arc_opt_serde")]
    pub fielder: Option<Arc<Player>>,
    #[serde(with = "arc_opt_serde")]
    pub bowler: Option<Arc<Player>>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraKind {
    Wide,
    NoBall,
}

impl fmt::Display for ExtraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Wide => "wide",
            Self::NoBall => "no-ball",
        };
        write!(f, "{repr}")
    }
}

/// A single delivery as recorded in the book. Immutable once recorded;
/// corrections remove the ball via undo and re-derive the totals.
///
/// For a wide or no-ball, `runs` holds the mandatory penalty plus any
/// additional running/boundary runs taken off the same delivery.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Ball {
    /// 1-based position within the over's delivery sequence, extras
    /// included.
    pub number_in_over: u8,
    pub runs: Runs,
    pub is_wide: bool,
    pub is_no_ball: bool,
    pub is_wicket: bool,
    pub wicket: Option<WicketDetails>,
    #[serde(with = "arc_serde")]
    pub striker: Arc<Player>,
    #[serde(with = "arc_serde")]
    pub bowler: Arc<Player>,
}

impl Ball {
    /// A legal delivery counts toward the six-ball over; wides and
    /// no-balls never do, whatever their run value.
    #[must_use]
    pub fn is_legal(&self) -> bool {
        !self.is_wide && !self.is_no_ball
    }

    #[must_use]
    pub fn extra_kind(&self) -> Option<ExtraKind> {
        if self.is_wide {
            Some(ExtraKind::Wide)
        } else if self.is_no_ball {
            Some(ExtraKind::NoBall)
        } else {
            None
        }
    }
}

/// One over: up to six legal deliveries from a single bowler, plus any
/// wides and no-balls bowled along the way. Cumulative runs and wickets
/// are maintained as balls are pushed and popped.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Over {
    /// 0-based over index within the innings.
    pub number: u32,
    #[serde(with = "arc_serde")]
    pub bowler: Arc<Player>,
    pub balls: Vec<Ball>,
    pub runs: Runs,
    pub wickets: u8,
}

impl Over {
    /// Start a fresh over seeded with its first delivery; the over's
    /// bowler is the delivery's bowler.
    #[must_use]
    pub(crate) fn open(number: u32, ball: Ball) -> Self {
        let mut over = Self {
            number,
            bowler: Arc::clone(&ball.bowler),
            balls: Vec::with_capacity(usize::from(constants::BALLS_PER_OVER)),
            runs: 0,
            wickets: 0,
        };
        over.push(ball);
        over
    }

    pub(crate) fn push(&mut self, ball: Ball) {
        self.runs += ball.runs;
        if ball.is_wicket {
            self.wickets += 1;
        }
        self.balls.push(ball);
    }

    pub(crate) fn pop(&mut self) -> Option<Ball> {
        let ball = self.balls.pop()?;
        self.runs -= ball.runs;
        if ball.is_wicket {
            self.wickets -= 1;
        }
        Some(ball)
    }

    #[must_use]
    pub fn legal_balls(&self) -> u8 {
        self.balls.iter().filter(|b| b.is_legal()).count() as u8
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.legal_balls() >= constants::BALLS_PER_OVER
    }
}

/// A batsman's current figures, derived from the ball history.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BattingFigures {
    pub runs: Runs,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
}

impl fmt::Display for BattingFigures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.runs, self.balls_faced)
    }
}

/// A bowler's current figures, derived from the ball history.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BowlingFigures {
    /// Legal deliveries bowled.
    pub balls: u32,
    pub maidens: u32,
    pub runs_conceded: Runs,
    pub wickets: u8,
}

impl BowlingFigures {
    /// Overs bowled in the usual `O.B` notation, e.g. `3.2`.
    #[must_use]
    pub fn overs(&self) -> String {
        let per_over = u32::from(constants::BALLS_PER_OVER);
        format!("{}.{}", self.balls / per_over, self.balls % per_over)
    }
}

impl fmt::Display for BowlingFigures {
    // The scoreboard form: overs-maidens-runs-wickets, e.g. 3.2-0-18-1.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.overs(),
            self.maidens,
            self.runs_conceded,
            self.wickets
        )
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BatsmanView {
    #[serde(with = "arc_serde")]
    pub player: Arc<Player>,
    pub figures: BattingFigures,
    pub on_strike: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BowlerView {
    #[serde(with = "arc_serde")]
    pub player: Arc<Player>,
    pub figures: BowlingFigures,
}

/// Read-only projection of a live innings for the display layer.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InningsView {
    #[serde(with = "arc_serde")]
    pub batting_team: Arc<Team>,
    #[serde(with = "arc_serde")]
    pub bowling_team: Arc<Team>,
    pub total_runs: Runs,
    pub wickets: u8,
    pub extras: Runs,
    /// Overs bowled in `O.B` notation, e.g. `12.4`.
    pub overs: String,
    pub striker: BatsmanView,
    pub non_striker: BatsmanView,
    pub bowler: BowlerView,
    /// Ball-by-ball symbols for the over in progress, e.g.
    /// `["1", "Wd", "4", "W"]`.
    pub this_over: Vec<String>,
    pub target: Option<Runs>,
    pub phase: String,
    pub completed: bool,
}

// Helper modules for Arc serialization. Shared Player/Team references
// serialize as their contents and deserialize into fresh Arcs.
pub(crate) mod arc_serde {
    use super::*;

    pub fn serialize<S, T>(arc: &Arc<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        arc.as_ref().serialize(serializer)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Arc<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        T::deserialize(deserializer).map(Arc::new)
    }
}

pub(crate) mod arc_opt_serde {
    use super::*;

    pub fn serialize<S, T>(value: &Option<Arc<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        value.as_deref().serialize(serializer)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Arc<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.map(Arc::new))
    }
}

pub(crate) mod arc_vec_serde {
    use super::*;

    pub fn serialize<S, T>(value: &[Arc<T>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_seq(value.iter().map(AsRef::as_ref))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<Arc<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Vec::<T>::deserialize(deserializer)?
            .into_iter()
            .map(Arc::new)
            .collect())
    }
}
