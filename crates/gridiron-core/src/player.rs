// Player, position, and stat projection types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a player within a session.
pub type PlayerId = u64;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Football positions plus the two roster meta-slots (FLEX and bench).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
    #[serde(rename = "TE")]
    TightEnd,
    #[serde(rename = "K")]
    Kicker,
    #[serde(rename = "DST")]
    Defense,
    #[serde(rename = "FLEX")]
    Flex,
    #[serde(rename = "BE")]
    Bench,
}

impl Position {
    /// Positions a player can actually have.
    pub const PLAYING: [Position; 6] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
        Position::Kicker,
        Position::Defense,
    ];

    /// Positions eligible for the FLEX slot, in FLEX tie-break order.
    pub const FLEX_ELIGIBLE: [Position; 3] = [
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
    ];

    /// Parse a position or roster-slot label. Case-insensitive; accepts the
    /// common synonyms (DEF and D/ST for DST, PK for K, BN/BENCH for BE).
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "K" | "PK" => Some(Position::Kicker),
            "DST" | "DEF" | "D/ST" => Some(Position::Defense),
            "FLEX" | "W/R/T" => Some(Position::Flex),
            "BE" | "BN" | "BENCH" => Some(Position::Bench),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Kicker => "K",
            Position::Defense => "DST",
            Position::Flex => "FLEX",
            Position::Bench => "BE",
        }
    }

    /// Whether this is a meta-slot (not a concrete playing position).
    pub fn is_meta_slot(&self) -> bool {
        matches!(self, Position::Flex | Position::Bench)
    }

    pub fn is_flex_eligible(&self) -> bool {
        matches!(
            self,
            Position::RunningBack | Position::WideReceiver | Position::TightEnd
        )
    }

    /// Kickers and defenses are held back from suggestions until the gating round.
    pub fn is_late_round_only(&self) -> bool {
        matches!(self, Position::Kicker | Position::Defense)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Stat projections
// ---------------------------------------------------------------------------

/// Season projection for an offensive player. Kickers use the same shape
/// with their field goal and extra point fields populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffenseStats {
    pub passing_yards: f64,
    pub passing_tds: f64,
    pub interceptions: f64,
    pub rushing_yards: f64,
    pub rushing_tds: f64,
    pub receptions: f64,
    pub receiving_yards: f64,
    pub receiving_tds: f64,
    pub fumbles_lost: f64,
    pub two_point_conversions: f64,
    pub field_goals_made: f64,
    pub extra_points_made: f64,
}

/// Season projection for a team defense / special teams unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseStats {
    pub sacks: f64,
    pub interceptions: f64,
    pub fumble_recoveries: f64,
    pub safeties: f64,
    pub defensive_tds: f64,
    pub return_tds: f64,
    pub points_allowed: f64,
}

/// A player's projection. Exactly one shape is carried, chosen by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "stats", rename_all = "snake_case")]
pub enum StatLine {
    Offense(OffenseStats),
    Defense(DefenseStats),
}

impl StatLine {
    /// All-zero projection of the shape that belongs to `position`.
    pub fn empty_for(position: Option<Position>) -> Self {
        match position {
            Some(Position::Defense) => StatLine::Defense(DefenseStats::default()),
            _ => StatLine::Offense(OffenseStats::default()),
        }
    }

    fn fits(&self, position: Position) -> bool {
        match self {
            StatLine::Defense(_) => position == Position::Defense,
            StatLine::Offense(_) => position != Position::Defense && !position.is_meta_slot(),
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A draftable player and their season projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub name: String,
    /// Normalized position, or `None` when the label was not recognized.
    pub position: Option<Position>,
    /// Canonical label for known positions, the raw label otherwise.
    pub position_label: String,
    pub team: Option<String>,
    pub bye_week: Option<u8>,
    pub adp: Option<f64>,
    pub stats: StatLine,
}

impl Player {
    /// Create a player with an all-zero projection. Meta-slot labels such as
    /// FLEX are not playing positions and leave the position unrecognized.
    pub fn new(player_id: PlayerId, name: impl Into<String>, position_label: &str) -> Self {
        let position = Position::from_str_pos(position_label).filter(|p| !p.is_meta_slot());
        let position_label = match position {
            Some(pos) => pos.display_str().to_string(),
            None => position_label.trim().to_string(),
        };
        Player {
            player_id,
            name: name.into(),
            position,
            position_label,
            team: None,
            bye_week: None,
            adp: None,
            stats: StatLine::empty_for(position),
        }
    }

    pub fn with_offense(mut self, stats: OffenseStats) -> Self {
        self.stats = StatLine::Offense(stats);
        self
    }

    pub fn with_defense(mut self, stats: DefenseStats) -> Self {
        self.stats = StatLine::Defense(stats);
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_bye_week(mut self, bye_week: u8) -> Self {
        self.bye_week = Some(bye_week);
        self
    }

    pub fn with_adp(mut self, adp: f64) -> Self {
        self.adp = Some(adp);
        self
    }

    /// Whether the carried projection shape belongs to the player's position.
    pub fn stats_match_position(&self) -> bool {
        self.position.is_some_and(|pos| self.stats.fits(pos))
    }
}
