// League shape: roster requirements and draft context.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::draft::order::round_for_pick;
use crate::draft::state::DraftState;
use crate::error::EngineError;
use crate::player::Position;

/// Smallest league the engine will value.
pub const MIN_TEAMS: u32 = 2;

pub(crate) fn validate_teams(teams: u32) -> Result<(), EngineError> {
    if teams < MIN_TEAMS {
        return Err(EngineError::invalid(
            "league.teams",
            format!("must be at least {MIN_TEAMS}, got {teams}"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Roster requirements
// ---------------------------------------------------------------------------

/// Starting slots per team, keyed by position (FLEX and BE included).
/// Slots that are not listed have a count of 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, i64>", into = "BTreeMap<String, i64>")]
pub struct RosterRequirements {
    slots: BTreeMap<Position, u32>,
}

impl RosterRequirements {
    /// QB1 RB2 WR2 TE1 FLEX1 K1 DST1 with a seven-player bench.
    pub fn standard() -> Self {
        let slots = [
            (Position::Quarterback, 1),
            (Position::RunningBack, 2),
            (Position::WideReceiver, 2),
            (Position::TightEnd, 1),
            (Position::Flex, 1),
            (Position::Kicker, 1),
            (Position::Defense, 1),
            (Position::Bench, 7),
        ];
        RosterRequirements {
            slots: slots.into_iter().collect(),
        }
    }

    /// Build requirements from `(slot label, count)` pairs such as
    /// `("RB", 2)`. Unknown labels and negative counts are rejected.
    pub fn from_counts<I, S>(counts: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let mut slots = BTreeMap::new();
        for (label, count) in counts {
            let label = label.as_ref();
            let position = Position::from_str_pos(label).ok_or_else(|| {
                EngineError::invalid(format!("roster.{label}"), "unknown roster slot")
            })?;
            let count = u32::try_from(count).map_err(|_| {
                EngineError::invalid(
                    format!("roster.{label}"),
                    format!("count must be a non-negative integer, got {count}"),
                )
            })?;
            slots.insert(position, count);
        }
        Ok(RosterRequirements { slots })
    }

    pub fn with_slot(mut self, position: Position, count: u32) -> Self {
        self.slots.insert(position, count);
        self
    }

    /// Starting slots per team for `position` (FLEX and BE included).
    pub fn count(&self, position: Position) -> u32 {
        self.slots.get(&position).copied().unwrap_or(0)
    }

    pub fn flex(&self) -> u32 {
        self.count(Position::Flex)
    }

    pub fn bench(&self) -> u32 {
        self.count(Position::Bench)
    }

    /// Starters per team, FLEX included, bench excluded.
    pub fn starters_per_team(&self) -> u32 {
        self.slots
            .iter()
            .filter(|(pos, _)| **pos != Position::Bench)
            .map(|(_, count)| count)
            .sum()
    }

    /// Total roster size per team, bench included.
    pub fn roster_size(&self) -> u32 {
        self.slots.values().sum()
    }
}

impl Default for RosterRequirements {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<BTreeMap<String, i64>> for RosterRequirements {
    type Error = EngineError;

    fn try_from(raw: BTreeMap<String, i64>) -> Result<Self, Self::Error> {
        RosterRequirements::from_counts(raw)
    }
}

impl From<RosterRequirements> for BTreeMap<String, i64> {
    fn from(roster: RosterRequirements) -> Self {
        roster
            .slots
            .into_iter()
            .map(|(pos, count)| (pos.display_str().to_string(), i64::from(count)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Draft context
// ---------------------------------------------------------------------------

fn default_snake() -> bool {
    true
}

fn default_total_rounds() -> u32 {
    16
}

fn default_kdst_gate_round() -> u32 {
    12
}

/// Where the draft stands from the user's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftContext {
    #[serde(default = "default_snake")]
    pub snake: bool,
    pub teams: u32,
    /// The user's 1-indexed slot in the first round.
    pub pick_slot: u32,
    /// Explicit round; derived from the current pick when absent.
    #[serde(default)]
    pub round: Option<u32>,
    /// Explicit current overall pick; taken from the draft state when absent.
    #[serde(default)]
    pub current_pick_overall: Option<u32>,
    #[serde(default = "default_total_rounds")]
    pub total_rounds: u32,
    /// K and DST are not suggested before this round.
    #[serde(default = "default_kdst_gate_round")]
    pub kdst_gate_round: u32,
}

impl DraftContext {
    pub fn new(teams: u32, pick_slot: u32) -> Self {
        DraftContext {
            snake: default_snake(),
            teams,
            pick_slot,
            round: None,
            current_pick_overall: None,
            total_rounds: default_total_rounds(),
            kdst_gate_round: default_kdst_gate_round(),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        validate_teams(self.teams)?;
        if self.pick_slot == 0 || self.pick_slot > self.teams {
            return Err(EngineError::invalid(
                "draft.pick_slot",
                format!("must be between 1 and {}, got {}", self.teams, self.pick_slot),
            ));
        }
        if self.total_rounds == 0 {
            return Err(EngineError::invalid(
                "draft.total_rounds",
                "must be at least 1",
            ));
        }
        if let Some(round) = self.round {
            if round == 0 || round > self.total_rounds {
                return Err(EngineError::invalid(
                    "draft.round",
                    format!("must be between 1 and {}, got {round}", self.total_rounds),
                ));
            }
        }
        if let Some(pick) = self.current_pick_overall {
            let last_pick = self.teams.saturating_mul(self.total_rounds);
            if pick == 0 || pick > last_pick {
                return Err(EngineError::invalid(
                    "draft.current_pick_overall",
                    format!("must be between 1 and {last_pick}, got {pick}"),
                ));
            }
        }
        Ok(())
    }

    /// The current overall pick: explicit if set, otherwise from `state`.
    pub fn effective_pick(&self, state: &DraftState) -> u32 {
        self.current_pick_overall
            .unwrap_or_else(|| state.current_pick_overall())
    }

    /// The current round: explicit if set, otherwise derived from the pick.
    pub fn effective_round(&self, state: &DraftState) -> u32 {
        self.round
            .unwrap_or_else(|| round_for_pick(self.effective_pick(state), self.teams))
    }
}
