// Remaining starter needs for a team, FLEX-aware.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::league::RosterRequirements;
use crate::player::{Player, Position};

/// Open starting slots per position, plus FLEX. Bench is not modeled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RosterNeeds {
    remaining: BTreeMap<Position, u32>,
}

impl RosterNeeds {
    /// Open slots for `position` (FLEX included as its own key).
    pub fn get(&self, position: Position) -> u32 {
        self.remaining.get(&position).copied().unwrap_or(0)
    }

    pub fn flex(&self) -> u32 {
        self.get(Position::Flex)
    }

    /// Whether a player at `position` would fill an open starting slot,
    /// either its own or FLEX.
    pub fn needs(&self, position: Position) -> bool {
        self.get(position) > 0 || (position.is_flex_eligible() && self.flex() > 0)
    }

    /// Whether a player at `position` would only fill FLEX.
    pub fn fills_flex_only(&self, position: Position) -> bool {
        self.get(position) == 0 && position.is_flex_eligible() && self.flex() > 0
    }

    pub fn total(&self) -> u32 {
        self.remaining.values().sum()
    }

    pub fn is_complete(&self) -> bool {
        self.total() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, u32)> + '_ {
        self.remaining.iter().map(|(pos, count)| (*pos, *count))
    }
}

/// Open starting slots after `team_players` have been placed.
///
/// Dedicated slots fill first; RB/WR/TE beyond their dedicated count spill
/// into FLEX. Counts never go negative, and players with an unrecognized
/// position are ignored.
pub fn remaining_needs<'a, I>(team_players: I, roster: &RosterRequirements) -> RosterNeeds
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut held: BTreeMap<Position, u32> = BTreeMap::new();
    for player in team_players {
        if let Some(pos) = player.position {
            *held.entry(pos).or_insert(0) += 1;
        }
    }

    let mut remaining = BTreeMap::new();
    let mut flex_overflow = 0;
    for pos in Position::PLAYING {
        let required = roster.count(pos);
        let have = held.get(&pos).copied().unwrap_or(0);
        remaining.insert(pos, required.saturating_sub(have));
        if pos.is_flex_eligible() {
            flex_overflow += have.saturating_sub(required);
        }
    }
    remaining.insert(Position::Flex, roster.flex().saturating_sub(flex_overflow));

    RosterNeeds { remaining }
}
